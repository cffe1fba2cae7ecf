pub mod api;
pub mod models;
pub mod validate;

/// Entity identifier shared by chirps and users. Assigned by the store from a
/// single monotonic counter.
pub type Id = u64;
