//! Chirpy Crypto Library
//!
//! Password hashing (argon2id, PHC strings) and opaque refresh-token
//! generation. JWT signing lives with the HTTP layer in chirpy-api.

pub mod keys;
pub mod password;

pub use password::{Credentials, HashError};
