pub mod access;
pub mod auth;
pub mod chirps;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod tokens;
pub mod users;
pub mod webhooks;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;
pub use tokens::TokenService;
