use serde::{Deserialize, Serialize};

use crate::Id;
use crate::models::UserView;

// -- JWT Claims --

/// Access-token claims. `sub` is the user id encoded as a decimal string, as
/// the JWT registered claim requires a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
}

// -- Chirps --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateChirpResponse {
    pub cleaned_body: String,
}

/// Query string of `GET /api/chirps`. Both fields stay raw strings so that an
/// unparsable `author_id` can be ignored instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ChirpQuery {
    pub sort: Option<String>,
    pub author_id: Option<String>,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserView,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

// -- Webhooks --

pub const EVENT_USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: Id,
}
