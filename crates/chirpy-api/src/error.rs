use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use chirpy_crypto::HashError;
use chirpy_db::StoreError;
use chirpy_types::validate::Problems;

use crate::access::NotAuthor;
use crate::tokens::TokenError;

/// Everything a handler can fail with, mapped onto a status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed validation")]
    Validation(Problems),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::EmailTaken => Self::Conflict("email already in use"),
            StoreError::Hash(e @ (HashError::Empty | HashError::TooLong)) => {
                Self::Validation(Problems::from([("password".to_string(), e.to_string())]))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret => Self::Internal(err.to_string()),
            other => {
                debug!("Rejected credentials: {}", other);
                Self::Unauthorized
            }
        }
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        StoreError::Hash(err).into()
    }
}

impl From<NotAuthor> for ApiError {
    fn from(err: NotAuthor) -> Self {
        debug!("{}", err);
        Self::Forbidden
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(problems) => (status, Json(problems)).into_response(),
            Self::Internal(detail) => {
                error!("Internal error: {}", detail);
                (status, Json(serde_json::json!({ "error": "internal server error" }))).into_response()
            }
            other => (status, Json(serde_json::json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
