use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use chirpy_types::Id;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::tokens::parse_bearer;

/// Id of the user whose access token authenticated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Id);

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = parse_bearer(auth_header)?;
    let user_id = state.tokens.validate(token)?;
    debug!("Token valid for user {}", user_id);

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
