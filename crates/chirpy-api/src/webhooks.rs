use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, info};

use chirpy_types::api::{EVENT_USER_UPGRADED, WebhookRequest};

use crate::auth::{AppState, run_blocking};
use crate::error::ApiError;
use crate::tokens::parse_api_key;

/// POST /api/polka/webhooks
///
/// Authenticated with `Authorization: ApiKey <key>`. The key is checked
/// before the body is looked at. Events other than `user.upgraded` are
/// acknowledged and ignored.
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let key = parse_api_key(auth_header)?;
    if state.polka_key.is_empty() || !key.eq_ignore_ascii_case(&state.polka_key) {
        debug!("Webhook called with a wrong api key");
        return Err(ApiError::Unauthorized);
    }

    let req: WebhookRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !req.event.eq_ignore_ascii_case(EVENT_USER_UPGRADED) {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = req.data.user_id;
    run_blocking(&state, move |inner| inner.store.set_upgraded(user_id, true)).await?;

    info!("User {} upgraded", user_id);
    Ok(StatusCode::NO_CONTENT)
}
