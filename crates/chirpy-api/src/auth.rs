use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tokio::task;
use tracing::{debug, error};

use chirpy_crypto::keys::generate_refresh_token;
use chirpy_db::{Store, StoreError};
use chirpy_types::api::{LoginRequest, LoginResponse, RefreshResponse};
use chirpy_types::models::UserView;

use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::tokens::{TokenService, parse_bearer};

/// Access-token lifetime when the client does not ask for one.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
/// Upper bound on a client-requested access-token lifetime.
pub const MAX_ACCESS_TTL_SECS: i64 = 24 * 60 * 60;
pub const REFRESH_TTL_SECS: i64 = 60 * 24 * 60 * 60;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
    pub tokens: TokenService,
    pub polka_key: String,
    pub metrics: Metrics,
    /// Deadline for the validate-and-store part of a request. The blocking
    /// store call keeps running past it; only the response gives up.
    pub request_timeout: Duration,
}

/// Run store work off the async runtime under the request deadline.
pub(crate) async fn run_blocking<F, T, E>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let inner = state.clone();
    let work = task::spawn_blocking(move || f(&inner));

    match tokio::time::timeout(state.request_timeout, work).await {
        Ok(Ok(result)) => result.map_err(Into::into),
        Ok(Err(e)) => {
            error!("spawn_blocking join error: {}", e);
            Err(ApiError::Internal(e.to_string()))
        }
        Err(_) => Err(ApiError::Timeout),
    }
}

fn access_ttl(requested: Option<i64>) -> i64 {
    match requested {
        Some(secs) if secs > 0 => secs.min(MAX_ACCESS_TTL_SECS),
        _ => DEFAULT_ACCESS_TTL_SECS,
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ttl = access_ttl(req.expires_in_seconds);

    let response = run_blocking(&state, move |inner| {
        let user = match inner.store.get_user_by_email(&req.email) {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                debug!("Login for unknown email {}", req.email);
                return Err(ApiError::Unauthorized);
            }
            Err(e) => return Err(e.into()),
        };

        if !inner.store.credentials().verify(&req.password, &user.password_hash)? {
            debug!("Wrong password for user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        let token = inner.tokens.issue(user.id, ttl)?;
        let refresh_token = generate_refresh_token();
        let user = inner
            .store
            .update_user_tokens(user.id, &token, ttl, &refresh_token, REFRESH_TTL_SECS)?;

        Ok::<_, ApiError>(LoginResponse {
            user: UserView::from(user),
            token,
            refresh_token,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Trade a live refresh token for a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = bearer(&headers)?;

    let token = run_blocking(&state, move |inner| {
        let user = inner
            .store
            .find_user_by_refresh_token(&refresh_token)
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::Unauthorized,
                other => other.into(),
            })?;

        if user.refresh_token_expires_at <= chrono::Utc::now().timestamp() {
            debug!("Expired refresh token for user {}", user.id);
            return Err(ApiError::Unauthorized);
        }

        Ok::<_, ApiError>(inner.tokens.issue(user.id, DEFAULT_ACCESS_TTL_SECS)?)
    })
    .await?;

    Ok(Json(RefreshResponse { token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = bearer(&headers)?;

    run_blocking(&state, move |inner| {
        inner
            .store
            .revoke_refresh_token(&refresh_token)
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::Unauthorized,
                other => other.into(),
            })
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    Ok(parse_bearer(value)?.to_string())
}
