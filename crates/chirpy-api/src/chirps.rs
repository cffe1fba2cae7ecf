use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use chirpy_db::SortOrder;
use chirpy_types::Id;
use chirpy_types::api::{ChirpQuery, CreateChirpRequest, ValidateChirpResponse};
use chirpy_types::validate::clean_chirp_body;

use crate::access::ensure_author;
use crate::auth::{AppState, run_blocking};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /api/validate_chirp: check a body without storing it.
pub async fn validate_chirp(Json(req): Json<CreateChirpRequest>) -> Result<impl IntoResponse, ApiError> {
    let cleaned_body = clean_chirp_body(&req.body).map_err(ApiError::Validation)?;
    Ok(Json(ValidateChirpResponse { cleaned_body }))
}

/// GET /api/chirps?sort=asc|desc&author_id=N
///
/// An `author_id` that does not parse is ignored and the full list returned.
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let order = SortOrder::from_query(query.sort.as_deref());
    let author_id = query.author_id.as_deref().and_then(|raw| match raw.parse::<Id>() {
        Ok(id) => Some(id),
        Err(e) => {
            debug!("Ignoring author_id '{}': {}", raw, e);
            None
        }
    });

    let chirps = run_blocking(&state, move |inner| inner.store.list_chirps(order, author_id)).await?;
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<Id>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = run_blocking(&state, move |inner| inner.store.get_chirp(chirp_id)).await?;
    Ok(Json(chirp))
}

pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = clean_chirp_body(&req.body).map_err(ApiError::Validation)?;

    let chirp = run_blocking(&state, move |inner| inner.store.create_chirp(&body, user_id)).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// DELETE /api/chirps/{chirp_id}: only the author may delete.
pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<Id>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(&state, move |inner| {
        let chirp = inner.store.get_chirp(chirp_id)?;
        ensure_author(&chirp, user_id)?;
        inner.store.delete_chirp(chirp_id)?;
        Ok::<_, ApiError>(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
