use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use chirpy_types::Id;
use chirpy_types::api::{CreateUserRequest, UpdateUserRequest};
use chirpy_types::models::UserView;
use chirpy_types::validate::{validate_email, validate_new_user};

use crate::auth::{AppState, run_blocking};
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = run_blocking(&state, |inner| inner.store.list_users()).await?;
    Ok(Json(users.iter().map(UserView::from).collect::<Vec<_>>()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Id>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |inner| inner.store.get_user(user_id)).await?;
    Ok(Json(UserView::from(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let problems = validate_new_user(&req.email, &req.password);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let user = run_blocking(&state, move |inner| {
        inner.store.create_user(&req.email, &req.password)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// PUT /api/users: change the caller's own email and, optionally, password.
/// An empty password counts as "keep the current one".
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let problems = validate_email(&req.email);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let user = run_blocking(&state, move |inner| {
        let password = req.password.as_deref().filter(|p| !p.is_empty());
        inner.store.update_user_profile(user_id, &req.email, password)
    })
    .await?;

    Ok(Json(UserView::from(user)))
}
