use std::path::Path;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::metrics::{self, count_hits};
use crate::middleware::require_auth;
use crate::{chirps, users, webhooks};

/// Build the full HTTP surface: the API, the admin page and the static site
/// under `/app`.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(metrics::healthz))
        .route("/api/reset", get(metrics::reset_hits))
        .route("/admin/metrics", get(metrics::admin_metrics))
        .route("/api/validate_chirp", post(chirps::validate_chirp))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/{chirp_id}", get(chirps::get_chirp))
        .route("/api/users", get(users::list_users))
        .route("/api/users", post(users::create_user))
        .route("/api/users/{user_id}", get(users::get_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/polka/webhooks", post(webhooks::polka_webhook))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(chirps::delete_chirp))
        .route("/api/users", put(users::update_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let static_routes = Router::new()
        .nest_service("/app", ServeDir::new(public_dir))
        .layer(middleware::from_fn_with_state(state, count_hits));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(static_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
