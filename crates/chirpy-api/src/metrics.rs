use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::auth::AppState;

/// Hit counter for the static file server.
#[derive(Debug, Default)]
pub struct Metrics {
    file_server_hits: AtomicU64,
}

impl Metrics {
    pub fn inc(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the file server.
pub async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.metrics.inc();
    next.run(req).await
}

/// GET /admin/metrics
pub async fn admin_metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\n<body>\n\t<h1>Welcome, Chirpy Admin</h1>\n\t<p>Chirpy has been visited {} times!</p>\n</body>\n\n</html>",
        state.metrics.get()
    ))
}

/// GET /api/reset
pub async fn reset_hits(State(state): State<AppState>) -> StatusCode {
    state.metrics.reset();
    StatusCode::OK
}

/// GET /api/healthz
pub async fn healthz() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}
