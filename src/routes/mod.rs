pub mod content;
pub mod data;
pub mod engagement;
pub mod health;
pub mod impact;
pub mod notes;
pub mod preferences;
pub mod progress;
pub mod snapshots;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::response::AppError;
use crate::state::AppState;

/// Maximum request body size: 5 MiB, enough for a full import document.
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/progress", progress::router())
        .nest("/preferences", preferences::router())
        .nest("/engagement", engagement::router())
        .nest("/notes", notes::router())
        .nest("/snapshots", snapshots::router())
        .nest("/data", data::router())
        .nest("/content", content::router())
        .nest("/impact", impact::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn fallback_404() -> AppError {
    AppError::not_found("Not found")
}
