use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::delete(clear_all))
        .route("/export", get(export_data))
        .route("/import", post(import_data))
        .route("/statistics", get(statistics))
        .route("/purge", post(purge))
}

/// The export document is returned bare so it can be saved as a file and
/// posted back to `/import` unchanged.
async fn export_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.store().export_all()?))
}

async fn import_data(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().import_all(&body)? {
        return Err(AppError::bad_request(
            "IMPORT_REJECTED",
            "Import document is malformed or has an unsupported version",
        ));
    }
    Ok(ok(serde_json::json!({ "imported": true })))
}

async fn statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().compute_statistics()?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurgeRequest {
    days_old: Option<i64>,
}

async fn purge(
    State(state): State<AppState>,
    req: Option<Json<PurgeRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let days_old = req
        .and_then(|Json(req)| req.days_old)
        .unwrap_or(state.config().worker.retention_days);
    Ok(ok(state.store().purge_older_than(days_old)?))
}

async fn clear_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.store().clear_all()?;
    Ok(ok(serde_json::json!({ "cleared": true })))
}
