use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::constants::MAX_READING_PROGRESS;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_progress))
        .route("/:item_id", get(get_progress).put(save_progress))
}

async fn list_progress(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().all_progress()?))
}

async fn get_progress(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store()
        .get_progress(&item_id)?
        .ok_or_else(|| AppError::not_found("No progress recorded for this item"))?;
    Ok(ok(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveProgressRequest {
    progress: u32,
    #[serde(default)]
    time_spent: u64,
}

async fn save_progress(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<SaveProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let progress = req.progress.min(u32::from(MAX_READING_PROGRESS)) as u8;
    let record = state
        .store()
        .save_progress(&item_id, progress, req.time_spent)?;
    Ok(ok(record))
}
