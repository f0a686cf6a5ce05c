use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::content::{ContentBlock, ContentSource};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_snapshots))
        .route("/:item_id", get(get_snapshot).put(store_snapshot))
}

async fn list_snapshots(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().all_snapshots()?))
}

async fn get_snapshot(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .store()
        .get_snapshot(&item_id)?
        .ok_or_else(|| AppError::not_found("No stored content for this item"))?;
    Ok(ok(snapshot))
}

#[derive(Debug, Deserialize)]
struct StoreSnapshotRequest {
    content: Vec<ContentBlock>,
    #[serde(default)]
    source: ContentSource,
}

async fn store_snapshot(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<StoreSnapshotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .store()
        .store_snapshot(&item_id, req.content, req.source)?;
    Ok(ok(snapshot))
}
