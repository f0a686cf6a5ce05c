use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::engagement::EngagementAction;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_engagement))
        .route("/:item_id", get(get_engagement).post(track_engagement))
}

async fn list_engagement(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().all_engagement()?))
}

async fn get_engagement(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store()
        .get_engagement(&item_id)?
        .ok_or_else(|| AppError::not_found("No engagement recorded for this item"))?;
    Ok(ok(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackEngagementRequest {
    action: EngagementAction,
    #[serde(default)]
    time_spent: u64,
}

async fn track_engagement(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<TrackEngagementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store()
        .track_engagement(&item_id, req.action, req.time_spent)?;
    Ok(ok(record))
}
