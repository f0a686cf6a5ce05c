use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes))
        .route("/:item_id", get(get_note).put(save_note))
}

async fn list_notes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().all_notes()?))
}

async fn get_note(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let note = state
        .store()
        .get_note(&item_id)?
        .ok_or_else(|| AppError::not_found("No note for this item"))?;
    Ok(ok(note))
}

#[derive(Debug, Deserialize)]
struct SaveNoteRequest {
    text: String,
}

async fn save_note(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<SaveNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().save_note(&item_id, &req.text)?))
}
