use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::preferences::PreferencesPatch;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_preferences).patch(update_preferences))
        .route(
            "/favorites/:item_id",
            get(is_favorite).post(add_favorite).delete(remove_favorite),
        )
}

async fn get_preferences(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().get_preferences()?))
}

async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().save_preferences(&patch)?))
}

async fn is_favorite(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let favorite = state.store().is_favorite(&item_id)?;
    Ok(ok(serde_json::json!({ "itemId": item_id, "favorite": favorite })))
}

async fn add_favorite(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().add_favorite(&item_id)?))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().remove_favorite(&item_id)?))
}
