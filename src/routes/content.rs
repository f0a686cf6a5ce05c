use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::content::ContentSource;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:item_id", get(fetch_content))
}

/// Fetches an item through the cached content fetcher and keeps a snapshot
/// of what was served.
async fn fetch_content(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.content().fetch_content(&item_id).await?;

    if let Err(e) = state
        .store()
        .store_snapshot(&item.id, item.blocks.clone(), ContentSource::Api)
    {
        tracing::warn!(item_id = %item.id, error = %e, "Failed to snapshot fetched content");
    }

    Ok(ok(item))
}
