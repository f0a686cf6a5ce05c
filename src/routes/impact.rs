use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::impact::{calculate_impact, ImpactInput};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/simulate", post(simulate))
}

async fn simulate(Json(input): Json<ImpactInput>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(calculate_impact(&input)?))
}
