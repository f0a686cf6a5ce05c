use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::store::keys;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/store", get(store_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().backend().read(keys::SCHEMA_VERSION) {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn store_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let result = state.store().backend().read(keys::SCHEMA_VERSION);
    let latency_us = start.elapsed().as_micros() as u64;

    let schema_version = result
        .as_ref()
        .ok()
        .and_then(|raw| raw.as_deref())
        .and_then(|raw| serde_json::from_slice::<u32>(raw).ok());

    Json(serde_json::json!({
        "healthy": result.is_ok(),
        "latencyUs": latency_us,
        "schemaVersion": schema_version,
    }))
}
