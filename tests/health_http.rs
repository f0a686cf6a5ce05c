mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::http::{assert_json_error, request, response_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_app().await;

    let live = request(&app.app, Method::GET, "/health/live", None, &[]).await;
    let (live_status, _, _) = response_json(live).await;
    assert_eq!(live_status, StatusCode::OK);

    let ready = request(&app.app, Method::GET, "/health/ready", None, &[]).await;
    let (ready_status, _, _) = response_json(ready).await;
    assert_eq!(ready_status, StatusCode::OK);
}

#[tokio::test]
async fn it_health_store_reports_schema_version() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/health/store", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert!(body["schemaVersion"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn it_request_id_is_echoed() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::GET,
        "/health",
        None,
        &[("x-request-id", "trace-abc_123".to_string())],
    )
    .await;
    let (status, headers, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(headers["x-request-id"], "trace-abc_123");
}

#[tokio::test]
async fn it_unknown_route_is_json_404() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/api/nope", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn it_content_fetch_and_snapshot() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/api/content/asteroid-basics", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Asteroid Fundamentals");
    assert_eq!(body["data"]["blocks"][0]["kind"], "fact");

    let snapshot = app
        .state
        .store()
        .get_snapshot("asteroid-basics")
        .unwrap()
        .expect("snapshot stored");
    assert_eq!(snapshot.version, 1);

    let missing = request(&app.app, Method::GET, "/api/content/unknown", None, &[]).await;
    let (status, _, _) = response_json(missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let down = request(&app.app, Method::GET, "/api/content/upstream-down", None, &[]).await;
    let (status, _, body) = response_json(down).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_json_error(&body, "UPSTREAM_ERROR");
}

#[tokio::test]
async fn it_impact_simulation() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/impact/simulate",
        Some(json!({ "diameterKm": 1.0, "velocityKmS": 20.0 })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["energyRisk"], "EXTREME");
    assert_eq!(body["data"]["estimatedCasualties"], 100_000);

    let resp = request(
        &app.app,
        Method::POST,
        "/api/impact/simulate",
        Some(json!({ "diameterKm": -1.0, "velocityKmS": 20.0 })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_IMPACT_INPUT");
}
