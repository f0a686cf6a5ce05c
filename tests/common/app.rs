use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use meteorsim_progress::config::{Config, ContentConfig, WorkerConfig};
use meteorsim_progress::content::{
    ContentBlock, ContentFetcher, ContentItem, Difficulty, FetchError,
};
use meteorsim_progress::routes::build_router;
use meteorsim_progress::state::AppState;
use meteorsim_progress::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

/// Serves a fixed catalogue; unknown ids are `NotFound`.
pub struct StaticContent;

#[async_trait]
impl ContentFetcher for StaticContent {
    async fn fetch_content(&self, item_id: &str) -> Result<ContentItem, FetchError> {
        match item_id {
            "asteroid-basics" => Ok(ContentItem {
                id: item_id.to_string(),
                title: "Asteroid Fundamentals".to_string(),
                emoji: Some("🪨".to_string()),
                category: "basics".to_string(),
                difficulty: Difficulty::Beginner,
                reading_time_minutes: 5,
                description: Some("Rocky remnants of the early solar system".to_string()),
                blocks: vec![ContentBlock::Fact {
                    text: "Most asteroids orbit between Mars and Jupiter".to_string(),
                    source: Some("NASA".to_string()),
                    last_updated: None,
                }],
            }),
            "upstream-down" => Err(FetchError::Network("connection refused".to_string())),
            _ => Err(FetchError::NotFound(item_id.to_string())),
        }
    }
}

pub fn test_config(sled_path: String) -> Config {
    // Built directly rather than through env vars, which race across test threads.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            enable_data_retention: false,
            retention_days: 30,
            retention_cron: "0 0 3 * * *".to_string(),
        },
        content: ContentConfig {
            api_url: "http://127.0.0.1:9/api".to_string(),
            timeout_secs: 2,
            cache_ttl_minutes: 15,
        },
    }
}

pub async fn spawn_test_app_with_content(content: Arc<dyn ContentFetcher>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("meteorsim-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store, content, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with_content(Arc::new(StaticContent)).await
}
