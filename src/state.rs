use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::content::ContentFetcher;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    content: Arc<dyn ContentFetcher>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        content: Arc<dyn ContentFetcher>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            store,
            content,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn content(&self) -> &dyn ContentFetcher {
        self.content.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::content::{ContentItem, FetchError};

    use super::*;

    struct NoContent;

    #[async_trait]
    impl ContentFetcher for NoContent {
        async fn fetch_content(&self, item_id: &str) -> Result<ContentItem, FetchError> {
            Err(FetchError::NotFound(item_id.to_string()))
        }
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(
            Store::open(tmp.path().join("state_shutdown.sled").to_str().unwrap()).unwrap(),
        );
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(store, Arc::new(NoContent), &cfg, tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn content_fetcher_is_shared() {
        let cfg = Config::from_env();
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(Arc::new(Store::in_memory()), Arc::new(NoContent), &cfg, tx);
        let cloned = state.clone();

        assert!(matches!(
            cloned.content().fetch_content("x").await,
            Err(FetchError::NotFound(_))
        ));
        assert!(state.store().all_progress().unwrap().is_empty());
    }
}
