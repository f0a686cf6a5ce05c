use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::ContentConfig;
use crate::content::{ContentBlock, ContentItem, Difficulty, Subsection};
use crate::store::keys;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("content not found: {0}")]
    NotFound(String),
    #[error("content request timed out")]
    Timeout,
    #[error("content network error: {0}")]
    Network(String),
    #[error("content api error: status={status}, message={message}")]
    Api { status: u16, message: String },
    #[error("malformed content payload: {0}")]
    Decode(String),
    #[error("content client misconfigured: {0}")]
    Config(String),
}

/// Anything that can produce a content item by id.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_content(&self, item_id: &str) -> Result<ContentItem, FetchError>;
}

/// Fetches cards from the education backend (`GET {base}/education/cards/{id}`).
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new(config: &ContentConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| FetchError::Config(format!("invalid api url {}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Config(format!(
                "api url {} cannot carry a path",
                config.api_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// The id is appended as one percent-encoded path segment, so `/`, `?`
    /// and `..` inside it never change the upstream route.
    fn card_url(&self, item_id: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Config("api url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["education", "cards", item_id]);
        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_content(&self, item_id: &str) -> Result<ContentItem, FetchError> {
        let url = self.card_url(item_id)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(item_id.to_string()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: CardEnvelope = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: envelope
                    .error
                    .unwrap_or_else(|| "content request failed".to_string()),
            });
        }

        envelope
            .card
            .map(ContentItem::from)
            .ok_or_else(|| FetchError::Decode("response has no card".to_string()))
    }
}

/// Serves repeated fetches of the same id from a TTL cache. Failed fetches
/// are not cached.
pub struct CachedContentFetcher<F> {
    inner: F,
    cache: Mutex<TtlCache<ContentItem>>,
    ttl_minutes: i64,
}

impl<F: ContentFetcher> CachedContentFetcher<F> {
    pub fn new(inner: F, clock: std::sync::Arc<dyn Clock>, ttl_minutes: i64) -> Self {
        Self {
            inner,
            cache: Mutex::new(TtlCache::new(clock)),
            ttl_minutes,
        }
    }
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for CachedContentFetcher<F> {
    async fn fetch_content(&self, item_id: &str) -> Result<ContentItem, FetchError> {
        let key = keys::content_cache_key(item_id);
        if let Some(item) = self.cache.lock().await.get(&key) {
            tracing::debug!(item_id, "Using cached content");
            return Ok(item);
        }

        let item = self.inner.fetch_content(item_id).await?;
        self.cache
            .lock()
            .await
            .set(key, item.clone(), self.ttl_minutes);
        Ok(item)
    }
}

// Wire shape of the education backend.

#[derive(Debug, Deserialize)]
struct CardEnvelope {
    #[serde(default)]
    success: bool,
    card: Option<WireCard>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCard {
    id: String,
    title: String,
    emoji: Option<String>,
    difficulty: Difficulty,
    #[serde(default)]
    reading_time: u32,
    #[serde(default)]
    category: String,
    description: Option<String>,
    #[serde(default)]
    content: Vec<WireFact>,
    #[serde(default, rename = "detailed_sections")]
    detailed_sections: Vec<WireSection>,
    #[serde(default, rename = "recent_discoveries")]
    recent_discoveries: Vec<WireDiscovery>,
    #[serde(default, rename = "related_missions")]
    related_missions: Vec<WireMission>,
    #[serde(default, rename = "mission_timeline")]
    mission_timeline: Vec<WireMilestone>,
    #[serde(default, rename = "impact_timeline")]
    impact_timeline: Vec<WireMilestone>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFact {
    text: String,
    source: Option<String>,
    last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    subsections: Vec<Subsection>,
}

#[derive(Debug, Deserialize)]
struct WireDiscovery {
    date: String,
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WireMission {
    name: String,
    target: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WireMilestone {
    #[serde(alias = "year", alias = "age")]
    when: String,
    event: String,
    description: String,
}

impl From<WireCard> for ContentItem {
    fn from(card: WireCard) -> Self {
        let facts = card.content.into_iter().map(|f| ContentBlock::Fact {
            text: f.text,
            source: f.source,
            last_updated: f.last_updated,
        });
        let sections = card.detailed_sections.into_iter().map(|s| ContentBlock::Section {
            title: s.title,
            text: s.content,
            subsections: s.subsections,
        });
        let discoveries = card
            .recent_discoveries
            .into_iter()
            .map(|d| ContentBlock::Discovery {
                date: d.date,
                title: d.title,
                description: d.description,
            });
        let missions = card.related_missions.into_iter().map(|m| ContentBlock::Mission {
            name: m.name,
            target: m.target,
            status: m.status,
        });
        let milestones = card
            .mission_timeline
            .into_iter()
            .chain(card.impact_timeline)
            .map(|m| ContentBlock::Milestone {
                when: m.when,
                event: m.event,
                description: m.description,
            });

        ContentItem {
            id: card.id,
            title: card.title,
            emoji: card.emoji,
            category: card.category,
            difficulty: card.difficulty,
            reading_time_minutes: card.reading_time,
            description: card.description,
            blocks: facts
                .chain(sections)
                .chain(discoveries)
                .chain(missions)
                .chain(milestones)
                .collect(),
        }
    }
}
