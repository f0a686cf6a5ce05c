//! Typed education content and the fetcher capability that supplies it.

pub mod fetcher;

use serde::{Deserialize, Serialize};

pub use fetcher::{CachedContentFetcher, ContentFetcher, FetchError, HttpContentFetcher};

/// Where a stored content snapshot came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    #[default]
    Static,
    Api,
    User,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    pub title: String,
    pub text: String,
}

/// One unit of card content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentBlock {
    #[serde(rename_all = "camelCase")]
    Fact {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_updated: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Section {
        title: String,
        text: String,
        #[serde(default)]
        subsections: Vec<Subsection>,
    },
    #[serde(rename_all = "camelCase")]
    Discovery {
        date: String,
        title: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    Mission {
        name: String,
        target: String,
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    Milestone {
        when: String,
        event: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    Formula {
        name: String,
        formula: String,
        description: String,
    },
}

/// A browsable education card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub reading_time_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_tagged_by_kind() {
        let block = ContentBlock::Fact {
            text: "Apophis is 375m wide".to_string(),
            source: Some("NASA JPL".to_string()),
            last_updated: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["kind"], "fact");
        assert_eq!(json["source"], "NASA JPL");
        assert!(json.get("lastUpdated").is_none());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = r#"{"kind":"video","url":"x"}"#;
        assert!(serde_json::from_str::<ContentBlock>(raw).is_err());
    }
}
