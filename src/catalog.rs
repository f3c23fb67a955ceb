use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use rust_embed::Embed;
use serde::Deserialize;
use thiserror::Error;

#[derive(Embed)]
#[folder = "assets/catalog/"]
struct CatalogAssets;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("bundled catalog asset is missing")]
    MissingAsset,
    #[error("catalog is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog has no topics")]
    Empty,
    #[error("topic {0:?} has no keywords")]
    NoKeywords(String),
    #[error("topic {0:?} appears more than once")]
    DuplicateTopic(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct TopicEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "topic", default)]
    topics: Vec<TopicEntry>,
}

/// Major topic -> sub-topic keywords, in declaration order. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct TopicCatalog {
    topics: Vec<TopicEntry>,
}

impl TopicCatalog {
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.topics)
    }

    pub fn new(topics: Vec<TopicEntry>) -> Result<Self, CatalogError> {
        if topics.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for topic in &topics {
            if topic.keywords.is_empty() {
                return Err(CatalogError::NoKeywords(topic.name.clone()));
            }
            if !seen.insert(topic.name.as_str()) {
                return Err(CatalogError::DuplicateTopic(topic.name.clone()));
            }
        }
        Ok(Self { topics })
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        let file = CatalogAssets::get("catalog.toml").ok_or(CatalogError::MissingAsset)?;
        let content = std::str::from_utf8(file.data.as_ref())?;
        Self::from_toml(content)
    }

    /// User catalog from the config dir if present and valid, else the bundled one.
    pub fn load() -> Result<Self, CatalogError> {
        let path = Self::user_path();
        if let Ok(content) = fs::read_to_string(&path) {
            match Self::from_toml(&content) {
                Ok(catalog) => {
                    tracing::info!(path = %path.display(), "loaded user topic catalog");
                    return Ok(catalog);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring invalid user catalog");
                }
            }
        }
        Self::bundled()
    }

    fn user_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dlquiz")
            .join("catalog.toml")
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn first(&self) -> &str {
        // Non-empty by construction.
        &self.topics[0].name
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.position(topic).is_some()
    }

    pub fn keywords(&self, topic: &str) -> Option<&[String]> {
        self.topics
            .iter()
            .find(|t| t.name == topic)
            .map(|t| t.keywords.as_slice())
    }

    fn position(&self, topic: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.name == topic)
    }

    pub fn next_topic(&self, after: &str) -> &str {
        let idx = self.position(after).map(|i| (i + 1) % self.len()).unwrap_or(0);
        &self.topics[idx].name
    }

    pub fn prev_topic(&self, before: &str) -> &str {
        let idx = match self.position(before) {
            Some(0) | None => self.len() - 1,
            Some(i) => i - 1,
        };
        &self.topics[idx].name
    }
}
