//! Types shared by indexers, the cache and the dispatcher.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Identity and display metadata of a single indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerInfo {
    /// Stable identifier, used as the cache partition key.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Indexer category (public, semi-private, private).
    #[serde(rename = "type")]
    pub indexer_type: String,
}

impl IndexerInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, indexer_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            indexer_type: indexer_type.into(),
        }
    }
}

/// Kind of Torznab request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Search,
    TvSearch,
    Movie,
    Music,
    Book,
    Caps,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Search => "search",
            QueryType::TvSearch => "tvsearch",
            QueryType::Movie => "movie",
            QueryType::Music => "music",
            QueryType::Book => "book",
            QueryType::Caps => "caps",
        }
    }
}

/// A normalized search request, independent of any indexer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorznabQuery {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    /// Free-text search term. `None` and `Some("")` are the same query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    /// Torznab category ids.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Client API key. Transport only, never part of the cache key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Set when an indexer configuration is being tested. Test queries always
    /// hit the live indexer and are never cached.
    pub is_test: bool,
}

impl TorznabQuery {
    /// Free-text search query of the given type.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: Vec<u32>) -> Self {
        self.categories = categories;
        self
    }

    pub fn as_test(mut self) -> Self {
        self.is_test = true;
        self
    }

    /// The search term with `None` folded into the empty string.
    pub fn search_term_or_empty(&self) -> &str {
        self.search_term.as_deref().unwrap_or("")
    }
}

/// A single release returned by an indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Unique identifier of the release on its indexer.
    pub guid: String,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grabs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_volume_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_volume_factor: Option<f64>,
}

impl Release {
    /// Minimal release; the optional fields start out empty.
    pub fn new(guid: impl Into<String>, title: impl Into<String>, publish_date: DateTime<Utc>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            publish_date,
            link: None,
            details: None,
            magnet_uri: None,
            info_hash: None,
            categories: Vec::new(),
            size: None,
            files: None,
            grabs: None,
            seeders: None,
            peers: None,
            description: None,
            imdb_id: None,
            tmdb_id: None,
            download_volume_factor: None,
            upload_volume_factor: None,
        }
    }
}

/// Result of running one query against one indexer.
#[derive(Debug, Clone, Serialize)]
pub struct IndexerResult {
    pub indexer: IndexerInfo,
    pub releases: Vec<Release>,
    pub elapsed_ms: u64,
    /// Whether the releases were served from the result cache.
    pub is_from_cache: bool,
}

/// Combined result of a query fanned out to several indexers.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub results: Vec<IndexerResult>,
    pub duration_ms: u64,
    /// Indexers that failed (id -> error message).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub indexer_errors: HashMap<String, String>,
}

/// Errors that can occur while querying an indexer.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Indexer connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Indexer API error: {0}")]
    Api(String),

    #[error("Indexer not found: {0}")]
    NotFound(String),

    #[error("Request timeout")]
    Timeout,

    #[error("All indexers failed")]
    AllFailed(HashMap<String, String>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A remote site that can answer Torznab queries.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Identity used for cache partitioning and reporting.
    fn info(&self) -> &IndexerInfo;

    /// Run the query against the live site.
    async fn perform_query(&self, query: &TorznabQuery) -> Result<Vec<Release>, IndexerError>;
}
