//! Jackett-compatible upstream indexer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Proxy};
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{IndexerConfig, LiveSettings, UpstreamConfig};

use super::{Indexer, IndexerError, IndexerInfo, QueryType, Release, TorznabQuery};

/// HTTP client together with the proxy it was built for.
struct ClientSlot {
    proxy: Option<String>,
    client: Client,
}

/// An indexer served through a Jackett-compatible aggregator.
///
/// The outbound client follows the live proxy setting: it is rebuilt the
/// first time a request sees a proxy different from the one it was built
/// with.
pub struct JackettIndexer {
    info: IndexerInfo,
    upstream: UpstreamConfig,
    settings: Arc<LiveSettings>,
    client: Mutex<ClientSlot>,
}

impl JackettIndexer {
    pub fn new(
        info: IndexerInfo,
        upstream: UpstreamConfig,
        settings: Arc<LiveSettings>,
    ) -> Result<Self, IndexerError> {
        let proxy = settings.proxy_url();
        let client = build_client(upstream.timeout_secs, proxy.as_deref())?;
        Ok(Self {
            info,
            upstream,
            settings,
            client: Mutex::new(ClientSlot { proxy, client }),
        })
    }

    /// Build an indexer from its `[[indexers]]` entry.
    pub fn from_config(
        config: &IndexerConfig,
        upstream: &UpstreamConfig,
        settings: Arc<LiveSettings>,
    ) -> Result<Self, IndexerError> {
        let info = IndexerInfo::new(
            config.id.clone(),
            config.display_name(),
            config.indexer_type.clone(),
        );
        Self::new(info, upstream.clone(), settings)
    }

    /// Current client, rebuilt if the proxy changed since it was made.
    fn client(&self) -> Result<Client, IndexerError> {
        let proxy = self.settings.proxy_url();
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.proxy != proxy {
            info!(
                indexer = %self.info.id,
                proxy = proxy.as_deref().unwrap_or("none"),
                "Proxy changed, rebuilding HTTP client"
            );
            slot.client = build_client(self.upstream.timeout_secs, proxy.as_deref())?;
            slot.proxy = proxy;
        }
        Ok(slot.client.clone())
    }

    /// Build the Jackett API URL for a query.
    fn build_search_url(&self, query: &TorznabQuery) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.upstream.url.trim_end_matches('/'),
            urlencoding::encode(&self.info.id),
            urlencoding::encode(&self.upstream.api_key),
            urlencoding::encode(&search_text(query))
        );

        for cat in &query.categories {
            url.push_str(&format!("&Category[]={}", cat));
        }

        url
    }
}

#[async_trait]
impl Indexer for JackettIndexer {
    fn info(&self) -> &IndexerInfo {
        &self.info
    }

    async fn perform_query(&self, query: &TorznabQuery) -> Result<Vec<Release>, IndexerError> {
        let client = self.client()?;
        let url = self.build_search_url(query);
        debug!(indexer = %self.info.id, "Querying Jackett");

        let response = client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                IndexerError::Timeout
            } else if e.is_connect() {
                IndexerError::ConnectionFailed(e.to_string())
            } else {
                IndexerError::Api(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IndexerError::Api(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| IndexerError::Api(format!("Failed to parse response: {}", e)))?;

        let releases = paginate(
            jackett_response.Results.into_iter().map(Release::from).collect(),
            query,
        );

        debug!(
            indexer = %self.info.id,
            results = releases.len(),
            "Jackett query complete"
        );

        Ok(releases)
    }
}

fn build_client(timeout_secs: u32, proxy: Option<&str>) -> Result<Client, IndexerError> {
    let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs as u64));
    if let Some(url) = proxy {
        let proxy = Proxy::all(url)
            .map_err(|e| IndexerError::Internal(format!("Invalid proxy URL {}: {}", url, e)))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| IndexerError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Free text sent upstream. TV searches carry the season and episode the
/// way scene release names spell them.
fn search_text(query: &TorznabQuery) -> String {
    let mut text = query.search_term_or_empty().trim().to_string();
    if query.query_type == QueryType::TvSearch {
        let mut tag = String::new();
        if let Some(season) = query.season {
            tag.push_str(&format!("S{:02}", season));
        }
        if let Some(episode) = query.episode.as_deref().filter(|e| !e.is_empty()) {
            match episode.parse::<u32>() {
                Ok(n) => tag.push_str(&format!("E{:02}", n)),
                Err(_) => tag.push_str(&format!(" {}", episode)),
            }
        }
        if !tag.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(tag.trim_start());
        }
    }
    text
}

/// Jackett ignores paging on this endpoint, so apply it locally.
fn paginate(releases: Vec<Release>, query: &TorznabQuery) -> Vec<Release> {
    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    releases.into_iter().skip(offset).take(limit).collect()
}

/// Parse Jackett's date format.
fn parse_jackett_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Try parsing without timezone
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Vec<JackettResult>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(non_snake_case)]
#[serde(default)]
struct JackettResult {
    Guid: Option<String>,
    Title: String,
    Link: Option<String>,
    Details: Option<String>,
    MagnetUri: Option<String>,
    InfoHash: Option<String>,
    PublishDate: Option<String>,
    Category: Option<Vec<u32>>,
    Size: Option<i64>,
    Files: Option<i64>,
    Grabs: Option<i64>,
    Seeders: Option<i64>,
    Peers: Option<i64>,
    Description: Option<String>,
    Imdb: Option<i64>,
    TMDb: Option<i64>,
    DownloadVolumeFactor: Option<f64>,
    UploadVolumeFactor: Option<f64>,
}

fn non_negative<T: TryFrom<i64>>(value: Option<i64>) -> Option<T> {
    value.filter(|v| *v >= 0).and_then(|v| T::try_from(v).ok())
}

impl From<JackettResult> for Release {
    fn from(r: JackettResult) -> Self {
        // Some trackers omit the guid or send it empty; fall back to the
        // most stable non-empty link.
        let guid = [&r.Guid, &r.Link, &r.MagnetUri, &r.Details]
            .into_iter()
            .flatten()
            .find(|g| !g.is_empty())
            .cloned()
            .unwrap_or_else(|| r.Title.clone());

        let publish_date = r
            .PublishDate
            .as_deref()
            .and_then(parse_jackett_date)
            .unwrap_or_default();

        Release {
            guid,
            title: r.Title,
            publish_date,
            link: r.Link,
            details: r.Details,
            magnet_uri: r.MagnetUri,
            info_hash: r.InfoHash.map(|h| h.to_lowercase()),
            categories: r.Category.unwrap_or_default(),
            size: non_negative(r.Size),
            files: non_negative(r.Files),
            grabs: non_negative(r.Grabs),
            seeders: non_negative(r.Seeders),
            peers: non_negative(r.Peers),
            description: r.Description,
            imdb_id: r.Imdb.filter(|id| *id > 0).map(|id| format!("tt{:07}", id)),
            tmdb_id: non_negative(r.TMDb),
            download_volume_factor: r.DownloadVolumeFactor,
            upload_volume_factor: r.UploadVolumeFactor,
        }
    }
}
