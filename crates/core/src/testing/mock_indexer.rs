//! Mock indexer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::indexer::{Indexer, IndexerError, IndexerInfo, Release, TorznabQuery};

/// A recorded live query for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    /// The query that was performed.
    pub query: TorznabQuery,
    /// When the query was made.
    pub timestamp: Instant,
}

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&TorznabQuery) -> Option<Vec<Release>> + Send + Sync>;

/// Mock implementation of the Indexer trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable releases
/// - Track live queries for assertions (cache hits never reach the mock)
/// - Simulate failures and slow responses
///
/// # Example
///
/// ```rust,ignore
/// use trackercache_core::testing::{MockIndexer, fixtures};
///
/// let indexer = MockIndexer::new("abc");
/// indexer.set_results(vec![
///     fixtures::release("ubuntu-1", "Ubuntu 24.04 Desktop"),
/// ]).await;
///
/// let releases = indexer.perform_query(&fixtures::query("ubuntu")).await?;
/// assert_eq!(releases.len(), 1);
/// assert_eq!(indexer.query_count().await, 1);
/// ```
pub struct MockIndexer {
    info: IndexerInfo,
    /// Configured results to return.
    results: Arc<RwLock<Vec<Release>>>,
    /// Recorded live queries.
    queries: Arc<RwLock<Vec<RecordedQuery>>>,
    /// If set, the next query will fail with this error.
    next_error: Arc<RwLock<Option<IndexerError>>>,
    /// If set, every query fails with this message.
    always_fail: Arc<RwLock<Option<String>>>,
    /// Simulated response time.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Query handler for dynamic result generation.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockIndexer")
            .field("info", &self.info)
            .field("results", &"<results>")
            .field("queries", &"<queries>")
            .field("next_error", &"<next_error>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl MockIndexer {
    /// Create a public mock indexer named after its id, with no results.
    pub fn new(id: &str) -> Self {
        Self::with_info(IndexerInfo::new(id, format!("{} Tracker", id.to_uppercase()), "public"))
    }

    pub fn with_info(info: IndexerInfo) -> Self {
        Self {
            info,
            results: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the results to return for subsequent queries.
    pub async fn set_results(&self, results: Vec<Release>) {
        *self.results.write().await = results;
    }

    /// Get recorded live queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of live queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Configure the next query to fail with the given error.
    pub async fn set_next_error(&self, error: IndexerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every query fail until cleared with `None`.
    pub async fn set_always_fail(&self, message: Option<&str>) {
        *self.always_fail.write().await = message.map(str::to_string);
    }

    /// Delay every response by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Set a handler that picks results per query.
    ///
    /// Returning `None` falls back to the configured results.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&TorznabQuery) -> Option<Vec<Release>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn info(&self) -> &IndexerInfo {
        &self.info
    }

    async fn perform_query(&self, query: &TorznabQuery) -> Result<Vec<Release>, IndexerError> {
        self.queries.write().await.push(RecordedQuery {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(message) = self.always_fail.read().await.clone() {
            return Err(IndexerError::ConnectionFailed(message));
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(results) = h(query) {
                return Ok(results);
            }
        }
        drop(handler);

        Ok(self.results.read().await.clone())
    }
}
