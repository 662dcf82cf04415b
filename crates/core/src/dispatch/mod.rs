//! Query dispatch through the result cache.
//!
//! `ResultsService` is the single path by which queries reach indexers: a
//! non-test query is answered from the cache when possible, otherwise it
//! hits the live indexer and the response is cached for next time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::indexer::{
    AggregateResult, Indexer, IndexerError, IndexerInfo, IndexerResult, TorznabQuery,
};
use crate::metrics::{INDEXER_REQUESTS, INDEXER_REQUEST_DURATION, SEARCH_RESULTS};

/// Routes queries to indexers through the shared cache.
pub struct ResultsService {
    cache: Arc<CacheStore>,
    indexers: Vec<Arc<dyn Indexer>>,
}

impl ResultsService {
    pub fn new(cache: Arc<CacheStore>, indexers: Vec<Arc<dyn Indexer>>) -> Self {
        Self { cache, indexers }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Identities of every registered indexer, in registration order.
    pub fn indexers(&self) -> Vec<IndexerInfo> {
        self.indexers.iter().map(|i| i.info().clone()).collect()
    }

    pub fn indexer(&self, id: &str) -> Option<&Arc<dyn Indexer>> {
        self.indexers.iter().find(|i| i.info().id == id)
    }

    /// Answer one query from one indexer.
    ///
    /// Test queries always go to the live indexer and are never cached.
    pub async fn results_for_query(
        &self,
        indexer: &dyn Indexer,
        query: &TorznabQuery,
    ) -> Result<IndexerResult, IndexerError> {
        let info = indexer.info();
        let start = Instant::now();

        if !query.is_test {
            if let Some(releases) = self.cache.search(info, query) {
                return Ok(IndexerResult {
                    indexer: info.clone(),
                    releases,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    is_from_cache: true,
                });
            }
        }

        let generation = self.cache.generation();
        let outcome = indexer.perform_query(query).await;
        let elapsed = start.elapsed();
        INDEXER_REQUEST_DURATION
            .with_label_values(&[info.id.as_str()])
            .observe(elapsed.as_secs_f64());

        let releases = match outcome {
            Ok(releases) => {
                INDEXER_REQUESTS
                    .with_label_values(&[info.id.as_str(), "success"])
                    .inc();
                releases
            }
            Err(e) => {
                INDEXER_REQUESTS
                    .with_label_values(&[info.id.as_str(), "error"])
                    .inc();
                return Err(e);
            }
        };
        SEARCH_RESULTS
            .with_label_values(&[])
            .observe(releases.len() as f64);

        // Skipped if the cache was purged while the fetch was in flight.
        self.cache
            .cache_results_from(generation, info, query, &releases);

        Ok(IndexerResult {
            indexer: info.clone(),
            releases,
            elapsed_ms: elapsed.as_millis() as u64,
            is_from_cache: false,
        })
    }

    /// Fan a query out to the selected indexers (all of them when `ids` is
    /// `None`) and collect what each returned.
    ///
    /// Individual failures are reported in `indexer_errors`; the call only
    /// fails when an id is unknown or no indexer answered.
    pub async fn search(
        &self,
        query: &TorznabQuery,
        ids: Option<&[String]>,
    ) -> Result<AggregateResult, IndexerError> {
        let start = Instant::now();

        let selected: Vec<&Arc<dyn Indexer>> = match ids {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.indexer(id)
                        .ok_or_else(|| IndexerError::NotFound(id.clone()))
                })
                .collect::<Result<_, _>>()?,
            None => self.indexers.iter().collect(),
        };

        if selected.is_empty() {
            return Err(IndexerError::AllFailed(
                [("*".to_string(), "No indexers selected".to_string())].into(),
            ));
        }

        debug!(
            indexers = selected.len(),
            query = %query.search_term_or_empty(),
            "Starting parallel search"
        );

        let futures = selected.iter().map(|&indexer| async move {
            let result = self.results_for_query(&**indexer, query).await;
            (indexer.info().id.clone(), result)
        });
        let outcomes = futures::future::join_all(futures).await;

        let mut results = Vec::new();
        let mut indexer_errors: HashMap<String, String> = HashMap::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(indexer = %id, error = %e, "Indexer query failed");
                    indexer_errors.insert(id, e.to_string());
                }
            }
        }

        if results.is_empty() {
            return Err(IndexerError::AllFailed(indexer_errors));
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            indexers = results.len(),
            failed = indexer_errors.len(),
            cached = results.iter().filter(|r| r.is_from_cache).count(),
            duration_ms,
            "Search complete"
        );

        Ok(AggregateResult {
            results,
            duration_ms,
            indexer_errors,
        })
    }
}
