//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackercache_core::testing::{fixtures, MockIndexer};
//!
//! let indexer = MockIndexer::new("abc");
//! indexer.set_results(fixtures::releases("ubuntu", 5)).await;
//!
//! // Hand it to a ResultsService...
//! ```

mod mock_indexer;

pub use mock_indexer::{MockIndexer, RecordedQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{Duration, Utc};

    use crate::indexer::{IndexerInfo, Release, TorznabQuery};

    /// Create an indexer identity.
    pub fn indexer_info(id: &str) -> IndexerInfo {
        IndexerInfo::new(id, format!("{} Tracker", id.to_uppercase()), "public")
    }

    /// Create a release published now, with reasonable defaults.
    pub fn release(guid: &str, title: &str) -> Release {
        let mut release = Release::new(guid, title, Utc::now());
        release.link = Some(format!("https://tracker.example/dl/{}", guid));
        release.size = Some(1024 * 1024 * 700); // 700 MB
        release.seeders = Some(50);
        release.peers = Some(60);
        release.categories = vec![2000];
        release
    }

    /// Create `n` releases with guids `{prefix}-0..n`, newest first.
    pub fn releases(prefix: &str, n: usize) -> Vec<Release> {
        let now = Utc::now();
        (0..n)
            .map(|i| {
                let mut r = release(&format!("{}-{}", prefix, i), &format!("{} {}", prefix, i));
                r.publish_date = now - Duration::minutes(i as i64);
                r
            })
            .collect()
    }

    /// Create a free-text search query.
    pub fn query(term: &str) -> TorznabQuery {
        TorznabQuery::search(term)
    }
}
