pub mod cache;
pub mod config;
pub mod dispatch;
pub mod indexer;
pub mod metrics;
pub mod testing;

pub use cache::{fingerprint, CacheSettings, CacheStats, CacheStore, TrackerCacheResult};
pub use config::{
    load_config, load_config_from_str, validate_config, CacheConfig, Config, ConfigError,
    IndexerConfig, LiveSettings, ProxyConfig, RuntimeSettings, SanitizedConfig, ServerConfig,
    UpstreamConfig, CONFIG_PATH_ENV,
};
pub use dispatch::ResultsService;
pub use indexer::{
    AggregateResult, Indexer, IndexerError, IndexerInfo, IndexerResult, JackettIndexer,
    QueryType, Release, TorznabQuery,
};
