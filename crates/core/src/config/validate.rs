use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Longest accepted cache TTL (one year).
pub(crate) const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Cache TTL and per-indexer cap are usable
/// - Indexer ids are present and unique, and an upstream exists to serve them
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.cache.ttl_secs == 0 || config.cache.ttl_secs > MAX_CACHE_TTL_SECS {
        return Err(ConfigError::ValidationError(format!(
            "cache.ttl_secs must be between 1 and {}",
            MAX_CACHE_TTL_SECS
        )));
    }

    if config.cache.max_results_per_indexer == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_results_per_indexer cannot be 0".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for indexer in &config.indexers {
        if indexer.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "indexer id cannot be empty".to_string(),
            ));
        }
        if !seen.insert(indexer.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate indexer id: {}",
                indexer.id
            )));
        }
    }

    if !config.indexers.is_empty() && config.upstream.is_none() {
        return Err(ConfigError::ValidationError(
            "indexers are configured but no [upstream] section is present".to_string(),
        ));
    }

    Ok(())
}
