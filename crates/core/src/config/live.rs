//! Runtime-mutable part of the configuration.

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use super::validate::MAX_CACHE_TTL_SECS;
use super::{CacheConfig, Config, ConfigError, ProxyConfig};
use crate::cache::CacheSettings;

/// Settings that can be changed while the server is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl RuntimeSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 || self.cache.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "cache.ttl_secs must be between 1 and {}",
                MAX_CACHE_TTL_SECS
            )));
        }
        if self.cache.max_results_per_indexer == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_results_per_indexer cannot be 0".to_string(),
            ));
        }
        if let Some(url) = &self.proxy.url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "proxy.url cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Shared handle over the live settings.
///
/// The cache and the outbound HTTP clients read through this on every call,
/// so an update takes effect for the next request.
#[derive(Debug, Default)]
pub struct LiveSettings {
    inner: RwLock<RuntimeSettings>,
}

impl LiveSettings {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RuntimeSettings {
            cache: config.cache.clone(),
            proxy: config.proxy.clone(),
        })
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> RuntimeSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings. Returns `true` when the proxy changed.
    pub fn update(&self, settings: RuntimeSettings) -> bool {
        let mut current = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let proxy_changed = current.proxy != settings.proxy;
        *current = settings;
        proxy_changed
    }

    /// Toggle the cache without touching the rest.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .enabled = enabled;
    }

    pub fn proxy_url(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .proxy
            .url
            .clone()
    }
}

impl CacheSettings for LiveSettings {
    fn cache_enabled(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .enabled
    }

    fn cache_ttl(&self) -> Duration {
        let secs = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .ttl_secs;
        Duration::from_secs(secs)
    }

    fn cache_max_results_per_indexer(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .max_results_per_indexer
    }
}

impl CacheSettings for CacheConfig {
    fn cache_enabled(&self) -> bool {
        self.enabled
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn cache_max_results_per_indexer(&self) -> usize {
        self.max_results_per_indexer
    }
}
