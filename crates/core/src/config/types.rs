use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub upstream: Option<UpstreamConfig>,
    #[serde(default)]
    pub indexers: Vec<IndexerConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    9117
}

/// Result cache configuration.
///
/// These values can be changed at runtime through `LiveSettings`; the cache
/// re-reads them on every operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Master switch. Disabling also purges everything cached so far.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Seconds a cached query stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound on cached releases per indexer, summed over its queries.
    #[serde(default = "default_cache_max_results")]
    pub max_results_per_indexer: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl_secs(),
            max_results_per_indexer: default_cache_max_results(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    2100
}

fn default_cache_max_results() -> usize {
    1000
}

/// Outbound proxy used for live indexer requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "socks5://127.0.0.1:1080"). `None` means direct.
    #[serde(default)]
    pub url: Option<String>,
}

/// Upstream aggregator used for live fetches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Upstream server URL (e.g., "http://localhost:9118")
    pub url: String,
    /// Upstream API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// An indexer exposed by the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Stable id, also the upstream indexer id.
    pub id: String,
    /// Display name (defaults to the id).
    #[serde(default)]
    pub name: Option<String>,
    /// Indexer category.
    #[serde(default = "default_indexer_type", rename = "type")]
    pub indexer_type: String,
}

fn default_indexer_type() -> String {
    "public".to_string()
}

impl IndexerConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub proxy_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<SanitizedUpstreamConfig>,
    pub indexers: Vec<IndexerConfig>,
}

/// Sanitized upstream config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUpstreamConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            cache: config.cache.clone(),
            proxy_configured: config.proxy.url.is_some(),
            upstream: config.upstream.as_ref().map(|u| SanitizedUpstreamConfig {
                url: u.url.clone(),
                api_key_configured: !u.api_key.is_empty(),
                timeout_secs: u.timeout_secs,
            }),
            indexers: config.indexers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 9117);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 2100);
        assert_eq!(config.cache.max_results_per_indexer, 1000);
        assert!(config.proxy.url.is_none());
        assert!(config.upstream.is_none());
        assert!(config.indexers.is_empty());
    }

    #[test]
    fn test_deserialize_cache_section() {
        let toml = r#"
[cache]
enabled = false
ttl_secs = 60
max_results_per_indexer = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_results_per_indexer, 250);
    }

    #[test]
    fn test_deserialize_indexers() {
        let toml = r#"
[upstream]
url = "http://localhost:9118"
api_key = "key"

[[indexers]]
id = "abc"
name = "ABC Tracker"
type = "private"

[[indexers]]
id = "xyz"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.indexers.len(), 2);
        assert_eq!(config.indexers[0].display_name(), "ABC Tracker");
        assert_eq!(config.indexers[0].indexer_type, "private");
        assert_eq!(config.indexers[1].display_name(), "xyz");
        assert_eq!(config.indexers[1].indexer_type, "public");
        assert_eq!(config.upstream.as_ref().unwrap().timeout_secs, 30);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            upstream: Some(UpstreamConfig {
                url: "http://localhost:9118".to_string(),
                api_key: "secret-key".to_string(),
                timeout_secs: 60,
            }),
            proxy: ProxyConfig {
                url: Some("http://proxy:3128".to_string()),
            },
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let upstream = sanitized.upstream.as_ref().unwrap();
        assert!(upstream.api_key_configured);
        assert_eq!(upstream.timeout_secs, 60);
        assert!(sanitized.proxy_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
        assert!(!json.contains("proxy:3128"));
    }
}
