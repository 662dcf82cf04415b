use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides, e.g. `TRACKERCACHE_CACHE__TTL_SECS=600`.
pub const ENV_PREFIX: &str = "TRACKERCACHE_";

/// Environment variable holding the config file path. Not a config key.
pub const CONFIG_PATH_ENV: &str = "TRACKERCACHE_CONFIG";

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Nested keys are separated by `__` since field names contain `_`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(env_overrides())
        .extract()
        .map_err(parse_error)
}

/// Load configuration from a TOML string, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Toml::string(toml_str))
        .extract()
        .map_err(parse_error)
}

fn env_overrides() -> Env {
    let path_key = &CONFIG_PATH_ENV[ENV_PREFIX.len()..];
    Env::prefixed(ENV_PREFIX).ignore(&[path_key]).split("__")
}

/// Flatten figment's error chain, naming the offending key of each error
/// (e.g. `cache.ttl_secs: invalid type ...`).
fn parse_error(error: figment::Error) -> ConfigError {
    let messages: Vec<String> = error
        .into_iter()
        .map(|e| {
            if e.path.is_empty() {
                e.kind.to_string()
            } else {
                format!("{}: {}", e.path.join("."), e.kind)
            }
        })
        .collect();
    ConfigError::ParseError(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[cache]
ttl_secs = 3600
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_load_config_from_str_wrong_type_names_key() {
        let toml = r#"
[cache]
enabled = "sometimes"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ParseError(message) => assert!(
                message.contains("cache.enabled"),
                "unexpected message: {}",
                message
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_config_from_str_malformed() {
        let err = load_config_from_str("[cache\nttl_secs = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_file = write_config(
            r#"
[server]
host = "127.0.0.1"
port = 3000

[cache]
max_results_per_indexer = 42

[[indexers]]
id = "abc"
type = "private"
"#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.cache.max_results_per_indexer, 42);
        assert_eq!(config.indexers[0].indexer_type, "private");
    }

    #[test]
    fn test_env_overrides_nested_cache_keys() {
        let temp_file = write_config("[cache]\nttl_secs = 100\n");

        // Only this test sets these variables.
        std::env::set_var("TRACKERCACHE_PROXY__URL", "socks5://127.0.0.1:1080");
        std::env::set_var(CONFIG_PATH_ENV, "/somewhere/else.toml");
        let result = load_config(temp_file.path());
        std::env::remove_var("TRACKERCACHE_PROXY__URL");
        std::env::remove_var(CONFIG_PATH_ENV);

        let config = result.unwrap();
        assert_eq!(config.cache.ttl_secs, 100);
        assert_eq!(config.proxy.url.as_deref(), Some("socks5://127.0.0.1:1080"));
    }
}
