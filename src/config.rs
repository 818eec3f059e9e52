use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default AbuseIPDB v2 API root.
pub const DEFAULT_ABUSEIPDB_BASE_URL: &str = "https://api.abuseipdb.com/api/v2";
/// Default timeout applied to outbound HTTP calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the tool server.
///
/// The AbuseIPDB credential is deliberately absent: it is read from the environment on every
/// call so that a missing key fails the call instead of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root URL of the AbuseIPDB API.
    pub abuseipdb_base_url: String,
    /// Timeout applied to each outbound HTTP request.
    pub http_timeout_secs: u64,
    /// Backend used to persist snippets.
    pub snippet_store: SnippetStoreKind,
    /// Root directory for the filesystem snippet store.
    pub snippet_root: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional function key required by the HTTP surface.
    pub function_key: Option<String>,
}

/// Supported snippet storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetStoreKind {
    /// Blobs written under [`Config::snippet_root`].
    Fs,
    /// Process-local map, lost on restart.
    Memory,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            abuseipdb_base_url: load_env_optional("ABUSEIPDB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ABUSEIPDB_BASE_URL.to_string()),
            http_timeout_secs: load_env_optional("MCPTOOL_HTTP_TIMEOUT_SECS")
                .map(|value| {
                    value.parse().map_err(|_| {
                        ConfigError::InvalidValue("MCPTOOL_HTTP_TIMEOUT_SECS".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            snippet_store: load_env_optional("SNIPPET_STORE")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("SNIPPET_STORE".to_string()))
                })
                .transpose()?
                .unwrap_or(SnippetStoreKind::Fs),
            snippet_root: load_env_optional("SNIPPET_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            server_port: load_env_optional("SERVER_PORT")
                .or_else(|| load_env_optional("FUNCTIONS_CUSTOMHANDLER_PORT"))
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            function_key: load_env_optional("MCPTOOL_FUNCTION_KEY"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            abuseipdb_base_url: DEFAULT_ABUSEIPDB_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            snippet_store: SnippetStoreKind::Fs,
            snippet_root: PathBuf::from("data"),
            server_port: None,
            function_key: None,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for SnippetStoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fs" | "file" | "filesystem" => Ok(Self::Fs),
            "memory" | "mem" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        abuseipdb_base_url = %config.abuseipdb_base_url,
        http_timeout_secs = config.http_timeout_secs,
        snippet_store = ?config.snippet_store,
        snippet_root = %config.snippet_root.display(),
        server_port = ?config.server_port,
        function_key = config.function_key.is_some(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_store_kind_parses_aliases() {
        assert_eq!("fs".parse(), Ok(SnippetStoreKind::Fs));
        assert_eq!("Memory".parse(), Ok(SnippetStoreKind::Memory));
        assert_eq!(" filesystem ".parse(), Ok(SnippetStoreKind::Fs));
        assert_eq!("s3".parse::<SnippetStoreKind>(), Err(()));
    }

    #[test]
    fn default_config_targets_public_api() {
        let config = Config::default();
        assert_eq!(config.abuseipdb_base_url, DEFAULT_ABUSEIPDB_BASE_URL);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.snippet_store, SnippetStoreKind::Fs);
        assert!(config.function_key.is_none());
    }
}
