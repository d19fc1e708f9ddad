//! Configuration management for restgraph clients.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`RESTGRAPH_SERVER__` prefix)
//! 2. Config file (`restgraph.toml`, `[server]` table)
//! 3. Defaults

use serde::Deserialize;

use crate::error::ConfigError;

/// Default REST endpoint of a local server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:7474/db/data";

/// Connection settings for a graph server's REST API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute base URL; request paths are appended to it.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `<file_prefix>.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("RESTGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded = match cfg.get::<ClientConfig>("server") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => {
                tracing::debug!(file_prefix, "No [server] configuration found, using defaults");
                ClientConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        loaded.validate()?;
        Ok(loaded)
    }

    /// Check that the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Endpoint without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://localhost:7474/db/data");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.username.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restgraph.toml");
        std::fs::write(
            &path,
            "[server]\nendpoint = \"https://graph.internal:7473/db/data/\"\nusername = \"neo4j\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let prefix = dir.path().join("restgraph");
        let config = ClientConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.endpoint, "https://graph.internal:7473/db/data/");
        assert_eq!(config.base_url(), "https://graph.internal:7473/db/data");
        assert_eq!(config.username.as_deref(), Some("neo4j"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = ClientConfig {
            endpoint: "bolt://localhost:7687".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
