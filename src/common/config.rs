//! Configuration for votekv services
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`votekv.toml`, or the path in `VOTEKV_CONFIG`), then `VOTEKV_*`
//! environment variables (`__` separates sections, e.g.
//! `VOTEKV_STORAGE__BACKEND=redis`). `REDIS_URL` overrides the redis
//! location. Binaries apply their CLI flags on top.

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

pub const DEFAULT_REDIS_URL: &str = "redis:6379";
pub const DEFAULT_CONFIG_FILE: &str = "votekv.toml";

/// Global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen host shared by all services
    pub host: String,

    /// Logging level (overridden by RUST_LOG)
    pub log_level: String,

    pub storage: StorageConfig,

    pub voter: ServiceConfig,

    pub poll: ServiceConfig,

    pub votes: VotesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
            voter: ServiceConfig { port: 1080 },
            poll: ServiceConfig { port: 1081 },
            votes: VotesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// `host:port` or a full `redis://` URL
    pub redis_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub port: u16,
}

/// Votes service: its own port plus the two services it calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotesConfig {
    pub port: u16,
    pub voter_api_url: String,
    pub poll_api_url: String,
}

impl Default for VotesConfig {
    fn default() -> Self {
        Self {
            port: 1082,
            voter_api_url: "http://host.docker.internal:1080".to_string(),
            poll_api_url: "http://host.docker.internal:1081".to_string(),
        }
    }
}

impl Config {
    /// Load from file and environment. The result is not validated yet;
    /// call [`Config::validate`] once every override is applied.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("VOTEKV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("VOTEKV")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.is_empty() {
                builder = builder.set_override("storage.redis_url", url)?;
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("voter_api_url", &self.votes.voter_api_url),
            ("poll_api_url", &self.votes.poll_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        if self.storage.backend == StorageBackend::Redis && self.storage.redis_url.is_empty() {
            return Err(Error::InvalidConfig("redis backend needs a redis_url".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_service_ports() {
        let config = Config::default();
        assert_eq!(config.voter.port, 1080);
        assert_eq!(config.poll.port, 1081);
        assert_eq!(config.votes.port, 1082);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.bind_addr(1080), "0.0.0.0:1080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
host = "127.0.0.1"

[storage]
backend = "redis"
redis_url = "redis://cache:6379"

[votes]
port = 9000
voter_api_url = "http://voters:1080"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Redis);
        assert_eq!(config.votes.port, 9000);
        assert_eq!(config.votes.voter_api_url, "http://voters:1080");
        // untouched sections keep their defaults
        assert_eq!(config.voter.port, 1080);
        assert_eq!(config.votes.poll_api_url, "http://host.docker.internal:1081");
    }

    #[test]
    fn test_rejects_non_http_upstream() {
        let mut config = Config::default();
        config.votes.poll_api_url = "polls:1081".into();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
