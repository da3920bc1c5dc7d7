//! Flags shared by the service binaries

use clap::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::common::config::{Config, StorageBackend};

/// Overrides applied on top of [`Config::load`]. Unset flags keep the
/// file/environment value. Binaries validate after every override is in.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Storage backend
    #[arg(long, value_enum)]
    pub backend: Option<StorageBackend>,

    /// Redis location (`host:port` or `redis://...`)
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServeArgs {
    /// Apply these flags. `port` picks which service's port `--port` sets.
    pub fn apply(&self, config: &mut Config, port: impl FnOnce(&mut Config) -> &mut u16) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(p) = self.port {
            *port(config) = p;
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if let Some(url) = &self.redis_url {
            config.storage.redis_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

/// Where the votes service finds the voter and poll services.
#[derive(Args, Debug, Clone, Default)]
pub struct UpstreamArgs {
    /// Base URL of the voter service
    #[arg(long = "voter-api", short = 'v')]
    pub voter_api_url: Option<String>,

    /// Base URL of the poll service
    #[arg(long = "poll-api")]
    pub poll_api_url: Option<String>,
}

impl UpstreamArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.voter_api_url {
            config.votes.voter_api_url = url.clone();
        }
        if let Some(url) = &self.poll_api_url {
            config.votes.poll_api_url = url.clone();
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
