//! Common utilities and types shared across votekv services

pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod storage;
pub mod tracing_middleware;

pub use collection::{document_key, Collection, Document};
pub use config::{Config, StorageBackend, StorageConfig, VotesConfig};
pub use error::{Error, Result};
pub use metrics::{HealthReport, RequestStats};
pub use storage::{KVStore, MemStore, RedisStore, Storage};
