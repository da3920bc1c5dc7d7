//! Key-value storage abstraction for votekv
//!
//! Two backends satisfy the same trait: an in-process map and a Redis
//! connection. Values are JSON documents stored as strings under
//! `<prefix><id>` keys. Every call is an independent round trip; there is no
//! locking across calls.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::common::config::{StorageBackend, StorageConfig};
use crate::common::Result;

/// Trait for key-value storage backends
#[async_trait]
pub trait KVStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> Result<()>;
    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool>;
    /// All keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// In-memory store (default)
#[derive(Default)]
pub struct MemStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the guard cannot leave a half-written entry.
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KVStore for MemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Redis store
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect and ping. Accepts bare `host:port` as well as `redis://` URLs.
    pub async fn connect(url: &str) -> Result<Self> {
        let url = normalize_redis_url(url);
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_connection_manager().await?;

        let mut probe = conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut probe).await?;
        tracing::info!("Connected to redis at {}", url);

        Ok(Self { conn })
    }
}

#[async_trait]
impl KVStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys: Vec<String> = conn.keys(format!("{}*", prefix)).await?;
        keys.sort();
        Ok(keys)
    }
}

/// `redis:6379` -> `redis://redis:6379`
pub fn normalize_redis_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("redis://{}", url)
    }
}

/// Shared handle to the selected backend
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KVStore>,
}

impl Storage {
    pub fn new_memory() -> Self {
        Self::from_backend(Arc::new(MemStore::new()))
    }

    pub async fn new_redis(url: &str) -> Result<Self> {
        Ok(Self::from_backend(Arc::new(RedisStore::connect(url).await?)))
    }

    pub fn from_backend(backend: Arc<dyn KVStore>) -> Self {
        Self { backend }
    }

    pub async fn open(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::new_memory())
            }
            StorageBackend::Redis => Self::new_redis(&config.redis_url).await,
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.backend.get(key).await
    }

    pub async fn put(&self, key: &str, value: String) -> Result<()> {
        self.backend.put(key, value).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.backend.delete(key).await
    }

    pub async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.backend.keys(prefix).await
    }
}
