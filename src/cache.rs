use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{CacheBackend, CacheConfig};
use crate::utils::error::Result;

const KEY_PREFIX: &str = "product:";

/// Title to last-known-price store. Plain get/set, no expiry.
#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Cache key for a product title. The title is used verbatim, so titles that differ
/// only in case or whitespace get separate entries.
pub fn cache_key(title: &str) -> String {
    format!("{}{}", KEY_PREFIX, title)
}

/// Redis-backed cache shared by every session of the process.
#[derive(Clone)]
pub struct RedisPriceCache {
    conn: ConnectionManager,
}

impl RedisPriceCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        info!("Connected to Redis price cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl PriceCache for RedisPriceCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

/// Process-local cache for tests and for running without Redis.
#[derive(Debug, Clone, Default)]
pub struct MemoryPriceCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl PriceCache for MemoryPriceCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Open the configured backend.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn PriceCache>> {
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisPriceCache::connect(&config.redis_url).await?)),
        CacheBackend::Memory => {
            warn!("Using in-memory price cache; known prices are lost on restart");
            Ok(Arc::new(MemoryPriceCache::new()))
        }
    }
}

/// Decides whether a product needs processing by comparing against the cached price.
#[derive(Clone)]
pub struct ChangeDetector {
    cache: Arc<dyn PriceCache>,
}

impl ChangeDetector {
    pub fn new(cache: Arc<dyn PriceCache>) -> Self {
        Self { cache }
    }

    /// True only when an entry exists and matches `price` exactly (string equality).
    pub async fn is_unchanged(&self, title: &str, price: &str) -> Result<bool> {
        let previous = self.cache.get(&cache_key(title)).await?;
        debug!(title, ?previous, price, "Cache lookup");
        Ok(previous.as_deref() == Some(price))
    }

    /// Overwrite the stored price; last write wins.
    pub async fn record(&self, title: &str, price: &str) -> Result<()> {
        self.cache.set(&cache_key(title), price).await
    }
}
