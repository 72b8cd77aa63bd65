use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::{CacheKey, canonical_key};

/// Contract for a pluggable cold cache tier. Implementations may be backed by
/// disk, a database or a remote store; a synchronous backend simply returns
/// ready values.
#[async_trait]
pub trait CacheStore<V>: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<V>>;
    async fn set(&self, key: &CacheKey, value: V) -> Result<()>;
    async fn has(&self, key: &CacheKey) -> Result<bool>;
    async fn delete(&self, key: &CacheKey) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
}

/// Hot-tier capacities for the four navigator caches. A single table, not
/// dependent on whether cold tiers are attached.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub snapshot_capacity: usize,
    pub type_meta_capacity: usize,
    pub element_capacity: usize,
    pub children_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: 100,
            type_meta_capacity: 500,
            element_capacity: 2_000,
            children_capacity: 500,
        }
    }
}

/// Bounded in-memory LRU with an optional asynchronous cold tier behind it.
///
/// Reads promote cold hits into the hot tier. Writes go to the hot tier
/// synchronously and to the cold tier fire-and-forget. Cold-tier failures
/// never reach the caller.
pub struct TieredCache<V> {
    hot: Arc<RwLock<LruCache<String, V>>>,
    cold: Option<Arc<dyn CacheStore<V>>>,
}

impl<V> std::fmt::Debug for TieredCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("has_cold_tier", &self.cold.is_some())
            .finish_non_exhaustive()
    }
}

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize, cold: Option<Arc<dyn CacheStore<V>>>) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            crate::error::NavigatorError::configuration_error("cache capacity cannot be zero")
        })?;

        Ok(Self {
            hot: Arc::new(RwLock::new(LruCache::new(capacity))),
            cold,
        })
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<V>> {
        let internal = canonical_key(key)?;

        {
            let mut hot = self.hot.write().await;
            if let Some(value) = hot.get(&internal) {
                return Ok(Some(value.clone()));
            }
        }

        let Some(cold) = &self.cold else {
            return Ok(None);
        };

        match cold.get(key).await {
            Ok(Some(value)) => {
                let mut hot = self.hot.write().await;
                hot.put(internal, value.clone());
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::debug!("cold cache get failed for {internal}: {err}");
                Ok(None)
            }
        }
    }

    pub async fn set(&self, key: &CacheKey, value: V) -> Result<()> {
        let internal = canonical_key(key)?;

        {
            let mut hot = self.hot.write().await;
            hot.put(internal.clone(), value.clone());
        }

        if let Some(cold) = &self.cold {
            let cold = Arc::clone(cold);
            let key = key.clone();
            tokio::spawn(async move {
                if let Err(err) = cold.set(&key, value).await {
                    tracing::debug!("cold cache write failed: {err}");
                }
            });
        }

        Ok(())
    }

    pub async fn has(&self, key: &CacheKey) -> Result<bool> {
        let internal = canonical_key(key)?;

        {
            let hot = self.hot.read().await;
            if hot.contains(&internal) {
                return Ok(true);
            }
        }

        let Some(cold) = &self.cold else {
            return Ok(false);
        };

        match cold.has(key).await {
            Ok(found) => Ok(found),
            Err(err) => {
                tracing::debug!("cold cache has failed for {internal}: {err}");
                Ok(false)
            }
        }
    }

    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let internal = canonical_key(key)?;

        let hot_removed = {
            let mut hot = self.hot.write().await;
            hot.pop(&internal).is_some()
        };

        let Some(cold) = &self.cold else {
            return Ok(hot_removed);
        };

        match cold.delete(key).await {
            Ok(cold_removed) => Ok(hot_removed || cold_removed),
            Err(err) => {
                tracing::debug!("cold cache delete failed for {internal}: {err}");
                Ok(hot_removed)
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        {
            let mut hot = self.hot.write().await;
            hot.clear();
        }

        if let Some(cold) = &self.cold {
            if let Err(err) = cold.clear().await {
                tracing::debug!("cold cache clear failed: {err}");
            }
        }

        Ok(())
    }
}
