//! Expiring key/value cache shared by the market data service.
//!
//! Entries expire individually; there is no size-based eviction since the
//! key space is bounded by the ticker universe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct Inner<V> {
    map: HashMap<String, Entry<V>>,
    default_ttl: Duration,
}

/// Cloneable handle to a TTL cache
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Arc<RwLock<Inner<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                map: HashMap::new(),
                default_ttl,
            })),
        }
    }

    /// Value for `key` unless it is missing or expired
    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.inner.read().await;
        store
            .map
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Insert with the default TTL unless `ttl_override` is given.
    /// A zero TTL disables the write.
    pub async fn put(&self, key: impl Into<String>, value: V, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        let ttl = ttl_override.unwrap_or(store.default_ttl);
        if ttl.is_zero() {
            return;
        }
        store.map.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn remove(&self, key: &str) -> Option<V> {
        self.inner.write().await.map.remove(key).map(|entry| entry.value)
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner.write().await.map.retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Entry count, expired entries included
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
