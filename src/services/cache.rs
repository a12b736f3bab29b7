use crate::sources::{DataSource, SourceFuture};
use crate::types::{AssetPair, OhlcvSeries, Timeframe};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// A thread-safe cache with TTL support.
pub struct Cache<V> {
    data: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> Cache<V> {
    /// Create a new cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            default_ttl,
        }
    }

    /// Get a value from the cache.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove(key);
            None
        }
    }

    /// Set a value in the cache with the default TTL.
    pub fn set(&self, key: String, value: V) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.default_ttl,
            },
        );
    }

    /// Remove all expired entries from the cache.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    /// Get the number of entries in the cache (including expired).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// [`DataSource`] decorator that memoises candle histories for a TTL.
///
/// Entries are keyed by pair, timeframe and lookback. Spot prices are never
/// cached. A zero TTL turns the decorator into a pass-through.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    histories: Cache<Option<OhlcvSeries>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            histories: Cache::new(ttl),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached histories (including expired).
    pub fn cached_entries(&self) -> usize {
        self.histories.len()
    }

    fn key(pair: &AssetPair, timeframe: Timeframe, limit: usize) -> String {
        format!("{}:{}:{}", pair.joined(), timeframe, limit)
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_history<'a>(
        &'a self,
        pair: &'a AssetPair,
        timeframe: Timeframe,
        limit: usize,
    ) -> SourceFuture<'a, Option<OhlcvSeries>> {
        Box::pin(async move {
            if !self.is_enabled() {
                return self.inner.get_history(pair, timeframe, limit).await;
            }

            let key = Self::key(pair, timeframe, limit);
            if let Some(hit) = self.histories.get(&key) {
                debug!("History cache hit for {}", key);
                return Ok(hit);
            }

            let fetched = self.inner.get_history(pair, timeframe, limit).await?;
            self.histories.set(key, fetched.clone());
            self.histories.cleanup();
            Ok(fetched)
        })
    }

    fn get_current_price<'a>(&'a self, pair: &'a AssetPair) -> SourceFuture<'a, Option<f64>> {
        self.inner.get_current_price(pair)
    }
}
