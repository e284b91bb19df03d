//! Surface cache keyed by (underlying symbol, snapshot timestamp).
//!
//! Each key owns a [`tokio::sync::OnceCell`]: the first request for a key runs
//! the build, concurrent requests for the same key wait for that build, and
//! later requests reuse the stored surface without any staleness check.
//!
//! The cache is bounded. When full, inserting a new key evicts the least
//! recently used one. Requests already holding an evicted slot still receive
//! their surface; it is simply not retained.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pricer_core::market_data::SnapshotSurface;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::PipelineError;

/// Default maximum number of cached surfaces.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Cache key of one snapshot surface.
///
/// Two distinct snapshots sharing symbol and timestamp collide and the second
/// reuses the first one's surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Underlying identifier
    pub symbol: String,
    /// Raw snapshot timestamp
    pub timestamp: String,
}

impl CacheKey {
    /// Creates a key.
    pub fn new(symbol: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Statistics for surface cache operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of resident keys
    pub entries: usize,
    /// Requests served without building
    pub hits: u64,
    /// Requests that ran a build
    pub misses: u64,
    /// Successful builds
    pub builds: u64,
    /// Keys evicted due to capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type Slot = Arc<OnceCell<Arc<SnapshotSurface>>>;

#[derive(Debug)]
struct CacheEntry {
    slot: Slot,
    last_access: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    tick: u64,
    stats: CacheStats,
}

/// Bounded LRU cache of snapshot surfaces with one builder per key.
///
/// # Examples
/// ```
/// use pricer_core::market_data::SnapshotSurface;
/// use pricer_pricing::cache::{CacheKey, SurfaceCache};
///
/// let cache = SurfaceCache::new(8);
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
///
/// let key = CacheKey::new("NIFTY", "2025-08-25T16:50:00Z");
/// let (_, built) = rt
///     .block_on(cache.get_or_build(key.clone(), || async { Ok(SnapshotSurface::fallback()) }))
///     .unwrap();
/// assert!(built);
///
/// let (_, built) = rt
///     .block_on(cache.get_or_build(key, || async { Ok(SnapshotSurface::fallback()) }))
///     .unwrap();
/// assert!(!built);
/// assert_eq!(cache.stats().builds, 1);
/// ```
#[derive(Debug)]
pub struct SurfaceCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl Default for SurfaceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SurfaceCache {
    /// Creates a cache holding at most `capacity` surfaces (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of resident keys.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident keys.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether no key is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a built surface is stored under `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.slot.initialized())
    }

    /// Snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    /// Returns the surface stored under `key`, running `build` if there is none.
    ///
    /// Concurrent callers for one key share a single build. A failed build
    /// stores nothing and the error is returned to the caller that ran it.
    ///
    /// # Returns
    /// The surface and whether this call built it.
    pub async fn get_or_build<F, Fut>(
        &self,
        key: CacheKey,
        build: F,
    ) -> Result<(Arc<SnapshotSurface>, bool), PipelineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SnapshotSurface, PipelineError>>,
    {
        let slot = self.slot(&key);
        let ran_build = AtomicBool::new(false);
        let flag = &ran_build;

        let result = slot
            .get_or_try_init(move || async move {
                flag.store(true, Ordering::Relaxed);
                build().await.map(Arc::new)
            })
            .await
            .map(Arc::clone);

        let built = ran_build.load(Ordering::Relaxed);
        let mut state = self.lock();
        if built {
            state.stats.misses += 1;
        }
        match result {
            Ok(surface) => {
                if built {
                    state.stats.builds += 1;
                } else {
                    state.stats.hits += 1;
                }
                Ok((surface, built))
            }
            Err(err) => {
                let unfilled = state
                    .entries
                    .get(&key)
                    .is_some_and(|entry| Arc::ptr_eq(&entry.slot, &slot) && !entry.slot.initialized());
                if unfilled {
                    state.entries.remove(&key);
                }
                Err(err)
            }
        }
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut state = self.lock();
        state.tick += 1;
        let tick = state.tick;

        if let Some(entry) = state.entries.get_mut(key) {
            entry.last_access = tick;
            return Arc::clone(&entry.slot);
        }

        if state.entries.len() >= self.capacity {
            Self::evict_lru(&mut state);
        }

        let slot: Slot = Arc::new(OnceCell::new());
        state.entries.insert(
            key.clone(),
            CacheEntry {
                slot: Arc::clone(&slot),
                last_access: tick,
            },
        );
        slot
    }

    /// Evict the least recently accessed key.
    fn evict_lru(state: &mut CacheState) {
        let lru_key = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            state.entries.remove(&key);
            state.stats.evictions += 1;
            tracing::debug!(symbol = %key.symbol, timestamp = %key.timestamp, "Evicted cached surface");
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn key(symbol: &str) -> CacheKey {
        CacheKey::new(symbol, "2025-08-25T16:50:00Z")
    }

    async fn flat(cache: &SurfaceCache, k: CacheKey, sigma: f64) -> (Arc<SnapshotSurface>, bool) {
        cache
            .get_or_build(k, move || async move { Ok(SnapshotSurface::flat(sigma)) })
            .await
            .unwrap()
    }

    // ========================================
    // Reuse Tests
    // ========================================

    #[tokio::test]
    async fn test_second_request_reuses_surface() {
        let cache = SurfaceCache::new(4);

        let (first, built) = flat(&cache, key("NIFTY"), 0.2).await;
        assert!(built);
        // Builder is not consulted again
        let (second, built) = flat(&cache, key("NIFTY"), 0.9).await;
        assert!(!built);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(
            stats,
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1,
                builds: 1,
                evictions: 0,
            }
        );
        assert_eq!(stats.hit_rate(), 0.5);
        assert!(cache.contains(&key("NIFTY")));
    }

    #[tokio::test]
    async fn test_distinct_keys_build_separately() {
        let cache = SurfaceCache::new(4);
        flat(&cache, key("NIFTY"), 0.2).await;
        flat(&cache, key("BANKNIFTY"), 0.2).await;
        flat(&cache, CacheKey::new("NIFTY", "2025-08-25T16:51:00Z"), 0.2).await;

        assert_eq!(cache.stats().builds, 3);
        assert_eq!(cache.len(), 3);
    }

    // ========================================
    // Failure Tests
    // ========================================

    #[tokio::test]
    async fn test_failed_build_is_not_cached() {
        let cache = SurfaceCache::new(4);

        let err = cache
            .get_or_build(key("NIFTY"), || async {
                Err(PipelineError::InvalidSnapshot("bad chain".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSnapshot(_)));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().builds, 0);

        let (_, built) = flat(&cache, key("NIFTY"), 0.2).await;
        assert!(built);
        assert_eq!(cache.stats().misses, 2);
    }

    // ========================================
    // Concurrency Tests
    // ========================================

    #[tokio::test]
    async fn test_concurrent_requests_share_one_build() {
        let cache = SurfaceCache::new(4);
        let builds = AtomicUsize::new(0);

        let requests = (0..16).map(|_| {
            cache.get_or_build(key("NIFTY"), || async {
                builds.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(SnapshotSurface::fallback())
            })
        });
        let results = join_all(requests).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(results.iter().filter(|r| matches!(r, Ok((_, true)))).count(), 1);

        let stats = cache.stats();
        assert_eq!(stats.builds, 1);
        assert_eq!(stats.hits, 15);
    }

    // ========================================
    // Eviction Tests
    // ========================================

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = SurfaceCache::new(2);
        flat(&cache, key("A"), 0.1).await;
        flat(&cache, key("B"), 0.2).await;
        // Touch A so that B is the least recently used
        flat(&cache, key("A"), 0.1).await;
        flat(&cache, key("C"), 0.3).await;

        assert!(cache.contains(&key("A")));
        assert!(!cache.contains(&key("B")));
        assert!(cache.contains(&key("C")));

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.evictions, 1);
    }

    #[tokio::test]
    async fn test_eviction_does_not_interrupt_inflight_build() {
        let cache = SurfaceCache::new(1);

        let slow = cache.get_or_build(key("A"), || async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(SnapshotSurface::flat(0.1))
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            flat(&cache, key("B"), 0.2).await
        };

        let (slow, _) = tokio::join!(slow, fast);
        let (surface, built) = slow.unwrap();
        assert!(built);
        assert!(surface.is_fallback());

        assert!(!cache.contains(&key("A")));
        assert!(cache.contains(&key("B")));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(SurfaceCache::new(0).capacity(), 1);
        assert_eq!(SurfaceCache::default().capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
