//! ResponseCache - TTL cache with request coalescing
//!
//! Caches the results of expensive external calls and makes sure that, for
//! any key, at most one computation is running at a time.
//!
//! ## Single-flight
//!
//! The first caller to miss on a key starts the computation as a shared
//! future. Callers arriving while it runs join the same future instead of
//! starting their own, and every one of them receives the same `Result`.
//!
//! The in-flight table only holds a weak handle to the shared future:
//! - a caller that is cancelled (its future dropped) just releases its
//!   handle, and the remaining callers keep driving the computation
//! - once every caller has gone the computation itself is dropped, which
//!   cancels the underlying external call
//!
//! ## Expiry
//!
//! An entry is fresh while `now <= created_at + ttl`. Expired entries are
//! evicted lazily on lookup, or in bulk with `purge_expired`. Failed
//! computations are never stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::key::CacheKey;

// =============================================================================
// Entries
// =============================================================================

/// A cached value with its expiry metadata
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub value: V,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is past its ttl at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.created_at + self.ttl
    }
}

type Computation<V, E> = BoxFuture<'static, Result<V, E>>;

/// Weak handle to a running computation
struct InFlight<V, E> {
    /// Distinguishes this computation from a later one for the same key
    generation: u64,
    computation: WeakShared<Computation<V, E>>,
}

struct CacheInner<V, E> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<CacheKey, InFlight<V, E>>>,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

// =============================================================================
// Response Cache
// =============================================================================

/// Concurrency-safe TTL cache with single-flight computation.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct ResponseCache<V, E> {
    inner: Arc<CacheInner<V, E>>,
}

impl<V, E> Clone for ResponseCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> ResponseCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                computations: AtomicU64::new(0),
            }),
        }
    }

    /// Get a fresh cached value.
    ///
    /// An expired entry is evicted and reported as a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.inner.entries.lock().await;
        let value = take_fresh(&mut entries, key, Instant::now());
        self.record_lookup(value.is_some());
        value
    }

    /// Get a fresh cached value, or compute and cache it.
    ///
    /// `compute` is only called when there is neither a fresh entry nor a
    /// running computation for `key`. On success the value is stored with
    /// `ttl`; on failure nothing is stored and every waiter gets the error.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let computation = {
            // Lock order: in_flight, then entries. The completion path uses
            // the same order, so a finished value is always visible here
            // before its in-flight handle disappears.
            let mut in_flight = self.inner.in_flight.lock().await;

            {
                let mut entries = self.inner.entries.lock().await;
                if let Some(value) = take_fresh(&mut entries, &key, Instant::now()) {
                    self.record_lookup(true);
                    debug!(key = %key, "Cache hit");
                    return Ok(value);
                }
            }
            self.record_lookup(false);

            match in_flight
                .get(&key)
                .and_then(|flight| flight.computation.upgrade())
            {
                Some(running) => {
                    debug!(key = %key, "Joining in-flight computation");
                    running
                }
                None => {
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
                    let computation = self.start(key.clone(), ttl, generation, compute());

                    if let Some(weak) = computation.downgrade() {
                        in_flight.insert(
                            key.clone(),
                            InFlight {
                                generation,
                                computation: weak,
                            },
                        );
                    }

                    debug!(key = %key, generation = generation, "Cache miss, computing");
                    computation
                }
            }
        };

        computation.await
    }

    /// Wrap a computation so that whichever caller drives it to completion
    /// also publishes the result.
    fn start<Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        generation: u64,
        compute: Fut,
    ) -> Shared<Computation<V, E>>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.inner.computations.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);

        async move {
            let result = compute.await;

            let mut in_flight = inner.in_flight.lock().await;

            if let Ok(value) = &result {
                let mut entries = inner.entries.lock().await;
                entries.insert(
                    key.clone(),
                    CacheEntry {
                        key: key.clone(),
                        value: value.clone(),
                        created_at: Instant::now(),
                        ttl,
                    },
                );
            }

            let owned = in_flight
                .get(&key)
                .map(|flight| flight.generation == generation)
                .unwrap_or(false);
            if owned {
                in_flight.remove(&key);
            }

            debug!(
                key = %key,
                generation = generation,
                success = result.is_ok(),
                "Computation finished"
            );

            result
        }
        .boxed()
        .shared()
    }

    /// Remove a single entry. Returns whether it was present.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.inner.entries.lock().await.remove(key).is_some()
    }

    /// Remove every entry. Running computations are unaffected.
    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }

    /// Evict all expired entries, returning how many were removed.
    ///
    /// Also forgets in-flight handles whose computation was abandoned.
    pub async fn purge_expired(&self) -> usize {
        let mut in_flight = self.inner.in_flight.lock().await;
        in_flight.retain(|_, flight| flight.computation.upgrade().is_some());

        let mut entries = self.inner.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired_at(now));

        let evicted = before - entries.len();
        if evicted > 0 {
            info!(evicted = evicted, remaining = entries.len(), "Response cache cleanup");
        }
        evicted
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.inner.entries.lock().await.len();
        let in_flight = self
            .inner
            .in_flight
            .lock()
            .await
            .values()
            .filter(|flight| flight.computation.upgrade().is_some())
            .count();

        CacheStats {
            entries,
            in_flight,
            hits: self.inner.hits.load(Ordering::SeqCst),
            misses: self.inner.misses.load(Ordering::SeqCst),
            computations: self.inner.computations.load(Ordering::SeqCst),
        }
    }

    fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.inner.hits } else { &self.inner.misses };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

impl<V, E> Default for ResponseCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Return a clone of the entry's value if fresh, evicting it if expired.
fn take_fresh<V: Clone>(
    entries: &mut HashMap<CacheKey, CacheEntry<V>>,
    key: &CacheKey,
    now: Instant,
) -> Option<V> {
    match entries.get(key) {
        Some(entry) if !entry.is_expired_at(now) => Some(entry.value.clone()),
        Some(_) => {
            entries.remove(key);
            None
        }
        None => None,
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Response cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    /// Number of times a compute function was actually started
    pub computations: u64,
}

// =============================================================================
// Tests
// =============================================================================
