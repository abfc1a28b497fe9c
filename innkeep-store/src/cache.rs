//! Revenue cache with per-key single-flight recomputation.
//!
//! Process-wide state with an explicit lifecycle: created at startup, cleared
//! by [`RevenueCache::invalidate`] / [`RevenueCache::clear`], torn down at
//! shutdown. All mutation goes through `get_or_compute` and `invalidate`;
//! no caller writes entries directly.
//!
//! Mutual exclusion is per key, not global: a cold read of one
//! (tenant, property, period) never blocks a cold read of another.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use innkeep_core::{PropertyId, RevenueError, RevenueResult, TenantId};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::key::RevenueCacheKey;

/// Configuration for the revenue cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a computed total stays valid without invalidation.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Create a cache config from environment variables.
    ///
    /// Environment variables:
    /// - `INNKEEP_CACHE_TTL_SECS`: entry TTL in seconds (default: 300)
    pub fn from_env() -> Self {
        let ttl_secs = std::env::var("INNKEEP_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);
        Self {
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

/// A cached, already-quantized total.
#[derive(Debug, Clone)]
struct CacheEntry {
    total: Decimal,
    computed_at: DateTime<Utc>,
}

/// The shared state of one in-flight computation: `None` until the leader
/// publishes a result, then the result every waiter receives.
type FlightState = Option<RevenueResult<Decimal>>;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses that started a computation.
    pub misses: u64,
    /// Number of callers that joined an in-flight computation.
    pub coalesced: u64,
    /// Number of explicit invalidations.
    pub invalidations: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Tenant-scoped revenue cache with single-flight recomputation.
///
/// # Single-flight
///
/// On a miss, exactly one caller per key becomes the leader and its
/// computation runs on a spawned task. Concurrent callers for the same key
/// await the leader's result over a watch channel. Because the computation
/// owns its own task, cancelling any waiter - the leader's caller included -
/// does not cancel the computation; it completes and populates the cache for
/// future readers.
///
/// # Failures
///
/// A failed computation is delivered to every waiter and never cached: the
/// next caller recomputes. A failure is never turned into a zero total.
pub struct RevenueCache {
    entries: Arc<DashMap<RevenueCacheKey, CacheEntry>>,
    flights: Arc<DashMap<RevenueCacheKey, watch::Receiver<FlightState>>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    invalidations: AtomicU64,
}

impl RevenueCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            flights: Arc::new(DashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Create a new cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached total for `key`, or run `compute` under the
    /// single-flight guarantee and cache its result.
    ///
    /// `compute` is invoked at most once per flight, and only by the leader.
    /// The returned total is stored verbatim; callers are expected to hand in
    /// an already-quantized value.
    pub async fn get_or_compute<F, Fut>(&self, key: RevenueCacheKey, compute: F) -> RevenueResult<Decimal>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RevenueResult<Decimal>> + Send + 'static,
    {
        if let Some(total) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "cache hit");
            return Ok(total);
        }

        let mut rx = match self.flights.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "joining in-flight computation");
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                // The entry may have landed between the store check and
                // taking the flight slot; recheck before computing.
                if let Some(total) = self.lookup(&key) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(total);
                }

                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "cache miss, starting computation");

                let (tx, rx) = watch::channel(None);
                vacant.insert(rx.clone());

                let entries = Arc::clone(&self.entries);
                let flights = Arc::clone(&self.flights);
                let flight_key = key.clone();
                let future = compute();

                tokio::spawn(async move {
                    let result = future.await;
                    match &result {
                        Ok(total) => {
                            // An invalidation that raced this flight removed
                            // its slot; the stale result must not repopulate
                            // the store. Waiters still receive it.
                            if flights.contains_key(&flight_key) {
                                entries.insert(
                                    flight_key.clone(),
                                    CacheEntry {
                                        total: *total,
                                        computed_at: Utc::now(),
                                    },
                                );
                            }
                        }
                        Err(error) => {
                            tracing::warn!(key = %flight_key, %error, "computation failed, not cached");
                        }
                    }
                    let _ = tx.send(Some(result));
                    flights.remove(&flight_key);
                });

                rx
            }
        };

        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                return result;
            }
            if rx.changed().await.is_err() {
                return Err(RevenueError::aggregation("shared computation ended without a result"));
            }
        }
    }

    /// Remove every period entry for a (tenant, property) pair.
    ///
    /// Triggered externally when a reservation affecting the property
    /// changes. Entries of other pairs - other tenants included - are
    /// untouched. Returns the number of entries removed.
    pub fn invalidate(&self, tenant_id: TenantId, property_id: PropertyId) -> usize {
        let mut removed = 0usize;
        self.entries.retain(|key, _| {
            if key.matches_pair(tenant_id, property_id) {
                removed += 1;
                false
            } else {
                true
            }
        });
        // In-flight computations for the pair lose their slot so their
        // results are not written back after this point.
        self.flights.retain(|key, _| !key.matches_pair(tenant_id, property_id));

        self.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%tenant_id, %property_id, removed, "invalidated cached revenue totals");
        removed
    }

    /// Drop all entries and flight slots. Shutdown/teardown path.
    pub fn clear(&self) {
        self.entries.clear();
        self.flights.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        }
    }

    /// Unexpired entry lookup; expired entries are removed on sight.
    fn lookup(&self, key: &RevenueCacheKey) -> Option<Decimal> {
        let expired = {
            let entry = self.entries.get(key)?;
            let age = Utc::now()
                .signed_duration_since(entry.computed_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if age <= self.config.ttl {
                return Some(entry.total);
            }
            true
        };
        if expired {
            self.entries.remove_if(key, |_, entry| {
                Utc::now()
                    .signed_duration_since(entry.computed_at)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
                    > self.config.ttl
            });
        }
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
