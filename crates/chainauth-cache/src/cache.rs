//! Generic keyed TTL cache with single-flight deduplication (§4.1, C1).
//!
//! Built on `moka`'s async cache rather than a hand-rolled
//! mutex-plus-`HashMap`: `try_get_with` already gives single-flight
//! semantics for concurrent misses on the same key (only one initializer
//! future runs; every other caller awaits its result) and never caches an
//! `Err` result, matching §4.1's error-propagation rule exactly. The only
//! piece moka doesn't give us for free is *per-entry* TTL that depends on
//! whether the cached value is "positive" or "negative" — that's supplied
//! by the [`VariableExpiry`] policy below.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chainauth_core::{CacheTtls, ChainAuthError};
use moka::future::Cache as MokaCache;
use moka::Expiry;

/// A value as stored in the cache, carrying the bookkeeping §3 requires:
/// when it was inserted and whether it should be treated as a long- or
/// short-lived entry.
#[derive(Clone, Debug)]
pub struct CachedValue<T> {
    pub result: T,
    pub inserted_at: u64,
    pub positive: bool,
}

/// What an `execute_using_cache` closure hands back: the value to cache,
/// and whether it's cacheable as "positive" (long TTL) or should only be
/// held briefly as "negative" (short TTL). This is orthogonal to the
/// business meaning of the value — a `false` authorization answer that is
/// still safe to cache is `positive: true`; an RPC failure is
/// `positive: false` regardless of what it returns.
pub struct CacheOutcome<T> {
    pub value: T,
    pub positive: bool,
}

impl<T> CacheOutcome<T> {
    pub fn positive(value: T) -> Self {
        Self {
            value,
            positive: true,
        }
    }

    pub fn negative(value: T) -> Self {
        Self {
            value,
            positive: false,
        }
    }
}

struct VariableExpiry {
    ttls: CacheTtls,
}

impl<K, T> Expiry<K, CachedValue<T>> for VariableExpiry {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &CachedValue<T>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(if value.positive {
            self.ttls.positive_secs
        } else {
            self.ttls.negative_secs
        }))
    }
}

/// Cache statistics for observability — "counters are monotonic and may be
/// updated by any worker" (§5).
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// A named, independently-TTL'd cache instance. The oracle keeps four of
/// these (`entitlementCache`, `entitlementManagerCache`, `linkedWalletCache`,
/// `membershipCache`) so TTL tuning stays per-purpose (§9 design notes).
pub struct Cache<T: Clone + Send + Sync + 'static> {
    name: &'static str,
    inner: MokaCache<String, CachedValue<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> Cache<T> {
    pub fn new(name: &'static str, ttls: CacheTtls) -> Self {
        let inner = MokaCache::builder()
            .expire_after(VariableExpiry { ttls })
            .build();
        Self {
            name,
            inner,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Lookup-or-compute (§4.1). Returns `(value, was_cache_hit)`. On a
    /// miss, exactly one concurrent caller for `key` runs `compute`; every
    /// other concurrent caller for the same key awaits and receives the
    /// same result (single-flight, §8 property 1). `compute`'s errors are
    /// never cached — they propagate to every waiter and the next call
    /// re-invokes `compute` (§4.1 error semantics).
    pub async fn execute_using_cache<F, Fut>(
        &self,
        key: impl Into<String>,
        compute: F,
    ) -> Result<(T, bool), ChainAuthError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<CacheOutcome<T>, ChainAuthError>> + Send + 'static,
    {
        let key = key.into();

        if let Some(cached) = self.inner.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cache = self.name, %key, "cache hit");
            return Ok((cached.result, true));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(cache = self.name, %key, "cache miss — computing");

        let init = async {
            let outcome = compute().await?;
            Ok::<_, ChainAuthError>(CachedValue {
                result: outcome.value,
                inserted_at: now_unix(),
                positive: outcome.positive,
            })
        };

        match self.inner.try_get_with(key.clone(), init).await {
            Ok(cached) => Ok((cached.result, false)),
            Err(arc_err) => {
                tracing::warn!(cache = self.name, %key, error = %arc_err, "cache compute failed");
                Err((*arc_err).clone())
            }
        }
    }

    /// Immediate removal of `key` (§4.1 Bust). Computations already in
    /// flight are unaffected — their next caller re-enters single-flight
    /// once the bust has landed.
    pub fn bust(&self, key: &str) {
        self.inner.invalidate(key);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// The cache instances the pipeline shares. The specification names four
/// ("entitlementCache", "entitlementManagerCache", "linkedWalletCache",
/// "membershipCache") as untyped key-value maps; a statically typed cache
/// needs one instance per distinct value type, so `entitlementCache`'s
/// policy is realized here as two same-TTL instances — `entitlement` for
/// the outer pipeline decision and `enabled` for `EnableChecker`'s booleans
/// — rather than one map holding mixed types.
pub struct Caches {
    pub entitlement: Arc<Cache<CachedDecision>>,
    pub enabled: Arc<Cache<bool>>,
    pub entitlement_manager: Arc<Cache<CachedEntitlements>>,
    pub linked_wallet: Arc<Cache<chainauth_core::WalletSet>>,
    pub membership: Arc<Cache<chainauth_core::MembershipStatus>>,
}

/// Cached shape of the outer pipeline decision (§4.7 step 7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedDecision {
    pub allowed: bool,
    pub reason: chainauth_core::ReasonCode,
}

/// Cached shape of an entitlement-manager lookup: owner plus the records
/// (§4.5).
#[derive(Clone, Debug)]
pub struct CachedEntitlements {
    pub owner: alloy_primitives::Address,
    pub records: Vec<chainauth_core::EntitlementRecord>,
}

impl Caches {
    pub fn new(cfg: &chainauth_core::ChainAuthConfig) -> Self {
        Self {
            entitlement: Arc::new(Cache::new("entitlementCache", cfg.entitlement_cache_ttls)),
            enabled: Arc::new(Cache::new("entitlementCache.enabled", cfg.entitlement_cache_ttls)),
            entitlement_manager: Arc::new(Cache::new(
                "entitlementManagerCache",
                cfg.entitlement_manager_cache_ttls,
            )),
            linked_wallet: Arc::new(Cache::new(
                "linkedWalletCache",
                cfg.linked_wallet_cache_ttls,
            )),
            membership: Arc::new(Cache::new("membershipCache", cfg.membership_cache_ttls)),
        }
    }
}
