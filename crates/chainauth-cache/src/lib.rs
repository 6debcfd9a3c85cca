pub mod cache;

pub use cache::{
    CacheOutcome, CacheStats, Cache, CachedDecision, CachedEntitlements, CachedValue, Caches,
};
