//! Configuration recognized by the oracle (§6 Configuration).
//!
//! Loading the config file itself (TOML parsing, env overlay, CLI flags) is
//! ambient plumbing that lives in `chainauth-node`; this module only defines
//! the shape and the defaults, so every crate that needs a `CacheTtls` or a
//! timeout can depend on `chainauth-core` alone.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONTRACT_CALLS_TIMEOUT_MS, DEFAULT_ENTITLEMENT_MANAGER_LONG_TTL_SECS,
    DEFAULT_LINKED_WALLETS_LIMIT, DEFAULT_LONG_TTL_SECS, DEFAULT_SHORT_TTL_SECS,
};

/// Positive/negative TTL pair for one named cache (§4.1).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CacheTtls {
    /// TTL applied to cacheable (positive) results.
    pub positive_secs: u64,
    /// TTL applied to error / non-cacheable (negative) results.
    pub negative_secs: u64,
}

impl CacheTtls {
    pub const fn new(positive_secs: u64, negative_secs: u64) -> Self {
        Self {
            positive_secs,
            negative_secs,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_TTL_SECS, DEFAULT_SHORT_TTL_SECS)
    }
}

/// Top-level configuration for the oracle, matching §6 exactly:
/// `linkedWalletsLimit`, `contractCallsTimeoutMs`, and one `CacheTtls` per
/// named cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainAuthConfig {
    pub linked_wallets_limit: usize,
    pub contract_calls_timeout_ms: u64,
    pub entitlement_cache_ttls: CacheTtls,
    pub entitlement_manager_cache_ttls: CacheTtls,
    pub linked_wallet_cache_ttls: CacheTtls,
    pub membership_cache_ttls: CacheTtls,
}

impl Default for ChainAuthConfig {
    fn default() -> Self {
        Self {
            linked_wallets_limit: DEFAULT_LINKED_WALLETS_LIMIT,
            contract_calls_timeout_ms: DEFAULT_CONTRACT_CALLS_TIMEOUT_MS,
            entitlement_cache_ttls: CacheTtls::default(),
            entitlement_manager_cache_ttls: CacheTtls::new(
                DEFAULT_ENTITLEMENT_MANAGER_LONG_TTL_SECS,
                DEFAULT_SHORT_TTL_SECS,
            ),
            linked_wallet_cache_ttls: CacheTtls::default(),
            membership_cache_ttls: CacheTtls::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = ChainAuthConfig::default();
        assert_eq!(cfg.linked_wallets_limit, 10);
        assert_eq!(cfg.contract_calls_timeout_ms, 10_000);
        assert_eq!(cfg.entitlement_cache_ttls.positive_secs, 15 * 60);
        assert_eq!(cfg.entitlement_cache_ttls.negative_secs, 2);
        assert_eq!(cfg.entitlement_manager_cache_ttls.positive_secs, 30);
    }
}
