//! ─── chainauth protocol defaults ────────────────────────────────────────────

/// Default cap on the number of linked wallets a decision will fan out
/// evaluation over (§4.7 step 4, §8 property 6).
pub const DEFAULT_LINKED_WALLETS_LIMIT: usize = 10;

/// Default budget for the whole decision pipeline, milliseconds (§4.7).
pub const DEFAULT_CONTRACT_CALLS_TIMEOUT_MS: u64 = 10_000;

/// Default positive TTL for `entitlementCache` / `linkedWalletCache` /
/// `membershipCache`: 15 minutes (§4.1).
pub const DEFAULT_LONG_TTL_SECS: u64 = 15 * 60;

/// Default negative TTL shared by all four caches: 2 seconds (§4.1).
pub const DEFAULT_SHORT_TTL_SECS: u64 = 2;

/// `entitlementManagerCache` uses a shorter positive TTL than the others
/// because contract state behind it (entitlement rules) changes more
/// dynamically than membership or enable flags (§4.1, §4.5).
pub const DEFAULT_ENTITLEMENT_MANAGER_LONG_TTL_SECS: u64 = 30;

/// Minimum on-chain confirmations a receipt must have to be accepted
/// (§4.8 step 4): `latestBlockNumber - receipt.blockNumber >= 1`.
pub const MIN_RECEIPT_CONFIRMATIONS: u64 = 1;
