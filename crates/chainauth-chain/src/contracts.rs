//! Collaborator interfaces the pipeline consumes (§6). These are the
//! "concrete blockchain RPC clients, contract ABI codecs" the specification
//! explicitly puts out of scope for the core — the oracle only needs to
//! agree on the shape of the call, not how it reaches the chain.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use chainauth_core::{ChainAuthError, EntitlementRecord, MembershipStatus, Permission};

/// The on-chain space/channel entitlement contract (§6).
#[async_trait]
pub trait SpaceContract: Send + Sync {
    async fn is_space_disabled(&self, space_id: B256) -> Result<bool, ChainAuthError>;

    async fn is_channel_disabled(
        &self,
        space_id: B256,
        channel_id: B256,
    ) -> Result<bool, ChainAuthError>;

    /// Returns `(owner, records)` — the spec orders this `(records, owner)`
    /// in prose but every caller destructures both, so the order here
    /// follows `EntitlementFetcher`'s own contract (§4.5: `(ownerAddress,
    /// EntitlementRecord[])`).
    async fn get_space_entitlements_for_permission(
        &self,
        space_id: B256,
        permission: Permission,
    ) -> Result<(Address, Vec<EntitlementRecord>), ChainAuthError>;

    async fn get_channel_entitlements_for_permission(
        &self,
        space_id: B256,
        channel_id: B256,
        permission: Permission,
    ) -> Result<(Address, Vec<EntitlementRecord>), ChainAuthError>;

    async fn is_banned(&self, space_id: B256, wallets: &[Address]) -> Result<bool, ChainAuthError>;

    async fn get_membership_status(
        &self,
        space_id: B256,
        principal: Address,
    ) -> Result<MembershipStatus, ChainAuthError>;
}

/// The on-chain wallet-link contract (§6). May legitimately be absent —
/// `LinkedWalletResolver` degrades to `{principal}` when so (§4.2).
#[async_trait]
pub trait WalletLinkContract: Send + Sync {
    async fn get_linked_wallets(&self, principal: Address) -> Result<Vec<Address>, ChainAuthError>;
}
