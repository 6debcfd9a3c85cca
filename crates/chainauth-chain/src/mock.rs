//! In-memory collaborator implementations for tests. This module exists
//! purely to exercise the pipeline without a real chain — the kind of
//! seam the specification pushes to "external collaborators" (§1) but that
//! a complete crate still needs something to plug in during its own test
//! suite and for local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use chainauth_core::{ChainAuthError, EntitlementRecord, MembershipStatus, Permission, RuleV2};

use crate::client::{ChainClient, ChainClientRegistry, Transaction, TransactionReceipt};
use crate::contracts::{SpaceContract, WalletLinkContract};
use crate::rule::RuleEvaluator;

/// A hand-populated `SpaceContract` double. Every method consults the
/// fields directly; there is no simulated latency or failure unless a
/// field is explicitly set to `Some(Err(..))`.
#[derive(Default)]
pub struct MockSpaceContract {
    pub disabled_spaces: Mutex<HashMap<B256, bool>>,
    pub disabled_channels: Mutex<HashMap<(B256, B256), bool>>,
    pub space_entitlements: Mutex<HashMap<(B256, Permission), (Address, Vec<EntitlementRecord>)>>,
    pub channel_entitlements:
        Mutex<HashMap<(B256, B256, Permission), (Address, Vec<EntitlementRecord>)>>,
    pub banned: Mutex<HashMap<B256, Vec<Address>>>,
    pub membership: Mutex<HashMap<(B256, Address), MembershipStatus>>,
}

impl MockSpaceContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_space_disabled(&self, space_id: B256, disabled: bool) {
        self.disabled_spaces.lock().unwrap().insert(space_id, disabled);
    }

    pub fn set_channel_disabled(&self, space_id: B256, channel_id: B256, disabled: bool) {
        self.disabled_channels
            .lock()
            .unwrap()
            .insert((space_id, channel_id), disabled);
    }

    pub fn set_space_entitlements(
        &self,
        space_id: B256,
        permission: Permission,
        owner: Address,
        records: Vec<EntitlementRecord>,
    ) {
        self.space_entitlements
            .lock()
            .unwrap()
            .insert((space_id, permission), (owner, records));
    }

    pub fn set_channel_entitlements(
        &self,
        space_id: B256,
        channel_id: B256,
        permission: Permission,
        owner: Address,
        records: Vec<EntitlementRecord>,
    ) {
        self.channel_entitlements
            .lock()
            .unwrap()
            .insert((space_id, channel_id, permission), (owner, records));
    }

    pub fn set_banned(&self, space_id: B256, wallets: Vec<Address>) {
        self.banned.lock().unwrap().insert(space_id, wallets);
    }

    pub fn set_membership(&self, space_id: B256, wallet: Address, status: MembershipStatus) {
        self.membership
            .lock()
            .unwrap()
            .insert((space_id, wallet), status);
    }
}

#[async_trait]
impl SpaceContract for MockSpaceContract {
    async fn is_space_disabled(&self, space_id: B256) -> Result<bool, ChainAuthError> {
        Ok(*self.disabled_spaces.lock().unwrap().get(&space_id).unwrap_or(&false))
    }

    async fn is_channel_disabled(
        &self,
        space_id: B256,
        channel_id: B256,
    ) -> Result<bool, ChainAuthError> {
        Ok(*self
            .disabled_channels
            .lock()
            .unwrap()
            .get(&(space_id, channel_id))
            .unwrap_or(&false))
    }

    async fn get_space_entitlements_for_permission(
        &self,
        space_id: B256,
        permission: Permission,
    ) -> Result<(Address, Vec<EntitlementRecord>), ChainAuthError> {
        self.space_entitlements
            .lock()
            .unwrap()
            .get(&(space_id, permission))
            .cloned()
            .ok_or_else(|| ChainAuthError::internal("get_space_entitlements_for_permission", "no fixture"))
    }

    async fn get_channel_entitlements_for_permission(
        &self,
        space_id: B256,
        channel_id: B256,
        permission: Permission,
    ) -> Result<(Address, Vec<EntitlementRecord>), ChainAuthError> {
        self.channel_entitlements
            .lock()
            .unwrap()
            .get(&(space_id, channel_id, permission))
            .cloned()
            .ok_or_else(|| {
                ChainAuthError::internal("get_channel_entitlements_for_permission", "no fixture")
            })
    }

    async fn is_banned(&self, space_id: B256, wallets: &[Address]) -> Result<bool, ChainAuthError> {
        let banned = self.banned.lock().unwrap();
        let Some(list) = banned.get(&space_id) else {
            return Ok(false);
        };
        Ok(wallets.iter().any(|w| list.contains(w)))
    }

    async fn get_membership_status(
        &self,
        space_id: B256,
        principal: Address,
    ) -> Result<MembershipStatus, ChainAuthError> {
        Ok(self
            .membership
            .lock()
            .unwrap()
            .get(&(space_id, principal))
            .copied()
            .unwrap_or_else(MembershipStatus::not_a_member))
    }
}

/// A hand-populated `WalletLinkContract` double.
#[derive(Default)]
pub struct MockWalletLinkContract {
    pub links: Mutex<HashMap<Address, Vec<Address>>>,
}

impl MockWalletLinkContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_linked_wallets(&self, principal: Address, wallets: Vec<Address>) {
        self.links.lock().unwrap().insert(principal, wallets);
    }
}

#[async_trait]
impl WalletLinkContract for MockWalletLinkContract {
    async fn get_linked_wallets(&self, principal: Address) -> Result<Vec<Address>, ChainAuthError> {
        Ok(self.links.lock().unwrap().get(&principal).cloned().unwrap_or_default())
    }
}

/// A `RuleEvaluator` double that treats a `RuleV2`'s bytes as the literal
/// ASCII encoding of `"allow"` or `"deny"`, and upgrades `RuleV1` by
/// appending a version tag byte. Good enough to drive pipeline tests
/// without depending on any real rule DSL.
#[derive(Default)]
pub struct MockRuleEvaluator;

#[async_trait]
impl RuleEvaluator for MockRuleEvaluator {
    async fn evaluate(&self, _wallets: &[Address], rule: &RuleV2) -> Result<bool, ChainAuthError> {
        Ok(rule.0 == b"allow")
    }

    async fn convert_v1_to_v2(&self, rule: &chainauth_core::RuleV1) -> Result<RuleV2, ChainAuthError> {
        Ok(RuleV2(rule.0.clone()))
    }
}

/// A `ChainClient` double backed by fixed fixtures.
#[derive(Default)]
pub struct MockChainClient {
    pub chain_id: String,
    pub receipts: Mutex<HashMap<B256, TransactionReceipt>>,
    pub transactions: Mutex<HashMap<B256, Transaction>>,
    pub latest_block: Mutex<u64>,
}

impl MockChainClient {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            ..Default::default()
        }
    }

    pub fn set_receipt(&self, tx_hash: B256, receipt: TransactionReceipt) {
        self.receipts.lock().unwrap().insert(tx_hash, receipt);
    }

    pub fn set_transaction(&self, tx_hash: B256, tx: Transaction) {
        self.transactions.lock().unwrap().insert(tx_hash, tx);
    }

    pub fn set_latest_block(&self, block: u64) {
        *self.latest_block.lock().unwrap() = block;
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainAuthError> {
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn transaction_by_hash(
        &self,
        tx_hash: B256,
    ) -> Result<Option<Transaction>, ChainAuthError> {
        Ok(self.transactions.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, ChainAuthError> {
        Ok(*self.latest_block.lock().unwrap())
    }
}

/// A `ChainClientRegistry` double keyed by chain id string.
#[derive(Default)]
pub struct MockChainClientRegistry {
    pub clients: Mutex<HashMap<String, Arc<dyn ChainClient>>>,
}

impl MockChainClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, chain_id: impl Into<String>, client: Arc<dyn ChainClient>) {
        self.clients.lock().unwrap().insert(chain_id.into(), client);
    }
}

#[async_trait]
impl ChainClientRegistry for MockChainClientRegistry {
    async fn get_client(&self, chain_id: &str) -> Result<Arc<dyn ChainClient>, ChainAuthError> {
        self.clients
            .lock()
            .unwrap()
            .get(chain_id)
            .cloned()
            .ok_or_else(|| ChainAuthError::internal("get_client", format!("no client registered for chain {chain_id}")))
    }
}
