//! `ChainClientRegistry` / `ChainClient` (§6) — the abstract per-chain RPC
//! surface `ReceiptVerifier` (C8) needs. Concrete clients, retry/backoff and
//! ABI decoding stay outside this crate (§1 Non-goals); callers plug in
//! whatever transport reaches the actual chain.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use chainauth_core::ChainAuthError;

/// A single emitted log entry, compared byte-exactly by `ReceiptVerifier`
/// (§4.8 step 2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The authoritative transaction receipt as read back from the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub block_number: u64,
    pub logs: Vec<Log>,
}

/// A transaction as addressed by hash; `None` fields model "not yet mined"
/// (§4.8 step 3: pending transactions fail verification).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub to: Option<Address>,
    pub from: Address,
    pub block_number: Option<u64>,
}

/// Per-chain client surface (§6). `chain_id` echoes back the id the client
/// was constructed for, used in error messages.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> &str;

    /// `None` models "receipt not found" (§4.8 step 1).
    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainAuthError>;

    /// `None` models "transaction not found at all"; a found-but-pending
    /// transaction is `Some(Transaction { block_number: None, .. })`.
    async fn transaction_by_hash(
        &self,
        tx_hash: B256,
    ) -> Result<Option<Transaction>, ChainAuthError>;

    async fn block_number(&self) -> Result<u64, ChainAuthError>;
}

/// Looks up the `ChainClient` for a chain id (§6: `ChainClientRegistry.
/// GetClient(chainId)`).
#[async_trait]
pub trait ChainClientRegistry: Send + Sync {
    async fn get_client(&self, chain_id: &str) -> Result<std::sync::Arc<dyn ChainClient>, ChainAuthError>;
}
