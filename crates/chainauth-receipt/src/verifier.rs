//! `ReceiptVerifier` (C8, §4.8).

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use chainauth_chain::{ChainClientRegistry, Log};
use chainauth_core::{constants::MIN_RECEIPT_CONFIRMATIONS, ChainAuthError};

/// A user-submitted receipt, claimed to have been produced by some
/// on-chain transaction. `VerifyReceipt` checks this against the
/// authoritative chain state field by field.
#[derive(Clone, Debug)]
pub struct UserReceipt {
    pub chain_id: String,
    pub tx_hash: B256,
    pub block_number: u64,
    pub logs: Vec<Log>,
    pub to: Option<Address>,
    pub from: Address,
}

pub struct ReceiptVerifier {
    registry: Arc<dyn ChainClientRegistry>,
}

impl ReceiptVerifier {
    pub fn new(registry: Arc<dyn ChainClientRegistry>) -> Self {
        Self { registry }
    }

    /// `VerifyReceipt(userReceipt) → bool` (§4.8). Mismatches and
    /// not-found/pending conditions surface as `PermissionDenied` naming
    /// the offending field and both sides of the comparison; transport
    /// failures surface as `DownstreamNetworkError`.
    pub async fn verify(&self, user_receipt: &UserReceipt) -> Result<bool, ChainAuthError> {
        let client = self.registry.get_client(&user_receipt.chain_id).await?;

        // Step 1: fetch the authoritative receipt. Collaborator calls
        // already return `ChainAuthError` (retryable `DownstreamNetworkError`
        // variants included), so failures just propagate unchanged.
        let receipt = client
            .transaction_receipt(user_receipt.tx_hash)
            .await?
            .ok_or_else(|| denied("transaction receipt not found"))?;

        // Step 2: byte-exact comparison of blockNumber and logs.
        if receipt.block_number != user_receipt.block_number {
            return Err(denied(&format!(
                "blockNumber mismatch: authoritative={} submitted={}",
                receipt.block_number, user_receipt.block_number
            )));
        }
        if receipt.logs.len() != user_receipt.logs.len() {
            return Err(denied(&format!(
                "log count mismatch: authoritative={} submitted={}",
                receipt.logs.len(),
                user_receipt.logs.len()
            )));
        }
        for (i, (authoritative, submitted)) in receipt.logs.iter().zip(user_receipt.logs.iter()).enumerate() {
            compare_log(i, authoritative, submitted)?;
        }

        // Step 3: fetch the transaction, reject pending, compare to/from.
        let tx = client
            .transaction_by_hash(user_receipt.tx_hash)
            .await?
            .ok_or_else(|| denied("transaction not found"))?;

        if tx.block_number.is_none() {
            return Err(denied("transaction is still pending"));
        }
        if tx.to != user_receipt.to {
            return Err(denied(&format!(
                "to mismatch: authoritative={:?} submitted={:?}",
                tx.to, user_receipt.to
            )));
        }
        if tx.from != user_receipt.from {
            return Err(denied(&format!(
                "from mismatch: authoritative={} submitted={}",
                tx.from, user_receipt.from
            )));
        }

        // Step 4: confirmation depth.
        let latest = client.block_number().await?;

        if latest.saturating_sub(receipt.block_number) < MIN_RECEIPT_CONFIRMATIONS {
            return Err(denied(&format!(
                "insufficient confirmations: latest={latest} receipt_block={}",
                receipt.block_number
            )));
        }

        Ok(true)
    }
}

fn compare_log(index: usize, authoritative: &Log, submitted: &Log) -> Result<(), ChainAuthError> {
    if authoritative.address != submitted.address {
        return Err(denied(&format!(
            "log[{index}] address mismatch: authoritative={} submitted={}",
            authoritative.address, submitted.address
        )));
    }
    if authoritative.topics.len() != submitted.topics.len() {
        return Err(denied(&format!(
            "log[{index}] topic count mismatch: authoritative={} submitted={}",
            authoritative.topics.len(),
            submitted.topics.len()
        )));
    }
    for (j, (a, s)) in authoritative.topics.iter().zip(submitted.topics.iter()).enumerate() {
        if a != s {
            return Err(denied(&format!("log[{index}] topic[{j}] mismatch: authoritative={a} submitted={s}")));
        }
    }
    if authoritative.data != submitted.data {
        return Err(denied(&format!("log[{index}] data mismatch")));
    }
    Ok(())
}

fn denied(reason: &str) -> ChainAuthError {
    ChainAuthError::PermissionDenied {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainauth_chain::mock::{MockChainClient, MockChainClientRegistry};
    use chainauth_chain::{Transaction, TransactionReceipt};
    use alloy_primitives::{Bytes, B256};

    fn fixture() -> (Arc<MockChainClientRegistry>, UserReceipt, B256) {
        let chain_id = "1";
        let tx_hash = B256::repeat_byte(0x01);
        let client = Arc::new(MockChainClient::new(chain_id));

        let log = Log {
            address: Address::repeat_byte(0x02),
            topics: vec![B256::repeat_byte(0x03)],
            data: Bytes::from_static(b"payload"),
        };
        client.set_receipt(
            tx_hash,
            TransactionReceipt {
                block_number: 100,
                logs: vec![log.clone()],
            },
        );
        client.set_transaction(
            tx_hash,
            Transaction {
                to: Some(Address::repeat_byte(0x04)),
                from: Address::repeat_byte(0x05),
                block_number: Some(100),
            },
        );
        client.set_latest_block(105);

        let registry = Arc::new(MockChainClientRegistry::new());
        registry.register(chain_id, client);

        let user_receipt = UserReceipt {
            chain_id: chain_id.to_string(),
            tx_hash,
            block_number: 100,
            logs: vec![log],
            to: Some(Address::repeat_byte(0x04)),
            from: Address::repeat_byte(0x05),
        };

        (registry, user_receipt, tx_hash)
    }

    #[tokio::test]
    async fn matching_receipt_verifies() {
        let (registry, user_receipt, _) = fixture();
        let verifier = ReceiptVerifier::new(registry);
        assert!(verifier.verify(&user_receipt).await.unwrap());
    }

    #[tokio::test]
    async fn block_number_mismatch_is_denied() {
        let (registry, mut user_receipt, _) = fixture();
        user_receipt.block_number = 999;
        let verifier = ReceiptVerifier::new(registry);
        let err = verifier.verify(&user_receipt).await.unwrap_err();
        assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn missing_receipt_is_denied() {
        let (registry, mut user_receipt, _) = fixture();
        user_receipt.tx_hash = B256::repeat_byte(0xff);
        let verifier = ReceiptVerifier::new(registry);
        let err = verifier.verify(&user_receipt).await.unwrap_err();
        assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn insufficient_confirmations_is_denied() {
        let (registry, user_receipt, _) = fixture();
        let verifier = ReceiptVerifier::new(registry.clone());

        // Re-register a fresh client whose latest block equals the receipt
        // block, i.e. zero confirmations.
        let chain_id = "1";
        let fresh = Arc::new(MockChainClient::new(chain_id));
        fresh.set_receipt(
            user_receipt.tx_hash,
            TransactionReceipt {
                block_number: 100,
                logs: user_receipt.logs.clone(),
            },
        );
        fresh.set_transaction(
            user_receipt.tx_hash,
            Transaction {
                to: user_receipt.to,
                from: user_receipt.from,
                block_number: Some(100),
            },
        );
        fresh.set_latest_block(100);
        registry.register(chain_id, fresh);

        let err = verifier.verify(&user_receipt).await.unwrap_err();
        assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
    }
}
