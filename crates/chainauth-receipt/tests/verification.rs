//! End-to-end receipt verification scenarios (§8 properties 10-11), driven
//! through the public `ReceiptVerifier` API against the in-memory mock chain
//! client rather than the crate's own unit tests.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use chainauth_chain::mock::{MockChainClient, MockChainClientRegistry};
use chainauth_chain::{Log, Transaction, TransactionReceipt};
use chainauth_core::ChainAuthError;
use chainauth_receipt::{ReceiptVerifier, UserReceipt};

fn matching_fixture() -> (Arc<MockChainClientRegistry>, UserReceipt) {
    let chain_id = "137";
    let tx_hash = B256::repeat_byte(0xaa);
    let log = Log {
        address: Address::repeat_byte(0x01),
        topics: vec![B256::repeat_byte(0x02), B256::repeat_byte(0x03)],
        data: Bytes::from_static(b"hello"),
    };

    let client = Arc::new(MockChainClient::new(chain_id));
    client.set_receipt(
        tx_hash,
        TransactionReceipt {
            block_number: 50,
            logs: vec![log.clone()],
        },
    );
    client.set_transaction(
        tx_hash,
        Transaction {
            to: Some(Address::repeat_byte(0x04)),
            from: Address::repeat_byte(0x05),
            block_number: Some(50),
        },
    );
    client.set_latest_block(51);

    let registry = Arc::new(MockChainClientRegistry::new());
    registry.register(chain_id, client);

    let receipt = UserReceipt {
        chain_id: chain_id.to_string(),
        tx_hash,
        block_number: 50,
        logs: vec![log],
        to: Some(Address::repeat_byte(0x04)),
        from: Address::repeat_byte(0x05),
    };

    (registry, receipt)
}

/// S-receipt-baseline: a receipt matching the chain byte-for-byte, with one
/// confirmation, verifies.
#[tokio::test]
async fn matching_receipt_with_one_confirmation_verifies() {
    let (registry, receipt) = matching_fixture();
    let verifier = ReceiptVerifier::new(registry);
    assert!(verifier.verify(&receipt).await.unwrap());
}

/// §8 property 10: mutating a single byte of log data fails verification.
#[tokio::test]
async fn single_byte_log_data_mutation_is_denied() {
    let (registry, mut receipt) = matching_fixture();
    receipt.logs[0].data = Bytes::from_static(b"hellp"); // last byte flipped
    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}

/// §8 property 10: a topic swap fails verification even though the topic
/// count is unchanged.
#[tokio::test]
async fn topic_mutation_is_denied() {
    let (registry, mut receipt) = matching_fixture();
    receipt.logs[0].topics[1] = B256::repeat_byte(0xff);
    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}

/// §8 property 10: an extra log fails the count comparison.
#[tokio::test]
async fn extra_log_is_denied() {
    let (registry, mut receipt) = matching_fixture();
    let duplicate = receipt.logs[0].clone();
    receipt.logs.push(duplicate);
    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}

/// §8 property 10: a mutated `from` fails verification.
#[tokio::test]
async fn sender_mutation_is_denied() {
    let (registry, mut receipt) = matching_fixture();
    receipt.from = Address::repeat_byte(0x99);
    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}

/// §8 property 11: zero confirmations (latest == receipt block) is denied;
/// one confirmation passes (already covered by the baseline test above).
#[tokio::test]
async fn zero_confirmations_is_denied() {
    let chain_id = "137";
    let tx_hash = B256::repeat_byte(0xbb);
    let log = Log {
        address: Address::repeat_byte(0x01),
        topics: vec![],
        data: Bytes::new(),
    };
    let client = Arc::new(MockChainClient::new(chain_id));
    client.set_receipt(tx_hash, TransactionReceipt { block_number: 10, logs: vec![log.clone()] });
    client.set_transaction(
        tx_hash,
        Transaction {
            to: None,
            from: Address::repeat_byte(0x02),
            block_number: Some(10),
        },
    );
    client.set_latest_block(10); // same as receipt block — zero confirmations

    let registry = Arc::new(MockChainClientRegistry::new());
    registry.register(chain_id, client);

    let receipt = UserReceipt {
        chain_id: chain_id.to_string(),
        tx_hash,
        block_number: 10,
        logs: vec![log],
        to: None,
        from: Address::repeat_byte(0x02),
    };

    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}

/// A pending transaction (no block number on the transaction itself) is
/// denied even when the receipt has already landed.
#[tokio::test]
async fn pending_transaction_is_denied() {
    let chain_id = "137";
    let tx_hash = B256::repeat_byte(0xcc);
    let log = Log {
        address: Address::repeat_byte(0x01),
        topics: vec![],
        data: Bytes::new(),
    };
    let client = Arc::new(MockChainClient::new(chain_id));
    client.set_receipt(tx_hash, TransactionReceipt { block_number: 10, logs: vec![log.clone()] });
    client.set_transaction(
        tx_hash,
        Transaction {
            to: None,
            from: Address::repeat_byte(0x02),
            block_number: None, // pending
        },
    );
    client.set_latest_block(20);

    let registry = Arc::new(MockChainClientRegistry::new());
    registry.register(chain_id, client);

    let receipt = UserReceipt {
        chain_id: chain_id.to_string(),
        tx_hash,
        block_number: 10,
        logs: vec![log],
        to: None,
        from: Address::repeat_byte(0x02),
    };

    let verifier = ReceiptVerifier::new(registry);
    let err = verifier.verify(&receipt).await.unwrap_err();
    assert!(matches!(err, ChainAuthError::PermissionDenied { .. }));
}
