//! Hex codec helpers for the 20-byte `Address` and 32-byte `B256` identifiers
//! used throughout the oracle's RPC surface, where chain IDs and addresses
//! arrive as `0x`-prefixed hex strings.

use alloy_primitives::{Address, B256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid address hex {0:?}: {1}")]
    Address(String, alloy_primitives::hex::FromHexError),
    #[error("invalid 32-byte hash hex {0:?}: {1}")]
    Hash(String, alloy_primitives::hex::FromHexError),
}

/// Parse a `0x`-prefixed (or bare) hex string into a 20-byte `Address`.
pub fn parse_address(s: &str) -> Result<Address, ParseError> {
    s.parse::<Address>()
        .map_err(|e| ParseError::Address(s.to_string(), e))
}

/// Parse a `0x`-prefixed (or bare) hex string into a 32-byte `B256` stream id.
pub fn parse_stream_hash(s: &str) -> Result<B256, ParseError> {
    s.parse::<B256>()
        .map_err(|e| ParseError::Hash(s.to_string(), e))
}

/// Lowercase `0x`-prefixed hex rendering, the canonical textual form used in
/// logs and cache keys.
pub fn address_to_hex(addr: &Address) -> String {
    format!("{addr:x}")
}

pub fn hash_to_hex(hash: &B256) -> String {
    format!("{hash:x}")
}
