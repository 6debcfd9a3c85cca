//! JSON-RPC wire types (§6 public interface).
//!
//! Addresses, stream ids, and tx hashes cross the wire as `0x`-prefixed hex
//! strings rather than the raw `alloy_primitives` types directly — the same
//! decoupling the teacher workspace uses for its own `Rpc*` DTOs (account
//! ids as base-58, not the raw `AccountId` type). `chainauth-crypto` is
//! where the hex codec actually lives; this module only shapes the request
//! and response bodies and converts at the boundary.

use alloy_primitives::{Address, Bytes, B256};
use chainauth_chain::Log;
use chainauth_core::{DecisionRequest, MembershipStatus, Permission, ReasonCode};
use chainauth_crypto::{parse_address, parse_stream_hash, ParseError};
use chainauth_receipt::UserReceipt;
use serde::{Deserialize, Serialize};

/// Wire form of [`DecisionRequest`]. `kind` selects which fields are
/// required — see [`RpcDecisionRequest::into_core`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcDecisionRequest {
    /// One of `space_entitlement`, `channel_entitlement`, `is_space_member`,
    /// `is_wallet_linked`, `space_enabled`, `channel_enabled` — matching
    /// `DecisionRequest::kind_tag`.
    pub kind: String,
    pub space_id: String,
    pub channel_id: Option<String>,
    pub principal: Option<String>,
    pub wallet_address: Option<String>,
    pub permission: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RpcRequestError {
    #[error("unknown request kind {0:?}")]
    UnknownKind(String),
    #[error("missing required field {0:?} for this request kind")]
    MissingField(&'static str),
    #[error(transparent)]
    Hex(#[from] ParseError),
    #[error(transparent)]
    Permission(#[from] chainauth_core::ParsePermissionError),
    #[error("invalid hex in log data {0:?}: {1}")]
    LogData(String, hex::FromHexError),
}

impl RpcDecisionRequest {
    pub fn into_core(self) -> Result<DecisionRequest, RpcRequestError> {
        let space_id = parse_stream_hash(&self.space_id)?;

        let principal = || -> Result<Address, RpcRequestError> {
            self.principal
                .as_deref()
                .ok_or(RpcRequestError::MissingField("principal"))
                .and_then(|s| Ok(parse_address(s)?))
        };
        let channel_id = || -> Result<B256, RpcRequestError> {
            self.channel_id
                .as_deref()
                .ok_or(RpcRequestError::MissingField("channel_id"))
                .and_then(|s| Ok(parse_stream_hash(s)?))
        };
        let permission = || -> Result<Permission, RpcRequestError> {
            self.permission
                .as_deref()
                .ok_or(RpcRequestError::MissingField("permission"))
                .and_then(|s| Ok(s.parse()?))
        };

        Ok(match self.kind.as_str() {
            "space_entitlement" => DecisionRequest::SpaceEntitlement {
                space_id,
                principal: principal()?,
                permission: permission()?,
            },
            "channel_entitlement" => DecisionRequest::ChannelEntitlement {
                space_id,
                channel_id: channel_id()?,
                principal: principal()?,
                permission: permission()?,
            },
            "is_space_member" => DecisionRequest::IsSpaceMember {
                space_id,
                principal: principal()?,
            },
            "is_wallet_linked" => DecisionRequest::IsWalletLinked {
                principal: principal()?,
                wallet_address: self
                    .wallet_address
                    .as_deref()
                    .ok_or(RpcRequestError::MissingField("wallet_address"))
                    .and_then(|s| Ok(parse_address(s)?))?,
            },
            "space_enabled" => DecisionRequest::SpaceEnabled { space_id },
            "channel_enabled" => DecisionRequest::ChannelEnabled {
                space_id,
                channel_id: channel_id()?,
            },
            other => return Err(RpcRequestError::UnknownKind(other.to_string())),
        })
    }
}

/// Wire form of a [`chainauth_core::Decision`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcDecision {
    pub allowed: bool,
    pub reason: String,
}

impl From<chainauth_core::Decision> for RpcDecision {
    fn from(d: chainauth_core::Decision) -> Self {
        Self {
            allowed: d.allowed,
            reason: reason_code_str(d.reason).to_string(),
        }
    }
}

fn reason_code_str(reason: ReasonCode) -> &'static str {
    match reason {
        ReasonCode::None => "NONE",
        ReasonCode::SpaceDisabled => "SPACE_DISABLED",
        ReasonCode::ChannelDisabled => "CHANNEL_DISABLED",
        ReasonCode::SpaceEntitlements => "SPACE_ENTITLEMENTS",
        ReasonCode::ChannelEntitlements => "CHANNEL_ENTITLEMENTS",
        ReasonCode::Membership => "MEMBERSHIP",
        ReasonCode::MembershipExpired => "MEMBERSHIP_EXPIRED",
        ReasonCode::WalletNotLinked => "WALLET_NOT_LINKED",
    }
}

/// Wire form of a [`MembershipStatus`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcMembershipStatus {
    pub is_member: bool,
    pub is_expired: bool,
    pub expiry: i64,
}

impl From<MembershipStatus> for RpcMembershipStatus {
    fn from(s: MembershipStatus) -> Self {
        Self {
            is_member: s.is_member,
            is_expired: s.is_expired,
            expiry: s.expiry,
        }
    }
}

/// Wire form of a log entry within a receipt (§4.8 step 2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

impl RpcLog {
    fn into_core(self) -> Result<Log, RpcRequestError> {
        let topics = self
            .topics
            .iter()
            .map(|t| parse_stream_hash(t))
            .collect::<Result<Vec<B256>, _>>()?;
        let data = hex::decode(self.data.trim_start_matches("0x"))
            .map_err(|e| RpcRequestError::LogData(self.data.clone(), e))?;
        Ok(Log {
            address: parse_address(&self.address)?,
            topics,
            data: Bytes::from(data),
        })
    }
}

/// Wire form of [`UserReceipt`] submitted to `verifyReceipt` (§4.8).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcVerifyReceiptRequest {
    pub chain_id: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub logs: Vec<RpcLog>,
    pub to: Option<String>,
    pub from: String,
}

impl RpcVerifyReceiptRequest {
    pub fn into_core(self) -> Result<UserReceipt, RpcRequestError> {
        let to = self.to.as_deref().map(parse_address).transpose()?;
        let logs = self
            .logs
            .into_iter()
            .map(RpcLog::into_core)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UserReceipt {
            chain_id: self.chain_id,
            tx_hash: parse_stream_hash(&self.tx_hash)?,
            block_number: self.block_number,
            logs,
            to,
            from: parse_address(&self.from)?,
        })
    }
}
