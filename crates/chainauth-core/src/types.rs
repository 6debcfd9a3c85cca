//! Core data model: principals, scopes, permissions, and entitlement records.
//!
//! Addresses and hashes reuse `alloy_primitives` rather than hand-rolled
//! byte-array newtypes: `Address` is the 20-byte account/wallet identifier,
//! `B256` is the 32-byte stream/transaction identifier, both already carry
//! correct hex `Display`/`FromStr` and serde impls.

use std::collections::BTreeSet;
use std::fmt;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A user's root-key account address. Distinguished from `Address` only by
/// intent — a principal is always the "who" of a decision request.
pub type Principal = Address;

/// 32-byte opaque stream identifier (space or channel).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamId {
    Space(B256),
    Channel { space_id: B256, channel_id: B256 },
}

impl StreamId {
    pub fn space_id(&self) -> B256 {
        match self {
            StreamId::Space(id) => *id,
            StreamId::Channel { space_id, .. } => *space_id,
        }
    }

    pub fn channel_id(&self) -> Option<B256> {
        match self {
            StreamId::Space(_) => None,
            StreamId::Channel { channel_id, .. } => Some(*channel_id),
        }
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamId::Space(id) => write!(f, "Space({id})"),
            StreamId::Channel {
                space_id,
                channel_id,
            } => write!(f, "Channel({space_id}/{channel_id})"),
        }
    }
}

/// Symbolic permission. Opaque to the pipeline except that `Read` triggers
/// linked-wallet cache invalidation — see `LinkedWalletResolver::resolve`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Read,
    Write,
    React,
    Redact,
    ModifyChannelPermissions,
    ModifyBanning,
    PinMessage,
    AddRemoveChannels,
    Invite,
    JoinSpace,
    Custom(u16),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Custom(n) => write!(f, "Custom({n})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Wire-format parse error for [`Permission`] (used at the RPC boundary,
/// where permissions arrive as strings — see `chainauth-rpc`).
#[derive(Debug, thiserror::Error)]
#[error("unrecognized permission {0:?}")]
pub struct ParsePermissionError(String);

impl std::str::FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Read" => Permission::Read,
            "Write" => Permission::Write,
            "React" => Permission::React,
            "Redact" => Permission::Redact,
            "ModifyChannelPermissions" => Permission::ModifyChannelPermissions,
            "ModifyBanning" => Permission::ModifyBanning,
            "PinMessage" => Permission::PinMessage,
            "AddRemoveChannels" => Permission::AddRemoveChannels,
            "Invite" => Permission::Invite,
            "JoinSpace" => Permission::JoinSpace,
            other => {
                let n = other
                    .strip_prefix("Custom(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|n| n.parse::<u16>().ok())
                    .ok_or_else(|| ParsePermissionError(other.to_string()))?;
                Permission::Custom(n)
            }
        })
    }
}

/// An unordered set of wallet addresses, serialized for cache-key purposes
/// into a comma-separated lowercase-hex string in the order the resolver
/// returned them (order is part of the key — see `LinkedWalletResolver`).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WalletSet {
    /// Insertion order matters for the cache key; membership tests use the
    /// companion `index` set.
    ordered: Vec<Address>,
    index: BTreeSet<Address>,
}

impl WalletSet {
    /// A wallet set containing only `principal`. `WalletSet` always contains
    /// the principal (§3 invariant).
    pub fn just_principal(principal: Principal) -> Self {
        let mut set = Self::default();
        set.push(principal);
        set
    }

    pub fn push(&mut self, wallet: Address) {
        if self.index.insert(wallet) {
            self.ordered.push(wallet);
        }
    }

    pub fn contains(&self, wallet: &Address) -> bool {
        self.index.contains(wallet)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.ordered.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.ordered
    }

    /// Canonical cache-key form: comma-separated lowercase hex, in
    /// resolver-return order. Stable for a given set *and* order; two
    /// requests that resolve wallets in a different order produce different
    /// keys by design (§3).
    pub fn cache_key_fragment(&self) -> String {
        self.ordered
            .iter()
            .map(|a| format!("{a:x}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<Address> for WalletSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut set = Self::default();
        for a in iter {
            set.push(a);
        }
        set
    }
}

/// The sentinel "everyone" address used in `UserList` entitlement records.
/// One-byte value per the on-chain convention: `0x0000...0001`.
pub fn everyone_sentinel() -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = 1;
    Address::from(bytes)
}

/// On-chain membership snapshot for a (space, wallet) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipStatus {
    pub is_member: bool,
    pub is_expired: bool,
    pub expiry: i64,
}

impl MembershipStatus {
    pub const fn not_a_member() -> Self {
        Self {
            is_member: false,
            is_expired: false,
            expiry: 0,
        }
    }

    /// A membership result counts as a usable "fresh" hit for §4.7 step 5.
    pub fn is_fresh_member(&self) -> bool {
        self.is_member && !self.is_expired
    }
}

/// A legacy (V1) rule tree. Opaque bytes from the core's point of view —
/// only `RuleEvaluator::convert_v1_to_v2` knows how to read it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleV1(pub Vec<u8>);

/// A rule tree operating over chain predicates (e.g. "holds >= N of token T
/// on chain C"). Opaque bytes from the core's point of view — only
/// `RuleEvaluator::evaluate` interprets them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleV2(pub Vec<u8>);

/// A tagged union of entitlement record kinds attached to a (scope,
/// permission) pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EntitlementRecord {
    RuleV1(RuleV1),
    RuleV2(RuleV2),
    /// Explicit allowlist. Contains `everyone_sentinel()` to mean "anyone".
    UserList(Vec<Address>),
    /// Forward-compatible: a variant the evaluator doesn't know about yet.
    /// Logged and skipped, never treated as a match (§4.6 step 3).
    Unknown { kind: String },
}

/// Kind-discriminated decision request. The kind partitions the code path
/// and the cache namespace (§3).
#[derive(Clone, Debug)]
pub enum DecisionRequest {
    SpaceEntitlement {
        space_id: B256,
        principal: Principal,
        permission: Permission,
    },
    ChannelEntitlement {
        space_id: B256,
        channel_id: B256,
        principal: Principal,
        permission: Permission,
    },
    IsSpaceMember {
        space_id: B256,
        principal: Principal,
    },
    IsWalletLinked {
        principal: Principal,
        wallet_address: Address,
    },
    SpaceEnabled {
        space_id: B256,
    },
    ChannelEnabled {
        space_id: B256,
        channel_id: B256,
    },
}

impl DecisionRequest {
    pub fn principal(&self) -> Principal {
        match self {
            DecisionRequest::SpaceEntitlement { principal, .. }
            | DecisionRequest::ChannelEntitlement { principal, .. }
            | DecisionRequest::IsSpaceMember { principal, .. }
            | DecisionRequest::IsWalletLinked { principal, .. } => *principal,
            DecisionRequest::SpaceEnabled { .. } | DecisionRequest::ChannelEnabled { .. } => {
                Address::ZERO
            }
        }
    }

    pub fn space_id(&self) -> B256 {
        match self {
            DecisionRequest::SpaceEntitlement { space_id, .. }
            | DecisionRequest::ChannelEntitlement { space_id, .. }
            | DecisionRequest::IsSpaceMember { space_id, .. }
            | DecisionRequest::SpaceEnabled { space_id, .. }
            | DecisionRequest::ChannelEnabled { space_id, .. } => *space_id,
            DecisionRequest::IsWalletLinked { .. } => B256::ZERO,
        }
    }

    pub fn permission(&self) -> Option<Permission> {
        match self {
            DecisionRequest::SpaceEntitlement { permission, .. }
            | DecisionRequest::ChannelEntitlement { permission, .. } => Some(*permission),
            _ => None,
        }
    }

    /// Stable string discriminant used as the first field of cache keys, so
    /// namespaces for different kinds never collide even with identical
    /// remaining fields.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            DecisionRequest::SpaceEntitlement { .. } => "space_entitlement",
            DecisionRequest::ChannelEntitlement { .. } => "channel_entitlement",
            DecisionRequest::IsSpaceMember { .. } => "is_space_member",
            DecisionRequest::IsWalletLinked { .. } => "is_wallet_linked",
            DecisionRequest::SpaceEnabled { .. } => "space_enabled",
            DecisionRequest::ChannelEnabled { .. } => "channel_enabled",
        }
    }
}

/// Reason code returned alongside a decision. Any non-failure reason is
/// informational to downstream callers (§9 design notes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    None,
    SpaceDisabled,
    ChannelDisabled,
    SpaceEntitlements,
    ChannelEntitlements,
    Membership,
    MembershipExpired,
    WalletNotLinked,
}

/// The outcome of `IsEntitled`: an allow/deny boolean plus the reason it was
/// reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: ReasonCode,
}

impl Decision {
    pub const fn new(allowed: bool, reason: ReasonCode) -> Self {
        Self { allowed, reason }
    }
}
