pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{CacheTtls, ChainAuthConfig};
pub use constants::*;
pub use error::ChainAuthError;
pub use types::{
    everyone_sentinel, Decision, DecisionRequest, EntitlementRecord, MembershipStatus,
    ParsePermissionError, Permission, Principal, ReasonCode, RuleV1, RuleV2, StreamId, WalletSet,
};
