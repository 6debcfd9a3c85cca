//! chainauth-rpc
//!
//! JSON-RPC 2.0 surface for the authorization oracle's public interface
//! (§6): `isEntitled`, `verifyReceipt`, `getMembershipStatus`. The "concrete
//! ... surrounding request-handling servers" are out of scope per §1 — this
//! crate adapts `DecisionPipeline`/`ReceiptVerifier` onto JSON-RPC, nothing
//! more (no auth, rate limiting, or multi-tenancy).
//!
//! Namespace: "chainauth"
//! Methods:
//!   chainauth_isEntitled           — authorization decision for a request
//!   chainauth_verifyReceipt        — byte-exact receipt verification
//!   chainauth_getMembershipStatus  — raw membership probe for (space, wallet)

pub mod api;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerState};
pub use types::{
    RpcDecision, RpcDecisionRequest, RpcLog, RpcMembershipStatus, RpcRequestError,
    RpcVerifyReceiptRequest,
};
