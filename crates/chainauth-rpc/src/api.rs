use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{RpcDecision, RpcDecisionRequest, RpcMembershipStatus, RpcVerifyReceiptRequest};

/// chainauth JSON-RPC 2.0 API definition (§6 "Public interface").
///
/// All method names are prefixed with "chainauth_" via `namespace =
/// "chainauth"`. This crate adapts the three public-interface operations the
/// specification names — it does not add gateway concerns like auth, rate
/// limiting, or multi-tenancy, which stay the job of whatever fronts this
/// server in production.
#[rpc(server, namespace = "chainauth")]
pub trait ChainAuthApi {
    /// `IsEntitled(req) → (allowed, reason)` (§6, §4.7).
    #[method(name = "isEntitled")]
    async fn is_entitled(&self, req: RpcDecisionRequest) -> RpcResult<RpcDecision>;

    /// `VerifyReceipt(receipt) → bool` (§6, §4.8).
    #[method(name = "verifyReceipt")]
    async fn verify_receipt(&self, receipt: RpcVerifyReceiptRequest) -> RpcResult<bool>;

    /// `GetMembershipStatus(spaceId, principal) → MembershipStatus` (§6, §4.3).
    #[method(name = "getMembershipStatus")]
    async fn get_membership_status(
        &self,
        space_id: String,
        principal: String,
    ) -> RpcResult<RpcMembershipStatus>;
}
