use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use chainauth_core::ChainAuthError;
use chainauth_crypto::{parse_address, parse_stream_hash};
use chainauth_pipeline::DecisionPipeline;
use chainauth_receipt::ReceiptVerifier;

use crate::api::ChainAuthApiServer;
use crate::types::{RpcDecision, RpcDecisionRequest, RpcMembershipStatus, RpcRequestError, RpcVerifyReceiptRequest};

// Custom JSON-RPC error codes mirroring the §7 error taxonomy. Standard
// codes (-32600..-32603) are reserved for transport/parse-level failures;
// these live in the implementation-defined range.
const CODE_INTERNAL: i32 = -32001;
const CODE_RESOURCE_EXHAUSTED: i32 = -32002;
const CODE_PERMISSION_DENIED: i32 = -32003;
const CODE_DOWNSTREAM_NETWORK_ERROR: i32 = -32004;
const CODE_CANNOT_CHECK_ENTITLEMENTS: i32 = -32005;
const CODE_INVALID_PARAMS: i32 = -32602;

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

/// Maps the §7 taxonomy onto distinct JSON-RPC error codes so callers can
/// distinguish retryable (`DownstreamNetworkError`, `CannotCheckEntitlements`)
/// from non-retryable (`Internal`, `ResourceExhausted`, `PermissionDenied`)
/// failures without parsing the message.
fn chain_auth_err(err: ChainAuthError) -> ErrorObject<'static> {
    let code = match &err {
        ChainAuthError::Internal { .. } => CODE_INTERNAL,
        ChainAuthError::ResourceExhausted { .. } => CODE_RESOURCE_EXHAUSTED,
        ChainAuthError::PermissionDenied { .. } => CODE_PERMISSION_DENIED,
        ChainAuthError::DownstreamNetworkError { .. } => CODE_DOWNSTREAM_NETWORK_ERROR,
        ChainAuthError::CannotCheckEntitlements(_) => CODE_CANNOT_CHECK_ENTITLEMENTS,
    };
    rpc_err(code, err.to_string())
}

fn request_err(err: RpcRequestError) -> ErrorObject<'static> {
    rpc_err(CODE_INVALID_PARAMS, err.to_string())
}

/// Shared state passed to the RPC server: the two collaborators the public
/// interface (§6) fronts. Both are already fully wired (caches, contract
/// clients, rule evaluator) by the time they reach here — this crate is
/// intentionally thin, adapting calls rather than constructing anything.
pub struct RpcServerState {
    pub pipeline: Arc<DecisionPipeline>,
    pub receipt_verifier: Arc<ReceiptVerifier>,
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr` with permissive CORS headers.
    /// Returns a handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any);

        let server = Server::builder()
            .set_http_middleware(tower::ServiceBuilder::new().layer(cors))
            .build(addr)
            .await?;

        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "chainauth RPC server started");
        Ok(handle)
    }
}

#[async_trait]
impl ChainAuthApiServer for RpcServer {
    async fn is_entitled(&self, req: RpcDecisionRequest) -> RpcResult<RpcDecision> {
        let core_req = req.into_core().map_err(request_err)?;
        let decision = self
            .state
            .pipeline
            .is_entitled(core_req)
            .await
            .map_err(chain_auth_err)?;
        Ok(decision.into())
    }

    async fn verify_receipt(&self, receipt: RpcVerifyReceiptRequest) -> RpcResult<bool> {
        let user_receipt = receipt.into_core().map_err(request_err)?;
        let verified = self
            .state
            .receipt_verifier
            .verify(&user_receipt)
            .await
            .map_err(chain_auth_err)?;
        Ok(verified)
    }

    async fn get_membership_status(
        &self,
        space_id: String,
        principal: String,
    ) -> RpcResult<RpcMembershipStatus> {
        let space_id = parse_stream_hash(&space_id)
            .map_err(|e| request_err(RpcRequestError::Hex(e)))?;
        let principal = parse_address(&principal)
            .map_err(|e| request_err(RpcRequestError::Hex(e)))?;
        let status = self
            .state
            .pipeline
            .get_membership_status(space_id, principal)
            .await
            .map_err(chain_auth_err)?;
        Ok(status.into())
    }
}
