use thiserror::Error;

/// Error taxonomy for the authorization oracle (§7).
///
/// `Internal` and `ResourceExhausted` and `PermissionDenied` are
/// non-retryable; `DownstreamNetworkError` and `CannotCheckEntitlements` are
/// retryable at the caller. Negative authorization results (`allowed:
/// false`) are never represented as errors — only genuine failures to reach
/// a decision are.
#[derive(Debug, Clone, Error)]
pub enum ChainAuthError {
    /// A logic violation: unknown request kind reached a path that assumes
    /// a different kind, or an invariant the pipeline itself should have
    /// prevented. Never expected to surface from a well-formed request.
    #[error("internal error evaluating {operation}: {message}")]
    Internal { operation: String, message: String },

    /// More linked wallets than `linked_wallets_limit` allows (§4.7 step 4).
    #[error("resource exhausted: {wallet_count} linked wallets exceeds limit of {limit}")]
    ResourceExhausted { wallet_count: usize, limit: usize },

    /// Receipt verification mismatch (§4.8). Carries the field that failed
    /// to match and both sides of the comparison for diagnostics.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// A contract-call collaborator failed transiently (RPC timeout,
    /// connection refused, node error). Retryable by the caller; retry with
    /// backoff is the collaborator's responsibility, not this crate's
    /// (§1 Non-goals). The underlying error is flattened to its message so
    /// this enum stays `Clone` — needed to replay a single-flight result to
    /// every waiter in `chainauth-cache`.
    #[error("downstream network error calling {operation} on chain {chain_id}: {source}")]
    DownstreamNetworkError {
        operation: String,
        chain_id: String,
        source: String,
    },

    /// All membership probes in a fan-out (§4.7 step 5) failed and none
    /// returned a result, so the decision cannot be reached at all.
    #[error("cannot check entitlements: {0}")]
    CannotCheckEntitlements(String),
}

impl ChainAuthError {
    pub fn internal(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn downstream(
        operation: impl Into<String>,
        chain_id: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DownstreamNetworkError {
            operation: operation.into(),
            chain_id: chain_id.into(),
            source: source.to_string(),
        }
    }

    /// Whether a caller should consider retrying this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChainAuthError::DownstreamNetworkError { .. }
                | ChainAuthError::CannotCheckEntitlements(_)
        )
    }
}
