//! `RuleEvaluator` (§6) — the abstract boundary to whatever rule-expression
//! language the deployed entitlement contracts actually use. The spec
//! explicitly keeps this out of scope ("the concrete rule-evaluation
//! library"); `EntitlementEvaluator` (C6) only needs `evaluate` and
//! `convert_v1_to_v2`.

use alloy_primitives::Address;
use async_trait::async_trait;
use chainauth_core::{ChainAuthError, RuleV1, RuleV2};

#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    /// Evaluate a `RuleV2` against a wallet set. Errors fail the whole
    /// enclosing call (§4.6 step 3).
    async fn evaluate(&self, wallets: &[Address], rule: &RuleV2) -> Result<bool, ChainAuthError>;

    /// Upgrade a legacy `RuleV1` payload to `RuleV2` before evaluation
    /// (§4.6 step 3).
    async fn convert_v1_to_v2(&self, rule: &RuleV1) -> Result<RuleV2, ChainAuthError>;
}
