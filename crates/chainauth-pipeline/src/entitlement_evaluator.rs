//! `EntitlementEvaluator` (C6, §4.6).
//!
//! Owner and ban checks come first because they are cheap short-circuits
//! that override entitlement records; ownership overrides bans (owners
//! cannot self-ban for access purposes).

use std::sync::Arc;

use alloy_primitives::B256;
use chainauth_cache::CachedEntitlements;
use chainauth_chain::{RuleEvaluator, SpaceContract};
use chainauth_core::{everyone_sentinel, ChainAuthError, EntitlementRecord, WalletSet};

pub struct EntitlementEvaluator {
    space_contract: Arc<dyn SpaceContract>,
    rule_evaluator: Arc<dyn RuleEvaluator>,
}

impl EntitlementEvaluator {
    pub fn new(space_contract: Arc<dyn SpaceContract>, rule_evaluator: Arc<dyn RuleEvaluator>) -> Self {
        Self {
            space_contract,
            rule_evaluator,
        }
    }

    /// Returns whether `wallets` satisfy `entitlements` for `space_id`.
    pub async fn evaluate(
        &self,
        space_id: B256,
        wallets: &WalletSet,
        entitlements: &CachedEntitlements,
    ) -> Result<bool, ChainAuthError> {
        if wallets.contains(&entitlements.owner) {
            return Ok(true);
        }

        if self.space_contract.is_banned(space_id, wallets.as_slice()).await? {
            return Ok(false);
        }

        for record in &entitlements.records {
            if self.record_matches(wallets, record).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn record_matches(&self, wallets: &WalletSet, record: &EntitlementRecord) -> Result<bool, ChainAuthError> {
        match record {
            EntitlementRecord::RuleV1(v1) => {
                let v2 = self.rule_evaluator.convert_v1_to_v2(v1).await?;
                self.rule_evaluator.evaluate(wallets.as_slice(), &v2).await
            }
            EntitlementRecord::RuleV2(v2) => self.rule_evaluator.evaluate(wallets.as_slice(), v2).await,
            EntitlementRecord::UserList(list) => {
                let everyone = everyone_sentinel();
                Ok(list.contains(&everyone) || wallets.as_slice().iter().any(|w| list.contains(w)))
            }
            EntitlementRecord::Unknown { kind } => {
                tracing::warn!(%kind, "skipping unknown entitlement record variant");
                Ok(false)
            }
        }
    }
}
