//! `DecisionPipeline` (C7, §4.7) — the top-level `IsEntitled` orchestrator.
//!
//! Ordering within a single decision: enabled check happens-before wallet
//! resolution happens-before membership probing happens-before entitlement
//! fetch+evaluate (§5). Among the parallel membership probes there is no
//! ordering — the first fresh positive wins the race and cancels the rest.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use chainauth_cache::{CacheOutcome, CachedDecision};
use chainauth_chain::{RuleEvaluator, SpaceContract, WalletLinkContract};
use chainauth_core::{
    ChainAuthConfig, ChainAuthError, Decision, DecisionRequest, MembershipStatus, ReasonCode, WalletSet,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::enable_checker::EnableChecker;
use crate::entitlement_evaluator::EntitlementEvaluator;
use crate::entitlement_fetcher::EntitlementFetcher;
use crate::linked_wallet_resolver::LinkedWalletResolver;
use crate::membership_probe::MembershipProbe;

/// The collaborators the pipeline needs constructed, grouped for
/// convenience at call sites (§6 "collaborator interfaces consumed").
pub struct PipelineDeps {
    pub space_contract: Arc<dyn SpaceContract>,
    pub wallet_link_contract: Option<Arc<dyn WalletLinkContract>>,
    pub rule_evaluator: Arc<dyn RuleEvaluator>,
}

pub struct DecisionPipeline {
    linked_wallet_resolver: LinkedWalletResolver,
    enable_checker: EnableChecker,
    membership_probe: Arc<MembershipProbe>,
    entitlement_fetcher: Arc<EntitlementFetcher>,
    entitlement_evaluator: Arc<EntitlementEvaluator>,
    outer_cache: Arc<chainauth_cache::Cache<CachedDecision>>,
    linked_wallets_limit: usize,
    contract_calls_timeout: Duration,
}

impl DecisionPipeline {
    pub fn new(deps: PipelineDeps, caches: &chainauth_cache::Caches, config: &ChainAuthConfig) -> Self {
        Self {
            linked_wallet_resolver: LinkedWalletResolver::new(deps.wallet_link_contract, caches.linked_wallet.clone()),
            enable_checker: EnableChecker::new(deps.space_contract.clone(), caches.enabled.clone()),
            membership_probe: Arc::new(MembershipProbe::new(deps.space_contract.clone(), caches.membership.clone())),
            entitlement_fetcher: Arc::new(EntitlementFetcher::new(
                deps.space_contract.clone(),
                caches.entitlement_manager.clone(),
            )),
            entitlement_evaluator: Arc::new(EntitlementEvaluator::new(deps.space_contract, deps.rule_evaluator)),
            outer_cache: caches.entitlement.clone(),
            linked_wallets_limit: config.linked_wallets_limit,
            contract_calls_timeout: Duration::from_millis(config.contract_calls_timeout_ms),
        }
    }

    /// `IsEntitled(req) → (allowed, reason)` (§6), bounded by
    /// `contractCallsTimeoutMs` (§4.7).
    pub async fn is_entitled(&self, req: DecisionRequest) -> Result<Decision, ChainAuthError> {
        match tokio::time::timeout(self.contract_calls_timeout, self.decide(req)).await {
            Ok(result) => result,
            Err(_) => Err(ChainAuthError::CannotCheckEntitlements(
                "contract calls timed out".to_string(),
            )),
        }
    }

    async fn decide(&self, req: DecisionRequest) -> Result<Decision, ChainAuthError> {
        // Step 1: enabled check.
        if let Some(reason) = self.check_enabled(&req).await? {
            return Ok(Decision::new(false, reason));
        }

        // SpaceEnabled/ChannelEnabled carry no principal or permission —
        // once the stream is confirmed enabled there is nothing further to
        // evaluate against.
        if matches!(req, DecisionRequest::SpaceEnabled { .. } | DecisionRequest::ChannelEnabled { .. }) {
            return Ok(Decision::new(true, ReasonCode::None));
        }

        // Step 2: linked-wallet resolution.
        let principal = req.principal();
        let wallets = self.linked_wallet_resolver.resolve(principal, &req).await?;

        // Step 3: IsWalletLinked fast path.
        if let DecisionRequest::IsWalletLinked { wallet_address, .. } = &req {
            let linked = wallets.contains(wallet_address);
            let reason = if linked { ReasonCode::None } else { ReasonCode::WalletNotLinked };
            return Ok(Decision::new(linked, reason));
        }

        // Step 4: fan-out guard.
        if wallets.len() > self.linked_wallets_limit {
            return Err(ChainAuthError::ResourceExhausted {
                wallet_count: wallets.len(),
                limit: self.linked_wallets_limit,
            });
        }

        // Steps 5-6 are the expensive part of the decision and are wrapped
        // in the outer entitlement cache, keyed on the resolved wallet set
        // (§4.1 key derivation for entitlement kinds). The per-step caches
        // (C2-C5) remain active underneath for cross-request reuse even on
        // an outer miss.
        let key = outer_cache_key(&req, &wallets);
        let space_id = req.space_id();
        let membership_probe = self.membership_probe.clone();
        let entitlement_fetcher = self.entitlement_fetcher.clone();
        let entitlement_evaluator = self.entitlement_evaluator.clone();
        let req_for_compute = req.clone();
        let wallets_for_compute = wallets.clone();

        let (cached, _hit) = self
            .outer_cache
            .execute_using_cache(key, move || {
                compute_decision(
                    req_for_compute,
                    space_id,
                    wallets_for_compute,
                    membership_probe,
                    entitlement_fetcher,
                    entitlement_evaluator,
                )
            })
            .await?;

        Ok(Decision::new(cached.allowed, cached.reason))
    }

    /// `GetMembershipStatus(spaceId, principal) → MembershipStatus` (§6
    /// public interface). A direct, cache-backed probe of C3 — it does not
    /// go through the enabled check, wallet resolution, or the outer
    /// decision cache, since the caller is asking about a single wallet's
    /// raw on-chain status rather than requesting an authorization
    /// decision.
    pub async fn get_membership_status(
        &self,
        space_id: B256,
        principal: alloy_primitives::Address,
    ) -> Result<MembershipStatus, ChainAuthError> {
        self.membership_probe.probe(space_id, principal).await
    }

    async fn check_enabled(&self, req: &DecisionRequest) -> Result<Option<ReasonCode>, ChainAuthError> {
        match req {
            DecisionRequest::SpaceEntitlement { space_id, .. }
            | DecisionRequest::IsSpaceMember { space_id, .. }
            | DecisionRequest::SpaceEnabled { space_id } => {
                if !self.enable_checker.is_space_enabled(*space_id).await? {
                    return Ok(Some(ReasonCode::SpaceDisabled));
                }
                Ok(None)
            }
            DecisionRequest::ChannelEntitlement { space_id, channel_id, .. }
            | DecisionRequest::ChannelEnabled { space_id, channel_id } => {
                if !self.enable_checker.is_channel_enabled(*space_id, *channel_id).await? {
                    return Ok(Some(ReasonCode::ChannelDisabled));
                }
                Ok(None)
            }
            DecisionRequest::IsWalletLinked { .. } => Ok(None),
        }
    }
}

enum MembershipOutcome {
    NotMember,
    Expired,
    Fresh,
}

/// The portion of the decision wrapped in the outer cache: membership
/// fan-out (step 5) plus entitlement evaluation (step 6). Free-standing
/// (rather than a `DecisionPipeline` method) so it satisfies the `'static`
/// bound the cache's single-flight compute closure requires.
async fn compute_decision(
    req: DecisionRequest,
    space_id: B256,
    wallets: WalletSet,
    membership_probe: Arc<MembershipProbe>,
    entitlement_fetcher: Arc<EntitlementFetcher>,
    entitlement_evaluator: Arc<EntitlementEvaluator>,
) -> Result<CacheOutcome<CachedDecision>, ChainAuthError> {
    match fan_out_membership(space_id, &wallets, membership_probe).await? {
        MembershipOutcome::NotMember => {
            return Ok(CacheOutcome::positive(CachedDecision {
                allowed: false,
                reason: ReasonCode::Membership,
            }))
        }
        MembershipOutcome::Expired => {
            return Ok(CacheOutcome::positive(CachedDecision {
                allowed: false,
                reason: ReasonCode::MembershipExpired,
            }))
        }
        MembershipOutcome::Fresh => {}
    }

    // Step 6: entitlement evaluation.
    let (allowed, reason) = match &req {
        DecisionRequest::IsSpaceMember { .. } => (true, ReasonCode::None),
        DecisionRequest::SpaceEntitlement { permission, .. } => {
            let entitlements = entitlement_fetcher.fetch_space(space_id, *permission).await;
            let allowed = entitlement_evaluator.evaluate(space_id, &wallets, &entitlements).await?;
            (allowed, if allowed { ReasonCode::None } else { ReasonCode::SpaceEntitlements })
        }
        DecisionRequest::ChannelEntitlement { channel_id, permission, .. } => {
            let entitlements = entitlement_fetcher.fetch_channel(space_id, *channel_id, *permission).await;
            let allowed = entitlement_evaluator.evaluate(space_id, &wallets, &entitlements).await?;
            (allowed, if allowed { ReasonCode::None } else { ReasonCode::ChannelEntitlements })
        }
        DecisionRequest::IsWalletLinked { .. } | DecisionRequest::SpaceEnabled { .. } | DecisionRequest::ChannelEnabled { .. } => {
            unreachable!("fast-pathed in DecisionPipeline::decide before reaching the outer cache")
        }
    };

    Ok(CacheOutcome::positive(CachedDecision { allowed, reason }))
}

/// Parallel membership probe (§4.7 step 5). Spawns one probe per wallet
/// against a shared cancellable sub-context; the first fresh positive
/// cancels the rest. Errors are only consulted when no member was found at
/// all — cancellation errors from losing probes must never surface.
async fn fan_out_membership(
    space_id: B256,
    wallets: &WalletSet,
    membership_probe: Arc<MembershipProbe>,
) -> Result<MembershipOutcome, ChainAuthError> {
    let total = wallets.len().max(1);
    let cancel = CancellationToken::new();
    let (status_tx, mut status_rx) = mpsc::channel::<MembershipStatus>(total);
    let (err_tx, mut err_rx) = mpsc::channel::<ChainAuthError>(total);

    for wallet in wallets.iter().copied() {
        let probe = membership_probe.clone();
        let status_tx = status_tx.clone();
        let err_tx = err_tx.clone();
        let cancel_child = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_child.cancelled() => {}
                result = probe.probe(space_id, wallet) => {
                    match result {
                        Ok(status) => {
                            let _ = status_tx.send(status).await;
                        }
                        Err(err) => {
                            let _ = err_tx.send(err).await;
                        }
                    }
                }
            }
        });
    }
    drop(status_tx);
    drop(err_tx);

    let mut saw_expired_member = false;
    let mut errors: Vec<ChainAuthError> = Vec::new();
    let mut remaining = wallets.len();

    while remaining > 0 {
        tokio::select! {
            maybe_status = status_rx.recv() => {
                let Some(status) = maybe_status else { break };
                remaining -= 1;
                if status.is_fresh_member() {
                    cancel.cancel();
                    return Ok(MembershipOutcome::Fresh);
                }
                if status.is_member {
                    saw_expired_member = true;
                }
            }
            maybe_err = err_rx.recv() => {
                let Some(err) = maybe_err else { break };
                remaining -= 1;
                errors.push(err);
            }
        }
    }

    if saw_expired_member {
        return Ok(MembershipOutcome::Expired);
    }

    if !errors.is_empty() {
        let joined = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        return Err(ChainAuthError::CannotCheckEntitlements(joined));
    }

    Ok(MembershipOutcome::NotMember)
}

fn outer_cache_key(req: &DecisionRequest, wallets: &WalletSet) -> String {
    let fragment = wallets.cache_key_fragment();
    match req {
        DecisionRequest::SpaceEntitlement { space_id, permission, .. } => {
            format!("decision:space_entitlement:{space_id:x}:{permission}:{fragment}")
        }
        DecisionRequest::ChannelEntitlement { space_id, channel_id, permission, .. } => {
            format!("decision:channel_entitlement:{space_id:x}:{channel_id:x}:{permission}:{fragment}")
        }
        DecisionRequest::IsSpaceMember { space_id, .. } => {
            format!("decision:is_space_member:{space_id:x}:{fragment}")
        }
        DecisionRequest::IsWalletLinked { principal, wallet_address } => {
            format!("decision:is_wallet_linked:{principal:x}:{wallet_address:x}")
        }
        DecisionRequest::SpaceEnabled { space_id } => format!("decision:space_enabled:{space_id:x}"),
        DecisionRequest::ChannelEnabled { space_id, channel_id } => {
            format!("decision:channel_enabled:{space_id:x}:{channel_id:x}")
        }
    }
}
