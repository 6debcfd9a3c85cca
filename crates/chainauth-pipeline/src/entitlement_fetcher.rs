//! `EntitlementFetcher` (C5, §4.5).

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use chainauth_cache::{Cache, CacheOutcome, CachedEntitlements};
use chainauth_chain::SpaceContract;
use chainauth_core::{ChainAuthError, EntitlementRecord, Permission};

pub struct EntitlementFetcher {
    space_contract: Arc<dyn SpaceContract>,
    cache: Arc<Cache<CachedEntitlements>>,
}

impl EntitlementFetcher {
    pub fn new(space_contract: Arc<dyn SpaceContract>, cache: Arc<Cache<CachedEntitlements>>) -> Self {
        Self {
            space_contract,
            cache,
        }
    }

    pub async fn fetch_space(&self, space_id: B256, permission: Permission) -> CachedEntitlements {
        let key = format!("entitlements:space:{space_id:x}:{permission}");
        let contract = self.space_contract.clone();
        self.fetch(key, move || async move {
            contract.get_space_entitlements_for_permission(space_id, permission).await
        })
        .await
    }

    pub async fn fetch_channel(&self, space_id: B256, channel_id: B256, permission: Permission) -> CachedEntitlements {
        let key = format!("entitlements:channel:{space_id:x}:{channel_id:x}:{permission}");
        let contract = self.space_contract.clone();
        self.fetch(key, move || async move {
            contract
                .get_channel_entitlements_for_permission(space_id, channel_id, permission)
                .await
        })
        .await
    }

    /// A fetch never fails the caller: on RPC failure the result degrades to
    /// an empty, non-cacheable entitlement set so the enclosing
    /// `EntitlementEvaluator` sees "no matching record" rather than an error
    /// that would abort the whole decision (§4.5).
    async fn fetch<F, Fut>(&self, key: String, call: F) -> CachedEntitlements
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<(Address, Vec<EntitlementRecord>), ChainAuthError>> + Send + 'static,
    {
        let result = self
            .cache
            .execute_using_cache(key, move || async move {
                match call().await {
                    Ok((owner, records)) => Ok(CacheOutcome::positive(CachedEntitlements { owner, records })),
                    Err(err) => {
                        tracing::warn!(error = %err, "entitlement fetch failed; returning empty non-cacheable result");
                        Ok(CacheOutcome::negative(CachedEntitlements {
                            owner: Address::ZERO,
                            records: Vec::new(),
                        }))
                    }
                }
            })
            .await;

        // The inner closure above never returns `Err`, so this always
        // succeeds — but fall back to a safe default rather than unwrap.
        match result {
            Ok((entitlements, _hit)) => entitlements,
            Err(_) => CachedEntitlements {
                owner: Address::ZERO,
                records: Vec::new(),
            },
        }
    }
}
