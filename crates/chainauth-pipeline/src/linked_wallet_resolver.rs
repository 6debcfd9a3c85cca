//! `LinkedWalletResolver` (C2, §4.2).

use std::sync::Arc;

use alloy_primitives::Address;
use chainauth_cache::{Cache, CacheOutcome};
use chainauth_chain::WalletLinkContract;
use chainauth_core::{ChainAuthError, DecisionRequest, Permission, WalletSet};

pub struct LinkedWalletResolver {
    wallet_link_contract: Option<Arc<dyn WalletLinkContract>>,
    cache: Arc<Cache<WalletSet>>,
}

impl LinkedWalletResolver {
    pub fn new(wallet_link_contract: Option<Arc<dyn WalletLinkContract>>, cache: Arc<Cache<WalletSet>>) -> Self {
        if wallet_link_contract.is_none() {
            tracing::warn!("wallet-link contract unavailable at construction; resolver degrades to principal-only wallet sets");
        }
        Self {
            wallet_link_contract,
            cache,
        }
    }

    /// Resolve `principal`'s linked wallets for `req`. Busts the cache first
    /// when `req` is freshness-sensitive (§4.2 cache policy) so the current
    /// call always recomputes.
    pub async fn resolve(&self, principal: Address, req: &DecisionRequest) -> Result<WalletSet, ChainAuthError> {
        let key = cache_key(principal);

        if is_freshness_sensitive(req) {
            self.cache.bust(&key);
        }

        let contract = self.wallet_link_contract.clone();
        let (wallets, _hit) = self
            .cache
            .execute_using_cache(key, move || compute(principal, contract))
            .await?;
        Ok(wallets)
    }
}

fn cache_key(principal: Address) -> String {
    format!("linked_wallets:{principal:x}")
}

/// `Read` permission, `IsSpaceMember`, or `IsWalletLinked` requests need the
/// current on-chain linkage, not a stale cached one (§4.2).
fn is_freshness_sensitive(req: &DecisionRequest) -> bool {
    matches!(req.permission(), Some(Permission::Read))
        || matches!(
            req,
            DecisionRequest::IsSpaceMember { .. } | DecisionRequest::IsWalletLinked { .. }
        )
}

async fn compute(
    principal: Address,
    contract: Option<Arc<dyn WalletLinkContract>>,
) -> Result<CacheOutcome<WalletSet>, ChainAuthError> {
    let Some(contract) = contract else {
        return Ok(CacheOutcome::positive(WalletSet::just_principal(principal)));
    };

    match contract.get_linked_wallets(principal).await {
        Ok(linked) => {
            let mut set = WalletSet::just_principal(principal);
            for wallet in linked {
                set.push(wallet);
            }
            Ok(CacheOutcome::positive(set))
        }
        Err(err) => {
            tracing::warn!(error = %err, %principal, "wallet-link contract call failed; degrading to principal-only wallet set");
            Ok(CacheOutcome::negative(WalletSet::just_principal(principal)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainauth_chain::mock::MockWalletLinkContract;
    use chainauth_core::{CacheTtls, DecisionRequest};

    fn cache() -> Arc<Cache<WalletSet>> {
        Arc::new(Cache::new("linkedWalletCache", CacheTtls::new(60, 1)))
    }

    #[tokio::test]
    async fn always_contains_principal_with_no_contract() {
        let resolver = LinkedWalletResolver::new(None, cache());
        let principal = Address::repeat_byte(0x01);
        let req = DecisionRequest::IsSpaceMember {
            space_id: Default::default(),
            principal,
        };
        let set = resolver.resolve(principal, &req).await.unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&principal));
    }

    #[tokio::test]
    async fn merges_linked_wallets_from_contract() {
        let principal = Address::repeat_byte(0x01);
        let linked = Address::repeat_byte(0x02);
        let contract = Arc::new(MockWalletLinkContract::new());
        contract.set_linked_wallets(principal, vec![linked]);

        let resolver = LinkedWalletResolver::new(Some(contract), cache());
        let req = DecisionRequest::SpaceEnabled {
            space_id: Default::default(),
        };
        let set = resolver.resolve(principal, &req).await.unwrap();
        assert!(set.contains(&principal));
        assert!(set.contains(&linked));
    }

    #[tokio::test]
    async fn read_permission_requests_bypass_stale_cache() {
        let principal = Address::repeat_byte(0x03);
        let contract = Arc::new(MockWalletLinkContract::new());
        let resolver = LinkedWalletResolver::new(Some(contract.clone()), cache());

        let read_req = DecisionRequest::SpaceEntitlement {
            space_id: Default::default(),
            principal,
            permission: Permission::Read,
        };

        let first = resolver.resolve(principal, &read_req).await.unwrap();
        assert_eq!(first.len(), 1);

        contract.set_linked_wallets(principal, vec![Address::repeat_byte(0x04)]);
        let second = resolver.resolve(principal, &read_req).await.unwrap();
        assert_eq!(second.len(), 2, "Read requests must always see fresh linkage");
    }
}
