//! `MembershipProbe` (C3, §4.3).

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use chainauth_cache::{Cache, CacheOutcome};
use chainauth_chain::SpaceContract;
use chainauth_core::{ChainAuthError, MembershipStatus};

pub struct MembershipProbe {
    space_contract: Arc<dyn SpaceContract>,
    cache: Arc<Cache<MembershipStatus>>,
}

impl MembershipProbe {
    pub fn new(space_contract: Arc<dyn SpaceContract>, cache: Arc<Cache<MembershipStatus>>) -> Self {
        Self {
            space_contract,
            cache,
        }
    }

    pub async fn probe(&self, space_id: B256, wallet: Address) -> Result<MembershipStatus, ChainAuthError> {
        let key = format!("membership:{space_id:x}:{wallet:x}");
        let contract = self.space_contract.clone();

        let (status, _hit) = self
            .cache
            .execute_using_cache(key, move || async move {
                contract
                    .get_membership_status(space_id, wallet)
                    .await
                    .map(CacheOutcome::positive)
            })
            .await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainauth_chain::mock::MockSpaceContract;
    use chainauth_core::CacheTtls;

    #[tokio::test]
    async fn caches_status_per_space_and_wallet() {
        let space_id = B256::repeat_byte(0x01);
        let wallet = Address::repeat_byte(0x02);
        let contract = Arc::new(MockSpaceContract::new());
        contract.set_membership(
            space_id,
            wallet,
            MembershipStatus {
                is_member: true,
                is_expired: false,
                expiry: 100,
            },
        );

        let probe = MembershipProbe::new(contract, Arc::new(Cache::new("membershipCache", CacheTtls::new(60, 1))));
        let status = probe.probe(space_id, wallet).await.unwrap();
        assert!(status.is_fresh_member());
    }

    #[tokio::test]
    async fn defaults_to_not_a_member_when_unset() {
        let contract = Arc::new(MockSpaceContract::new());
        let probe = MembershipProbe::new(contract, Arc::new(Cache::new("membershipCache", CacheTtls::new(60, 1))));
        let status = probe
            .probe(B256::repeat_byte(0x09), Address::repeat_byte(0x09))
            .await
            .unwrap();
        assert!(!status.is_member);
    }
}
