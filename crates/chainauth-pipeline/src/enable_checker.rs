//! `EnableChecker` (C4, §4.4). The underlying contract exposes the inverse
//! (`IsSpaceDisabled`/`IsChannelDisabled`); this checker normalizes to the
//! more ergonomic "is enabled" sense the pipeline works in.

use std::sync::Arc;

use alloy_primitives::B256;
use chainauth_cache::{Cache, CacheOutcome};
use chainauth_chain::SpaceContract;
use chainauth_core::ChainAuthError;

pub struct EnableChecker {
    space_contract: Arc<dyn SpaceContract>,
    cache: Arc<Cache<bool>>,
}

impl EnableChecker {
    pub fn new(space_contract: Arc<dyn SpaceContract>, cache: Arc<Cache<bool>>) -> Self {
        Self {
            space_contract,
            cache,
        }
    }

    pub async fn is_space_enabled(&self, space_id: B256) -> Result<bool, ChainAuthError> {
        let key = format!("space_enabled:{space_id:x}");
        let contract = self.space_contract.clone();
        let (enabled, _hit) = self
            .cache
            .execute_using_cache(key, move || async move {
                contract
                    .is_space_disabled(space_id)
                    .await
                    .map(|disabled| CacheOutcome::positive(!disabled))
            })
            .await?;
        Ok(enabled)
    }

    pub async fn is_channel_enabled(&self, space_id: B256, channel_id: B256) -> Result<bool, ChainAuthError> {
        let key = format!("channel_enabled:{space_id:x}:{channel_id:x}");
        let contract = self.space_contract.clone();
        let (enabled, _hit) = self
            .cache
            .execute_using_cache(key, move || async move {
                contract
                    .is_channel_disabled(space_id, channel_id)
                    .await
                    .map(|disabled| CacheOutcome::positive(!disabled))
            })
            .await?;
        Ok(enabled)
    }
}
