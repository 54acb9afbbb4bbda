use std::collections::HashMap;

use log::*;

use crate::feature_switch::{FeatureSwitch, FeatureSwitchError, SharedSwitchStore};
use crate::traits::{FeatureSwitchSyncService, SwitchConfigStore, SwitchSyncError};

/// Pulls the switch set from the remote feature-flag service and publishes it.
///
/// Called explicitly by post-install/upgrade hooks and by the provider's update webhook; there
/// is no ambient "needs update" flag. A failed sync is soft: the last known good set stays in
/// place, both in the config store and in the in-process cache.
pub struct SwitchUpdater<S, C> {
    sync: S,
    config: C,
    cache: SharedSwitchStore,
}

impl<S, C> SwitchUpdater<S, C>
where
    S: FeatureSwitchSyncService,
    C: SwitchConfigStore,
{
    pub fn new(sync: S, config: C) -> Self {
        Self { sync, config, cache: SharedSwitchStore::default() }
    }

    /// The in-process copy of the last successfully synced set, shared with long-lived readers.
    pub fn cache(&self) -> SharedSwitchStore {
        self.cache.clone()
    }

    pub async fn update_switches(&self) -> Result<(), FeatureSwitchError> {
        let remote = match self.sync.fetch_switches().await {
            Ok(switches) => switches,
            Err(e) => {
                warn!("🎚️ Feature switch sync failed; keeping the last known good set. {e}");
                return Err(e.into());
            },
        };
        if remote.is_empty() {
            warn!("🎚️ Feature switch sync returned no switches; keeping the last known good set.");
            return Err(SwitchSyncError::EmptyPayload.into());
        }

        let switches: HashMap<String, FeatureSwitch> = remote
            .into_iter()
            .map(|s| {
                (s.name, FeatureSwitch {
                    value: s.value,
                    default_value: s.default_value,
                    rollout_percentage: s.rollout_percentage,
                })
            })
            .collect();

        let serialized =
            serde_json::to_string(&switches).map_err(|e| FeatureSwitchError::ConfigError(e.to_string()))?;
        self.config.save_switches(&serialized)?;
        self.config.invalidate_cache();
        self.cache.replace(switches);
        info!("🎚️ Feature switches updated");
        Ok(())
    }
}
