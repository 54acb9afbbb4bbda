//! # Gradual feature rollout.
//!
//! A feature switch is a named `{value, defaultValue, rolloutPercentage}` record. A built-in
//! default set exists independent of any sync; [`SwitchUpdater`] refreshes the synchronized
//! overrides from the remote service, and [`FeatureSwitchEvaluator`] answers "is switch X on
//! for this browser" using the deterministic [`rollout_bucket`].

mod bucketer;
mod evaluator;
mod store;
mod updater;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bucketer::{generate_identity, rollout_bucket};
pub use evaluator::FeatureSwitchEvaluator;
pub use store::SharedSwitchStore;
pub use updater::SwitchUpdater;

use crate::traits::{ConfigStoreError, SwitchSyncError};

/// Gates the whole hosted-checkout path.
pub const BOLT_ENABLED_SWITCH: &str = "M1_BOLT_ENABLED";

/// Cookie under which the sticky rollout identity is persisted client-side.
pub const ROLLOUT_IDENTITY_COOKIE: &str = "BoltFeatureSwitchId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSwitch {
    pub value: bool,
    pub default_value: bool,
    pub rollout_percentage: u8,
}

/// The built-in defaults, available before any sync has ever run. Every switch the storefront
/// consults must have an entry here; evaluating a name without one is a programmer error.
pub fn default_switches() -> HashMap<String, FeatureSwitch> {
    let mut switches = HashMap::new();
    switches.insert(
        BOLT_ENABLED_SWITCH.to_string(),
        FeatureSwitch { value: true, default_value: false, rollout_percentage: 100 },
    );
    switches
}

#[derive(Debug, Clone, Error)]
pub enum FeatureSwitchError {
    #[error("Unknown feature switch: {0}")]
    UnknownSwitch(String),
    #[error("Could not read the persisted feature switch set. {0}")]
    ConfigError(String),
    #[error("Feature switch sync failed. {0}")]
    SyncFailed(String),
}

impl From<ConfigStoreError> for FeatureSwitchError {
    fn from(e: ConfigStoreError) -> Self {
        FeatureSwitchError::ConfigError(e.to_string())
    }
}

impl From<SwitchSyncError> for FeatureSwitchError {
    fn from(e: SwitchSyncError) -> Self {
        FeatureSwitchError::SyncFailed(e.to_string())
    }
}
