use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SwitchSyncError {
    #[error("Failed to fetch feature switches. {0}")]
    TransportError(String),
    #[error("The feature switch payload was empty")]
    EmptyPayload,
}

/// A feature switch as reported by the remote feature-flag service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSwitch {
    pub name: String,
    pub value: bool,
    pub default_value: bool,
    pub rollout_percentage: u8,
}

/// Remote source of truth for the feature-switch set.
#[allow(async_fn_in_trait)]
pub trait FeatureSwitchSyncService {
    async fn fetch_switches(&self) -> Result<Vec<RemoteSwitch>, SwitchSyncError>;
}

#[derive(Debug, Clone, Error)]
pub enum ConfigStoreError {
    #[error("Config store error. {0}")]
    BackendError(String),
}

/// Locally persisted configuration for the synchronized switch set.
///
/// The set round-trips as serialized JSON (`name → {value, defaultValue, rolloutPercentage}`)
/// so the store does not need to understand the payload.
pub trait SwitchConfigStore {
    fn load_switches(&self) -> Result<Option<String>, ConfigStoreError>;

    fn save_switches(&self, serialized: &str) -> Result<(), ConfigStoreError>;

    /// Signal downstream caches that the persisted set changed.
    fn invalidate_cache(&self);
}

/// Sticky client-side rollout identity, typically a cookie. The expiry must outlive a typical
/// session so percentage rollouts stay stable for a returning browser.
pub trait IdentityStore {
    fn get_identity(&self) -> Option<String>;

    fn set_identity(&self, identity: &str);
}
