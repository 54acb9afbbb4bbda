use std::collections::HashMap;

use log::trace;

use crate::feature_switch::{default_switches, generate_identity, rollout_bucket, FeatureSwitch, FeatureSwitchError};
use crate::traits::{IdentityStore, SwitchConfigStore};

/// Explicit load state: an evaluator starts not-loaded and reads the persisted set exactly once
/// in its lifetime. Construct one per logical request.
enum SwitchState {
    NotLoaded,
    Loaded(HashMap<String, FeatureSwitch>),
}

/// Answers "is switch X enabled for this browser".
///
/// Resolution order per switch: the synchronized set from the config store, falling back to the
/// built-in default record. A name absent from the defaults is a programmer error (a switch was
/// consulted without being registered) and fails hard; a missing synchronized set is normal
/// before the first sync.
pub struct FeatureSwitchEvaluator<C, I> {
    config: C,
    identities: I,
    defaults: HashMap<String, FeatureSwitch>,
    state: SwitchState,
}

impl<C, I> FeatureSwitchEvaluator<C, I>
where
    C: SwitchConfigStore,
    I: IdentityStore,
{
    pub fn new(config: C, identities: I) -> Self {
        Self { config, identities, defaults: default_switches(), state: SwitchState::NotLoaded }
    }

    /// Replace the built-in default set. Storefronts registering their own switches do so here.
    pub fn with_defaults(mut self, defaults: HashMap<String, FeatureSwitch>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn is_enabled(&mut self, switch_name: &str) -> Result<bool, FeatureSwitchError> {
        let switch = self.switch_by_name(switch_name)?;
        let enabled = match switch.rollout_percentage {
            0 => switch.default_value,
            100 => switch.value,
            pct => {
                let identity = self.rollout_identity();
                let bucket = rollout_bucket(&identity, switch_name);
                trace!("🎚️ {switch_name}: identity bucketed at {bucket} against rollout {pct}");
                if bucket < pct {
                    switch.value
                } else {
                    switch.default_value
                }
            },
        };
        Ok(enabled)
    }

    fn switch_by_name(&mut self, switch_name: &str) -> Result<FeatureSwitch, FeatureSwitchError> {
        let Some(default) = self.defaults.get(switch_name).copied() else {
            return Err(FeatureSwitchError::UnknownSwitch(switch_name.to_string()));
        };
        self.load_switches()?;
        let synced = match &self.state {
            SwitchState::Loaded(switches) => switches.get(switch_name).copied(),
            SwitchState::NotLoaded => None,
        };
        Ok(synced.unwrap_or(default))
    }

    fn load_switches(&mut self) -> Result<(), FeatureSwitchError> {
        if matches!(self.state, SwitchState::Loaded(_)) {
            return Ok(());
        }
        let switches = match self.config.load_switches()? {
            Some(serialized) => {
                serde_json::from_str(&serialized).map_err(|e| FeatureSwitchError::ConfigError(e.to_string()))?
            },
            None => HashMap::new(),
        };
        self.state = SwitchState::Loaded(switches);
        Ok(())
    }

    /// The sticky per-browser identity, synthesized and persisted on first use.
    fn rollout_identity(&mut self) -> String {
        match self.identities.get_identity() {
            Some(identity) => identity,
            None => {
                let identity = generate_identity();
                self.identities.set_identity(&identity);
                identity
            },
        }
    }
}
