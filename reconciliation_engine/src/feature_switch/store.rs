use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::feature_switch::FeatureSwitch;

/// Process-wide, read-mostly copy of the synchronized switch set.
///
/// The whole map is swapped atomically under the write lock, so concurrent readers either see
/// the full old set or the full new one, never a partially replaced map.
#[derive(Clone, Default)]
pub struct SharedSwitchStore {
    inner: Arc<RwLock<HashMap<String, FeatureSwitch>>>,
}

impl SharedSwitchStore {
    pub fn get(&self, name: &str) -> Option<FeatureSwitch> {
        match self.inner.read() {
            Ok(guard) => guard.get(name).copied(),
            Err(poisoned) => poisoned.into_inner().get(name).copied(),
        }
    }

    pub fn replace(&self, switches: HashMap<String, FeatureSwitch>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = switches,
            Err(poisoned) => *poisoned.into_inner() = switches,
        }
    }

    /// A full copy of the current set, taken under a single read lock.
    pub fn snapshot(&self) -> HashMap<String, FeatureSwitch> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.inner.read() {
            Ok(guard) => guard.is_empty(),
            Err(poisoned) => poisoned.into_inner().is_empty(),
        }
    }
}
