//! Test support: in-memory collaborator implementations and fixture builders.
//!
//! These are deliberately simple, deterministic stand-ins for the storefront platform and the
//! provider API, shared by the unit tests and the integration suites.

mod builders;
mod memory;
#[cfg(feature = "test_utils")]
mod prepare_env;

pub use builders::{standard_parent_cart, standard_snapshot, standard_transaction, ups_ground_rate};
pub use memory::{
    MemoryConfigStore,
    MemoryIdentityStore,
    MemoryStorefront,
    RecordingNotifier,
    StaticSwitchSync,
    StaticTransactionSource,
};
#[cfg(feature = "test_utils")]
pub use prepare_env::prepare_test_env;
