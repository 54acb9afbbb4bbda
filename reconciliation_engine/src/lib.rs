//! Bolt Reconciliation Engine
//!
//! Core logic for turning an authorized Bolt checkout into exactly one storefront order. The
//! engine is storefront-agnostic: every platform concern (cart storage, product catalog, rate
//! quoting, order submission) is a trait in [`mod@traits`], and the [`OrderReconciler`] is
//! generic over whatever backend implements them.
//!
//! The library is divided into three main sections:
//! 1. The reconciliation flow ([`mod@reconciler`]). `create_order` matches the provider's
//!    transaction record against the locally snapshotted cart, validates stock and monetary
//!    totals in minor currency units, and commits the order idempotently no matter how many
//!    callbacks and webhooks race to create it.
//! 2. The feature-switch subsystem ([`mod@feature_switch`]). Switches are synced from the
//!    provider, cached through the storefront's config store, and evaluated per visitor with
//!    deterministic percentage-rollout bucketing.
//! 3. Events ([`mod@events`]). When a checkout completes, a `CheckoutCompletedEvent` is
//!    published to any subscribed hooks over a simple channel-based framework.

pub mod events;
pub mod feature_switch;
pub mod helpers;
mod reconciler;
pub mod traits;
pub mod transaction;
pub mod types;

pub mod test_utils;

pub use reconciler::{validate_totals, ErrorKind, OrderReconciler, ReconciliationError};
