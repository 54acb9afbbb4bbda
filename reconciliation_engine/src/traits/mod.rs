//! # External collaborator seams.
//!
//! The reconciliation engine never talks to a database, a payment provider or a rate service
//! directly. Every such concern is a trait defined here, and the engine is generic over the
//! implementations:
//!
//! * [`TransactionSource`] fetches the authoritative provider transaction by reference.
//! * [`CartRepository`], [`ProductCatalog`], [`RateQuoteService`] and [`OrderSubmissionService`]
//!   are the storefront-platform seams. [`StorefrontBackend`] bundles the four for the
//!   reconciler, with a blanket impl for anything that implements them all.
//! * [`NotificationSink`] receives non-fatal integration diagnostics; it never aborts a flow.
//! * [`FeatureSwitchSyncService`], [`SwitchConfigStore`] and [`IdentityStore`] back the
//!   feature-switch subsystem.

mod feature_switch;
mod notification;
mod storefront;
mod transaction_source;

pub use feature_switch::{
    ConfigStoreError,
    FeatureSwitchSyncService,
    IdentityStore,
    RemoteSwitch,
    SwitchConfigStore,
    SwitchSyncError,
};
pub use notification::NotificationSink;
pub use storefront::{
    CartRepository,
    OrderSubmissionService,
    ProductCatalog,
    RateQuoteService,
    StorefrontBackend,
    StorefrontError,
    Submission,
};
pub use transaction_source::{TransactionSource, TransactionSourceError};
