//! # Order reconciliation.
//!
//! [`OrderReconciler`] orchestrates the whole flow: pre-creation validation, applying the
//! transaction's declared shipment and payment data, totals validation, the duplicate-creation
//! guard, submission and post-creation checks. [`validate_totals`] is the pure comparison core
//! and [`ReconciliationError`] the closed failure taxonomy.

mod api;
mod errors;
mod totals;

pub use api::OrderReconciler;
pub use errors::{ErrorKind, ReconciliationError};
pub use totals::validate_totals;
