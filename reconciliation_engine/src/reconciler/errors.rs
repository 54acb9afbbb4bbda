use bolt_common::MinorUnits;
use thiserror::Error;

use crate::traits::{StorefrontError, TransactionSourceError};
use crate::types::{CartId, ItemRef, ProductId};

/// The machine-readable error family, for callers mapping failures to provider-facing
/// statuses. Exhaustive matching here replaces the exception-subclass checks of older
/// integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CartExpired,
    OutOfInventory,
    ItemPriceChanged,
    General,
}

/// The closed taxonomy of reconciliation failures.
///
/// Validation fails fast: the first violated check raises immediately, there is no accumulation
/// of multiple errors. Unexpected failures from collaborators funnel into [`Self::General`],
/// preserving the original message for diagnostics.
#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("The transaction reference is missing in the order creation process")]
    MissingReference,
    #[error("Cart snapshot {0} could not be found")]
    SnapshotNotFound(CartId),
    #[error("Cart snapshot {0} has no items")]
    SnapshotEmpty(CartId),
    #[error("The parent cart {0} has no items")]
    ParentCartEmpty(CartId),
    #[error("The parent cart {0} is no longer active")]
    CartExpired(CartId),
    #[error("Product {0} can no longer be purchased")]
    ProductNotPurchasable(ProductId),
    #[error("Insufficient stock for product {0}: {1} available, {2} requested")]
    InsufficientStock(ProductId, f64, u32),
    #[error("Shipping total mismatch. Provider declared {declared}, storefront computed {computed}")]
    ShippingTotalMismatch { declared: MinorUnits, computed: MinorUnits },
    #[error("Discount total mismatch. Provider declared {declared}, storefront computed {computed}")]
    DiscountTotalMismatch { declared: MinorUnits, computed: MinorUnits },
    #[error("Tax total mismatch. Provider declared {declared}, storefront computed {computed}")]
    TaxTotalMismatch { declared: MinorUnits, computed: MinorUnits },
    #[error("The price of item {item} has changed. Provider declared {declared}, storefront computed {computed}")]
    ItemPriceChanged {
        item: ItemRef,
        declared: MinorUnits,
        computed: MinorUnits,
    },
    #[error("Order submission returned no order for snapshot {0}")]
    SubmissionReturnedNoOrder(CartId),
    #[error("Unexpected failure during order creation. {0}")]
    General(String),
}

impl ReconciliationError {
    pub fn kind(&self) -> ErrorKind {
        use ReconciliationError::*;
        match self {
            SnapshotNotFound(_) | SnapshotEmpty(_) | ParentCartEmpty(_) | CartExpired(_) | ProductNotPurchasable(_) => {
                ErrorKind::CartExpired
            },
            ShippingTotalMismatch { .. } | DiscountTotalMismatch { .. } | TaxTotalMismatch { .. } => {
                ErrorKind::CartExpired
            },
            InsufficientStock(..) => ErrorKind::OutOfInventory,
            ItemPriceChanged { .. } => ErrorKind::ItemPriceChanged,
            MissingReference | SubmissionReturnedNoOrder(_) | General(_) => ErrorKind::General,
        }
    }

    /// A stable code for logs and provider-facing responses.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::CartExpired => "cart_has_expired",
            ErrorKind::OutOfInventory => "out_of_inventory",
            ErrorKind::ItemPriceChanged => "item_price_has_been_updated",
            ErrorKind::General => "general_error",
        }
    }
}

impl From<StorefrontError> for ReconciliationError {
    fn from(e: StorefrontError) -> Self {
        ReconciliationError::General(e.to_string())
    }
}

impl From<TransactionSourceError> for ReconciliationError {
    fn from(e: TransactionSourceError) -> Self {
        ReconciliationError::General(e.to_string())
    }
}
