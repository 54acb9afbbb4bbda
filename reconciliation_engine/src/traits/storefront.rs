use thiserror::Error;

use crate::types::{
    CartId,
    CartSnapshot,
    Order,
    OrderNumber,
    ParentCart,
    ProductId,
    RecurringProfile,
    ShippingRate,
    StockItem,
};

#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    #[error("Storefront backend error. {0}")]
    BackendError(String),
    #[error("Cart {0} does not exist")]
    CartNotFound(CartId),
}

/// Persistence boundary for the two cart representations and for order lookups.
///
/// Saves are incremental: the reconciler persists snapshot mutations as it goes rather than
/// batching them into one transaction. A snapshot abandoned after a partial save is safe
/// because snapshots are single-use.
#[allow(async_fn_in_trait)]
pub trait CartRepository {
    async fn load_snapshot(&self, id: &CartId) -> Result<Option<CartSnapshot>, StorefrontError>;

    async fn load_parent_cart(&self, id: &CartId) -> Result<Option<ParentCart>, StorefrontError>;

    async fn save_snapshot(&self, snapshot: &CartSnapshot) -> Result<(), StorefrontError>;

    async fn save_parent_cart(&self, cart: &ParentCart) -> Result<(), StorefrontError>;

    /// Look up an order by its human-facing order number.
    async fn find_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError>;

    /// Look up the order that was created from the given cart snapshot, if any.
    async fn find_order_by_cart_id(&self, id: &CartId) -> Result<Option<Order>, StorefrontError>;

    /// Reserve a fresh human-facing order number for the given parent cart. The previous
    /// reservation, if any, is abandoned.
    async fn reserve_order_number(&self, cart_id: &CartId) -> Result<OrderNumber, StorefrontError>;
}

#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn is_purchasable(&self, product: &ProductId) -> Result<bool, StorefrontError>;

    async fn stock_item(&self, product: &ProductId) -> Result<StockItem, StorefrontError>;
}

/// Quotes shipping rates for a snapshot. Only consulted for legacy transactions whose shipment
/// package lacks a method reference.
#[allow(async_fn_in_trait)]
pub trait RateQuoteService {
    async fn quote_rates(&self, snapshot: &CartSnapshot) -> Result<Vec<ShippingRate>, StorefrontError>;
}

#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// The committed order. `None` means the storefront silently failed to save it, which the
    /// reconciler treats as a hard failure.
    pub order: Option<Order>,
    pub recurring_profiles: Vec<RecurringProfile>,
}

/// Commits a cart snapshot to an order on the storefront platform.
#[allow(async_fn_in_trait)]
pub trait OrderSubmissionService {
    async fn submit(&self, snapshot: &CartSnapshot) -> Result<Submission, StorefrontError>;
}

/// The full storefront-platform seam the reconciler runs against.
pub trait StorefrontBackend: CartRepository + ProductCatalog + RateQuoteService + OrderSubmissionService {}

impl<T> StorefrontBackend for T where T: CartRepository + ProductCatalog + RateQuoteService + OrderSubmissionService {}
