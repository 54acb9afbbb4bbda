use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use bolt_common::MinorUnits;
use chrono::Utc;
use serde_json::Value;

use crate::traits::{
    CartRepository,
    FeatureSwitchSyncService,
    NotificationSink,
    OrderSubmissionService,
    ProductCatalog,
    RateQuoteService,
    RemoteSwitch,
    StorefrontError,
    Submission,
    SwitchConfigStore,
    ConfigStoreError,
    IdentityStore,
    SwitchSyncError,
    TransactionSource,
    TransactionSourceError,
};
use crate::transaction::Transaction;
use crate::types::{
    CartId,
    CartSnapshot,
    Order,
    OrderNumber,
    ParentCart,
    ProductId,
    ShippingRate,
    StockItem,
};

#[derive(Default)]
struct StoreState {
    snapshots: HashMap<CartId, CartSnapshot>,
    parents: HashMap<CartId, ParentCart>,
    orders: Vec<Order>,
    rates: Vec<ShippingRate>,
    unpurchasable: Vec<ProductId>,
    stock: HashMap<ProductId, StockItem>,
    next_order_number: u64,
    next_order_id: i64,
    submission_returns_no_order: bool,
}

/// An in-memory storefront backend covering all four platform seams.
#[derive(Clone, Default)]
pub struct MemoryStorefront {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStorefront {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_snapshot(&self, snapshot: CartSnapshot) {
        self.lock().snapshots.insert(snapshot.id.clone(), snapshot);
    }

    pub fn insert_parent_cart(&self, cart: ParentCart) {
        self.lock().parents.insert(cart.id.clone(), cart);
    }

    pub fn insert_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    pub fn set_rates(&self, rates: Vec<ShippingRate>) {
        self.lock().rates = rates;
    }

    pub fn set_stock(&self, product: ProductId, stock: StockItem) {
        self.lock().stock.insert(product, stock);
    }

    pub fn set_unpurchasable(&self, product: ProductId) {
        self.lock().unpurchasable.push(product);
    }

    /// Make the next submissions report success without an order, as a silently failing
    /// storefront would.
    pub fn fail_submission(&self) {
        self.lock().submission_returns_no_order = true;
    }

    pub fn snapshot(&self, id: &CartId) -> Option<CartSnapshot> {
        self.lock().snapshots.get(id).cloned()
    }

    pub fn parent_cart(&self, id: &CartId) -> Option<ParentCart> {
        self.lock().parents.get(id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }
}

impl CartRepository for MemoryStorefront {
    async fn load_snapshot(&self, id: &CartId) -> Result<Option<CartSnapshot>, StorefrontError> {
        Ok(self.lock().snapshots.get(id).cloned())
    }

    async fn load_parent_cart(&self, id: &CartId) -> Result<Option<ParentCart>, StorefrontError> {
        Ok(self.lock().parents.get(id).cloned())
    }

    async fn save_snapshot(&self, snapshot: &CartSnapshot) -> Result<(), StorefrontError> {
        self.lock().snapshots.insert(snapshot.id.clone(), snapshot.clone());
        Ok(())
    }

    async fn save_parent_cart(&self, cart: &ParentCart) -> Result<(), StorefrontError> {
        self.lock().parents.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn find_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, StorefrontError> {
        Ok(self.lock().orders.iter().find(|o| &o.increment_id == number).cloned())
    }

    async fn find_order_by_cart_id(&self, id: &CartId) -> Result<Option<Order>, StorefrontError> {
        Ok(self.lock().orders.iter().find(|o| &o.cart_id == id).cloned())
    }

    async fn reserve_order_number(&self, _cart_id: &CartId) -> Result<OrderNumber, StorefrontError> {
        let mut state = self.lock();
        state.next_order_number += 1;
        Ok(OrderNumber::from(format!("{:09}", 100_000_000 + state.next_order_number)))
    }
}

impl ProductCatalog for MemoryStorefront {
    async fn is_purchasable(&self, product: &ProductId) -> Result<bool, StorefrontError> {
        Ok(!self.lock().unpurchasable.contains(product))
    }

    async fn stock_item(&self, product: &ProductId) -> Result<StockItem, StorefrontError> {
        // Unseeded products are treated as amply stocked.
        Ok(self.lock().stock.get(product).copied().unwrap_or(StockItem { qty: 1000.0, min_qty: 0.0 }))
    }
}

impl RateQuoteService for MemoryStorefront {
    async fn quote_rates(&self, _snapshot: &CartSnapshot) -> Result<Vec<ShippingRate>, StorefrontError> {
        Ok(self.lock().rates.clone())
    }
}

impl OrderSubmissionService for MemoryStorefront {
    async fn submit(&self, snapshot: &CartSnapshot) -> Result<Submission, StorefrontError> {
        let mut state = self.lock();
        if state.submission_returns_no_order {
            return Ok(Submission::default());
        }
        let number = snapshot
            .reserved_order_number
            .clone()
            .ok_or_else(|| StorefrontError::BackendError("snapshot has no reserved order number".to_string()))?;
        state.next_order_id += 1;
        let grand_total = MinorUnits::rounded(
            snapshot.totals.subtotal_with_discount
                + snapshot.totals.shipping_amount
                - snapshot.totals.shipping_discount_amount
                + snapshot.totals.tax,
        );
        let order = Order {
            id: state.next_order_id,
            increment_id: number,
            cart_id: snapshot.id.clone(),
            grand_total,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        Ok(Submission { order: Some(order), recurring_profiles: Vec::new() })
    }
}

//--------------------------------------     Provider side       -----------------------------------------------------

/// A transaction source returning one canned transaction, or failing on demand.
#[derive(Clone, Default)]
pub struct StaticTransactionSource {
    transaction: Option<Transaction>,
    fail_with: Option<String>,
}

impl StaticTransactionSource {
    pub fn returning(transaction: Transaction) -> Self {
        Self { transaction: Some(transaction), fail_with: None }
    }

    pub fn failing(message: &str) -> Self {
        Self { transaction: None, fail_with: Some(message.to_string()) }
    }
}

impl TransactionSource for StaticTransactionSource {
    async fn fetch_transaction(&self, reference: &str) -> Result<Transaction, TransactionSourceError> {
        if let Some(message) = &self.fail_with {
            return Err(TransactionSourceError::FetchFailed(reference.to_string(), message.clone()));
        }
        self.transaction
            .clone()
            .ok_or_else(|| TransactionSourceError::FetchFailed(reference.to_string(), "no transaction".to_string()))
    }
}

/// Captures warnings and errors for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    warnings: Arc<Mutex<Vec<(String, Value)>>>,
    errors: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingNotifier {
    pub fn warnings(&self) -> Vec<(String, Value)> {
        self.warnings.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<(String, Value)> {
        self.errors.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn warn(&self, message: &str, context: Value) {
        self.warnings.lock().unwrap_or_else(|p| p.into_inner()).push((message.to_string(), context));
    }

    fn error(&self, message: &str, context: Value) {
        self.errors.lock().unwrap_or_else(|p| p.into_inner()).push((message.to_string(), context));
    }
}

//--------------------------------------     Feature switches       --------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryConfigStore {
    serialized: Arc<Mutex<Option<String>>>,
    invalidations: Arc<Mutex<u32>>,
}

impl MemoryConfigStore {
    pub fn invalidation_count(&self) -> u32 {
        *self.invalidations.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl SwitchConfigStore for MemoryConfigStore {
    fn load_switches(&self) -> Result<Option<String>, ConfigStoreError> {
        Ok(self.serialized.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save_switches(&self, serialized: &str) -> Result<(), ConfigStoreError> {
        *self.serialized.lock().unwrap_or_else(|p| p.into_inner()) = Some(serialized.to_string());
        Ok(())
    }

    fn invalidate_cache(&self) {
        *self.invalidations.lock().unwrap_or_else(|p| p.into_inner()) += 1;
    }
}

#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    identity: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentityStore {
    pub fn with_identity(identity: &str) -> Self {
        Self { identity: Arc::new(Mutex::new(Some(identity.to_string()))) }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get_identity(&self) -> Option<String> {
        self.identity.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn set_identity(&self, identity: &str) {
        *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity.to_string());
    }
}

/// A switch sync service returning a canned list, or failing on demand.
#[derive(Clone, Default)]
pub struct StaticSwitchSync {
    switches: Vec<RemoteSwitch>,
    fail_with: Option<String>,
}

impl StaticSwitchSync {
    pub fn returning(switches: Vec<RemoteSwitch>) -> Self {
        Self { switches, fail_with: None }
    }

    pub fn failing(message: &str) -> Self {
        Self { switches: Vec::new(), fail_with: Some(message.to_string()) }
    }
}

impl FeatureSwitchSyncService for StaticSwitchSync {
    async fn fetch_switches(&self) -> Result<Vec<RemoteSwitch>, SwitchSyncError> {
        match &self.fail_with {
            Some(message) => Err(SwitchSyncError::TransportError(message.clone())),
            None => Ok(self.switches.clone()),
        }
    }
}
