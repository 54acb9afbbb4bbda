//! End-to-end reconciliation flows against the in-memory storefront backend.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use bolt_common::MinorUnits;
use chrono::Utc;
use reconciliation_engine::{
    events::{CheckoutCompletedEvent, EventHandler, EventProducers},
    test_utils::{
        standard_parent_cart,
        standard_snapshot,
        standard_transaction,
        ups_ground_rate,
        MemoryStorefront,
        RecordingNotifier,
        StaticTransactionSource,
    },
    transaction::Transaction,
    types::{CartId, Order, OrderNumber, ProductId, StockItem, BOLT_PAYMENT_METHOD_CODE},
    ErrorKind,
    OrderReconciler,
    ReconciliationError,
};

const PARENT: CartId = CartId(1);
const SNAPSHOT: CartId = CartId(2);

type Reconciler = OrderReconciler<MemoryStorefront, StaticTransactionSource, RecordingNotifier>;

fn seeded_reconciler(transaction: Transaction) -> (Reconciler, MemoryStorefront, RecordingNotifier) {
    let _ = env_logger::try_init();
    let storefront = MemoryStorefront::default();
    storefront.insert_parent_cart(standard_parent_cart(PARENT));
    storefront.insert_snapshot(standard_snapshot(SNAPSHOT, PARENT));
    let notifier = RecordingNotifier::default();
    let reconciler =
        OrderReconciler::new(storefront.clone(), StaticTransactionSource::returning(transaction), notifier.clone());
    (reconciler, storefront, notifier)
}

#[tokio::test]
async fn a_checkout_creates_exactly_one_order_and_links_the_cart_cycle() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));

    let order = reconciler.create_order(Some("TX-STD-0001"), Some(PARENT), false, None).await.unwrap();

    let orders = storefront.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].cart_id, SNAPSHOT);
    assert_eq!(order.grand_total.value(), 2250 + 499 + 196);

    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert_eq!(snapshot.payment_method.as_deref(), Some(BOLT_PAYMENT_METHOD_CODE));
    assert_eq!(snapshot.shipping_method_code.as_deref(), Some("ups_ground"));
    assert_eq!(snapshot.reserved_order_number, Some(order.increment_id.clone()));
    let shipping = snapshot.shipping_address.unwrap();
    assert_eq!(shipping.city.as_deref(), Some("Springfield"));

    // The parent cart now points at the snapshot it consumed.
    let parent = storefront.parent_cart(&PARENT).unwrap();
    assert_eq!(parent.parent_cart_id, Some(SNAPSHOT));
    assert_eq!(parent.reserved_order_number, Some(order.increment_id.clone()));

    let again = reconciler.order_for_snapshot(&SNAPSHOT).await.unwrap().unwrap();
    assert_eq!(again, order);
}

#[tokio::test]
async fn a_webhook_retry_returns_the_committed_order_instead_of_duplicating_it() {
    let (reconciler, storefront, notifier) = seeded_reconciler(standard_transaction(&SNAPSHOT));

    let first = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();
    let second = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(storefront.orders().len(), 1);
    let warnings = notifier.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].0.contains("already been processed"));
}

#[tokio::test]
async fn a_cent_of_shipping_drift_aborts_creation_and_keeps_the_cart_retryable() {
    let mut transaction = standard_transaction(&SNAPSHOT);
    transaction.order.cart.shipping_amount = 500.into();
    let (reconciler, storefront, _) = seeded_reconciler(transaction);

    let err = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::ShippingTotalMismatch { .. }));
    assert_eq!(err.code(), "cart_has_expired");

    assert!(storefront.orders().is_empty());
    assert!(storefront.parent_cart(&PARENT).unwrap().is_active);
}

#[tokio::test]
async fn an_inventory_shortfall_blocks_creation() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    // One unit on hand, the cart wants two.
    storefront.set_stock(ProductId(101), StockItem { qty: 1.0, min_qty: 0.0 });

    let err = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::InsufficientStock(ProductId(101), _, 2)));
    assert_eq!(err.kind(), ErrorKind::OutOfInventory);
    assert!(storefront.orders().is_empty());
}

#[tokio::test]
async fn an_unpurchasable_product_blocks_creation() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    storefront.set_unpurchasable(ProductId(101));

    let err = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::ProductNotPurchasable(ProductId(101))));
    assert!(storefront.orders().is_empty());
}

#[tokio::test]
async fn a_legacy_service_string_resolves_through_the_quoted_rates() {
    let mut transaction = standard_transaction(&SNAPSHOT);
    transaction.order.cart.shipments[0].reference = None;
    transaction.order.cart.shipments[0].service = Some("UPS - Ground".to_string());
    let (reconciler, storefront, notifier) = seeded_reconciler(transaction);
    storefront.set_rates(vec![ups_ground_rate()]);

    reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert_eq!(snapshot.shipping_method_code.as_deref(), Some("ups_ground"));
    assert!(notifier.warnings().is_empty());
}

#[tokio::test]
async fn an_unmatched_legacy_rate_warns_but_still_creates_the_order() {
    let mut transaction = standard_transaction(&SNAPSHOT);
    transaction.order.cart.shipments[0].reference = None;
    transaction.order.cart.shipments[0].service = Some("Teleport - Instant".to_string());
    let (reconciler, storefront, notifier) = seeded_reconciler(transaction);
    storefront.set_rates(vec![ups_ground_rate()]);

    reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert!(snapshot.shipping_method_code.is_none());
    let warnings = notifier.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, "Shipping method not found");
    assert_eq!(storefront.orders().len(), 1);
}

#[tokio::test]
async fn guest_identity_is_backfilled_from_the_transaction() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    let mut snapshot = standard_snapshot(SNAPSHOT, PARENT);
    snapshot.customer_email = None;
    storefront.insert_snapshot(snapshot);

    reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert_eq!(snapshot.customer_email.as_deref(), Some("jo@example.com"));
    assert!(snapshot.customer_is_guest);
    assert_eq!(snapshot.customer_first_name.as_deref(), Some("Jo"));
    assert_eq!(snapshot.customer_last_name.as_deref(), Some("Moss"));
    let billing = snapshot.billing_address.unwrap();
    assert_eq!(billing.first_name.as_deref(), Some("Jo"));
    assert_eq!(billing.last_name.as_deref(), Some("Moss"));
}

#[tokio::test]
async fn a_logged_in_customer_is_not_marked_as_guest() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    let mut parent = standard_parent_cart(PARENT);
    parent.customer_id = Some(77);
    storefront.insert_parent_cart(parent);

    reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert!(!snapshot.customer_is_guest);
    // Guest name backfill must not overwrite the account holder's details.
    assert!(snapshot.customer_first_name.is_none());
}

#[tokio::test]
async fn a_reservation_held_by_another_cart_is_replaced_with_a_fresh_one() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    let stale = OrderNumber::from("100000042");
    let mut parent = standard_parent_cart(PARENT);
    parent.reserved_order_number = Some(stale.clone());
    storefront.insert_parent_cart(parent);
    // The stale number already belongs to an order committed from an unrelated cart.
    storefront.insert_order(Order {
        id: 900,
        increment_id: stale.clone(),
        cart_id: CartId(99),
        grand_total: MinorUnits::from(1000),
        created_at: Utc::now(),
    });

    let order = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();
    assert_ne!(order.increment_id, stale);
    let snapshot = storefront.snapshot(&SNAPSHOT).unwrap();
    assert_eq!(snapshot.reserved_order_number, Some(order.increment_id.clone()));
    assert_eq!(storefront.orders().len(), 2);
}

#[tokio::test]
async fn a_missing_reference_is_rejected_before_any_backend_call() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));

    let err = reconciler.create_order(None, None, false, None).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::MissingReference));
    assert!(storefront.orders().is_empty());
}

#[tokio::test]
async fn a_provider_fetch_failure_surfaces_as_a_general_error() {
    let _ = env_logger::try_init();
    let storefront = MemoryStorefront::default();
    let reconciler = OrderReconciler::new(
        storefront,
        StaticTransactionSource::failing("connection refused"),
        RecordingNotifier::default(),
    );

    let err = reconciler.create_order(Some("TX-GONE"), None, false, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::General);
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn merchant_initiated_flows_use_the_prefetched_transaction() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    let prefetched = standard_transaction(&SNAPSHOT);

    // No reference and no session cart, as a back-office order has neither.
    reconciler.create_order(None, None, true, Some(prefetched)).await.unwrap();
    assert_eq!(storefront.orders().len(), 1);
}

#[tokio::test]
async fn a_silent_submission_failure_is_reported_not_swallowed() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    storefront.fail_submission();

    let err = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::SubmissionReturnedNoOrder(SNAPSHOT)));
    assert!(storefront.parent_cart(&PARENT).unwrap().is_active);
}

#[tokio::test]
async fn receiving_the_authorized_order_deactivates_the_parent_cart() {
    let (reconciler, storefront, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));

    let order = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();
    assert!(storefront.parent_cart(&PARENT).unwrap().is_active);

    reconciler.receive_order(&order.increment_id).await.unwrap();
    assert!(!storefront.parent_cart(&PARENT).unwrap().is_active);
}

#[tokio::test]
async fn completion_events_reach_subscribed_hooks() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let handler = Arc::new(move |event: CheckoutCompletedEvent| {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(event);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let event_handler = EventHandler::new(10, handler);
    let mut producers = EventProducers::default();
    producers.checkout_completed_producer.push(event_handler.subscribe());
    let running = tokio::spawn(event_handler.start_handler());

    let (reconciler, _, _) = seeded_reconciler(standard_transaction(&SNAPSHOT));
    let reconciler = reconciler.with_event_producers(producers);
    let order = reconciler.create_order(Some("TX-STD-0001"), None, false, None).await.unwrap();

    // Dropping the reconciler drops the last producer and lets the handler drain and stop.
    drop(reconciler);
    running.await.unwrap();

    let events = received.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].order, order);
    assert_eq!(events[0].snapshot_id, SNAPSHOT);
}
