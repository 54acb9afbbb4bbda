use std::fmt::Debug;

use chrono::Utc;
use log::*;
use serde_json::json;

use crate::events::{CheckoutCompletedEvent, EventProducers};
use crate::helpers::{find_matching_rate, rates_debug_context};
use crate::reconciler::errors::ReconciliationError;
use crate::reconciler::totals::validate_totals;
use crate::traits::{NotificationSink, StorefrontBackend, TransactionSource};
use crate::transaction::Transaction;
use crate::types::{CartId, CartSnapshot, Order, OrderNumber, ParentCart, RecurringProfile, BOLT_PAYMENT_METHOD_CODE};

/// `OrderReconciler` matches a provider transaction against the locally snapshotted cart state
/// and commits exactly one order per checkout attempt, no matter how many storefront callbacks
/// and webhook deliveries race to create it.
pub struct OrderReconciler<B, T, N> {
    storefront: B,
    transactions: T,
    notifier: N,
    producers: EventProducers,
}

impl<B, T, N> Debug for OrderReconciler<B, T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderReconciler")
    }
}

enum Outcome {
    Created { order: Order, profiles: Vec<RecurringProfile> },
    AlreadyCreated(Order),
}

impl<B, T, N> OrderReconciler<B, T, N> {
    pub fn new(storefront: B, transactions: T, notifier: N) -> Self {
        Self { storefront, transactions, notifier, producers: EventProducers::default() }
    }

    pub fn with_event_producers(mut self, producers: EventProducers) -> Self {
        self.producers = producers;
        self
    }
}

impl<B, T, N> OrderReconciler<B, T, N>
where
    B: StorefrontBackend,
    T: TransactionSource,
    N: NotificationSink,
{
    /// Create the order for a provider checkout attempt, or return the order a previous attempt
    /// already committed.
    ///
    /// `reference` identifies the provider transaction and may only be omitted for
    /// merchant-initiated flows that pass a pre-fetched `transaction`. `session_cart_id` is the
    /// caller's live cart, if it has one; webhook-triggered creation has none and adopts the
    /// snapshot's parent cart id.
    ///
    /// Any failure re-activates the parent cart so a later retry can run, and surfaces as a
    /// single typed [`ReconciliationError`].
    pub async fn create_order(
        &self,
        reference: Option<&str>,
        session_cart_id: Option<CartId>,
        is_merchant_initiated: bool,
        transaction: Option<Transaction>,
    ) -> Result<Order, ReconciliationError> {
        let reference = reference.unwrap_or_default();
        if reference.is_empty() && !is_merchant_initiated {
            return Err(ReconciliationError::MissingReference);
        }

        let transaction = match transaction {
            Some(t) => t,
            None => self.transactions.fetch_transaction(reference).await?,
        };

        let snapshot_id = transaction.snapshot_cart_id();
        let mut snapshot = self
            .storefront
            .load_snapshot(&snapshot_id)
            .await?
            .ok_or_else(|| ReconciliationError::SnapshotNotFound(snapshot_id.clone()))?;
        let mut parent = self
            .storefront
            .load_parent_cart(&snapshot.parent_cart_id)
            .await?
            .ok_or_else(|| ReconciliationError::CartExpired(snapshot.parent_cart_id.clone()))?;

        let session_cart_id = session_cart_id.unwrap_or_else(|| snapshot.parent_cart_id.clone());
        debug!("🛒️ Reconciling transaction [{}] for snapshot {snapshot_id} (session cart {session_cart_id})", transaction.reference);

        match self.reconcile(&transaction, &mut snapshot, &mut parent).await {
            Ok(Outcome::AlreadyCreated(order)) => Ok(order),
            Ok(Outcome::Created { order, profiles }) => {
                // Close out the session by pointing the parent cart at the snapshot it just
                // consumed. The cycle is the lookup shortcut for "the snapshot used by this
                // session".
                parent.parent_cart_id = Some(snapshot.id.clone());
                self.storefront.save_parent_cart(&parent).await?;
                info!("🛒️ Order #{} created for snapshot {}", order.increment_id, snapshot.id);
                self.call_checkout_completed_hook(&order, &snapshot, profiles).await;
                Ok(order)
            },
            Err(e) => {
                // Mark the parent cart active again so webhooks can retry the attempt.
                parent.is_active = true;
                if let Err(save_err) = self.storefront.save_parent_cart(&parent).await {
                    error!("🛒️ Failed to re-activate parent cart {} after {e}: {save_err}", parent.id);
                }
                warn!("🛒️ Order creation failed for snapshot {snapshot_id} [{}]: {e}", e.code());
                Err(e)
            },
        }
    }

    async fn reconcile(
        &self,
        transaction: &Transaction,
        snapshot: &mut CartSnapshot,
        parent: &mut ParentCart,
    ) -> Result<Outcome, ReconciliationError> {
        self.validate_before_creation(snapshot, parent).await?;
        self.backfill_guest_identity(transaction, snapshot, parent).await?;
        self.apply_shipment(transaction, snapshot).await?;

        snapshot.payment_method = Some(BOLT_PAYMENT_METHOD_CODE.to_string());
        snapshot.collect_totals();
        self.storefront.save_snapshot(snapshot).await?;
        validate_totals(snapshot, transaction)?;

        if let Some(order) = self.guard_against_duplicate(snapshot, parent).await? {
            return Ok(Outcome::AlreadyCreated(order));
        }

        let submission = self.storefront.submit(snapshot).await?;
        let order = submission
            .order
            .ok_or_else(|| ReconciliationError::SubmissionReturnedNoOrder(snapshot.id.clone()))?;
        self.validate_after_creation(&order)?;
        Ok(Outcome::Created { order, profiles: submission.recurring_profiles })
    }

    /// Fail-fast pre-creation checks. Each failure is a distinct member of the error taxonomy.
    async fn validate_before_creation(
        &self,
        snapshot: &CartSnapshot,
        parent: &ParentCart,
    ) -> Result<(), ReconciliationError> {
        if snapshot.is_empty() {
            return Err(ReconciliationError::SnapshotEmpty(snapshot.id.clone()));
        }
        if parent.is_empty() {
            return Err(ReconciliationError::ParentCartEmpty(parent.id.clone()));
        }
        if !parent.is_active {
            return Err(ReconciliationError::CartExpired(parent.id.clone()));
        }

        for item in &snapshot.items {
            if !self.storefront.is_purchasable(&item.product_id).await? {
                return Err(ReconciliationError::ProductNotPurchasable(item.product_id));
            }
            // Composite items delegate stock to their children.
            if !item.has_children {
                let stock = self.storefront.stock_item(&item.product_id).await?;
                if !stock.check_qty(item.qty) {
                    return Err(ReconciliationError::InsufficientStock(item.product_id, stock.available(), item.qty));
                }
            }
        }
        Ok(())
    }

    /// Backfill guest identity onto the snapshot from the transaction's consumer and billing
    /// data, and stamp the billing name the provider verified against the card.
    async fn backfill_guest_identity(
        &self,
        transaction: &Transaction,
        snapshot: &mut CartSnapshot,
        parent: &ParentCart,
    ) -> Result<(), ReconciliationError> {
        if snapshot.customer_email.is_none() {
            if let Some(card) = &transaction.from_credit_card {
                snapshot.customer_email = card.billing_address.email_address.clone();
            }
            self.storefront.save_snapshot(snapshot).await?;
        }

        snapshot.customer_is_guest = parent.customer_id.is_none();
        if snapshot.customer_is_guest {
            if let Some(consumer) = &transaction.from_consumer {
                snapshot.customer_first_name = consumer.first_name.clone();
                snapshot.customer_last_name = consumer.last_name.clone();
            }
        }

        if let Some(card) = &transaction.from_credit_card {
            let billing = snapshot.billing_address.get_or_insert_with(Default::default);
            billing.first_name = card.billing_address.first_name.clone();
            billing.last_name = card.billing_address.last_name.clone();
        }
        self.storefront.save_snapshot(snapshot).await?;
        Ok(())
    }

    /// Apply the transaction's declared shipment to the snapshot.
    ///
    /// The package reference is the storefront method code. Legacy transactions lack it, so the
    /// human-readable service string is matched against currently quoted rates. An unmatched
    /// rate is an integration warning, not a failure: shipping application is skipped and the
    /// attempt continues.
    async fn apply_shipment(
        &self,
        transaction: &Transaction,
        snapshot: &mut CartSnapshot,
    ) -> Result<(), ReconciliationError> {
        let Some(package) = transaction.order.cart.shipments.first() else {
            return Ok(());
        };

        if let Some(addr) = &package.shipping_address {
            snapshot.shipping_address = Some(addr.into());
            self.storefront.save_snapshot(snapshot).await?;
        }

        let mut method_code = package.reference.clone();
        if method_code.is_none() {
            let service = package.service.clone().unwrap_or_default();
            snapshot.collect_totals();
            let rates = self.storefront.quote_rates(snapshot).await?;
            method_code = find_matching_rate(&rates, &service).map(|rate| rate.code());
            if method_code.is_none() {
                self.notifier.warn(
                    "Shipping method not found",
                    json!({
                        "transaction": transaction.reference,
                        "cart": snapshot.id.to_string(),
                        "debug": rates_debug_context(&rates, &service),
                    }),
                );
            }
        }

        if let Some(code) = method_code {
            debug!("🚚️ Applying shipping method {code} to snapshot {}", snapshot.id);
            snapshot.shipping_method_code = Some(code);
            self.storefront.save_snapshot(snapshot).await?;
        }
        Ok(())
    }

    /// The duplicate-creation guard. Returns the previously created order when this attempt is
    /// a retry of a completed creation; re-reserves the order number when the existing order
    /// belongs to a different in-flight snapshot.
    async fn guard_against_duplicate(
        &self,
        snapshot: &mut CartSnapshot,
        parent: &mut ParentCart,
    ) -> Result<Option<Order>, ReconciliationError> {
        let reserved = match parent.reserved_order_number.clone() {
            Some(number) => number,
            None => {
                let number = self.storefront.reserve_order_number(&parent.id).await?;
                parent.reserved_order_number = Some(number.clone());
                self.storefront.save_parent_cart(parent).await?;
                number
            },
        };

        if let Some(existing) = self.storefront.find_order_by_number(&reserved).await? {
            if existing.cart_id == snapshot.id {
                warn!(
                    "🛒️ Order #{} has already been processed for snapshot {}. Returning it as success.",
                    existing.increment_id, snapshot.id
                );
                self.notifier.warn(
                    &format!("The order #{} has already been processed for this cart.", existing.increment_id),
                    json!({ "cart": snapshot.id.to_string() }),
                );
                return Ok(Some(existing));
            }
            // The old reservation belongs to a different in-flight attempt. Reserve afresh and
            // let the snapshot inherit the new number.
            let fresh = self.storefront.reserve_order_number(&parent.id).await?;
            debug!(
                "🛒️ Reservation {reserved} is taken by cart {}; reserved {fresh} for snapshot {}",
                existing.cart_id, snapshot.id
            );
            parent.reserved_order_number = Some(fresh);
            self.storefront.save_parent_cart(parent).await?;
        }

        snapshot.reserved_order_number = parent.reserved_order_number.clone();
        self.storefront.save_snapshot(snapshot).await?;
        Ok(None)
    }

    fn validate_after_creation(&self, order: &Order) -> Result<(), ReconciliationError> {
        // The storefront reported success but the order did not come back with an id; it was
        // never saved.
        if order.id == 0 {
            return Err(ReconciliationError::General("Order was not able to be saved".to_string()));
        }
        Ok(())
    }

    async fn call_checkout_completed_hook(
        &self,
        order: &Order,
        snapshot: &CartSnapshot,
        recurring_profiles: Vec<RecurringProfile>,
    ) {
        for producer in &self.producers.checkout_completed_producer {
            debug!("📬️ Notifying checkout completed hook subscribers");
            let event = CheckoutCompletedEvent {
                order: order.clone(),
                snapshot_id: snapshot.id.clone(),
                recurring_profiles: recurring_profiles.clone(),
                completed_at: Utc::now(),
            };
            producer.publish_event(event).await;
        }
    }

    /// Called after the provider authorizes the order: the session cart is done retrying and is
    /// deactivated.
    pub async fn receive_order(&self, number: &OrderNumber) -> Result<(), ReconciliationError> {
        let order = self
            .storefront
            .find_order_by_number(number)
            .await?
            .ok_or_else(|| ReconciliationError::General(format!("Order {number} does not exist")))?;
        let snapshot = self
            .storefront
            .load_snapshot(&order.cart_id)
            .await?
            .ok_or_else(|| ReconciliationError::SnapshotNotFound(order.cart_id.clone()))?;
        let mut parent = self
            .storefront
            .load_parent_cart(&snapshot.parent_cart_id)
            .await?
            .ok_or_else(|| ReconciliationError::CartExpired(snapshot.parent_cart_id.clone()))?;
        parent.is_active = false;
        self.storefront.save_parent_cart(&parent).await?;
        debug!("🛒️ Order #{number} authorized; parent cart {} deactivated", parent.id);
        Ok(())
    }

    /// The order created from the given snapshot, if any. The parent-pointer cycle plus this
    /// lookup answer "which order did session X produce".
    pub async fn order_for_snapshot(&self, id: &CartId) -> Result<Option<Order>, ReconciliationError> {
        Ok(self.storefront.find_order_by_cart_id(id).await?)
    }

    pub fn storefront(&self) -> &B {
        &self.storefront
    }
}
