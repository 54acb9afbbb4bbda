use std::fmt::Display;

use bolt_common::MinorUnits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payment method code written onto every snapshot before submission.
pub const BOLT_PAYMENT_METHOD_CODE: &str = "boltpay";

/// Transactions created from the merchant back office carry this indemnification reason.
pub const MERCHANT_BACK_OFFICE: &str = "merchant_back_office";

//--------------------------------------     Id newtypes       -------------------------------------------------------

/// Identifies a cart record, whether a live parent cart or a frozen snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartId(pub i64);

impl Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CartId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// The human-facing, incrementing order number reserved on the parent cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(pub String);

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for OrderNumber {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The per-line-item reference shared between the snapshot and the provider transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef(pub String);

impl Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for ItemRef {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------     Carts       -------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub reference: ItemRef,
    pub product_id: ProductId,
    pub qty: u32,
    /// Unit price in decimal currency, as the storefront currently calculates it.
    pub calculation_price: f64,
    /// Composite items (bundles, configurables) delegate stock checks to their children.
    pub has_children: bool,
}

impl CartItem {
    pub fn row_total(&self) -> f64 {
        self.calculation_price * f64::from(self.qty)
    }
}

/// Decimal totals as the storefront computes them. Comparison against the provider's declared
/// totals happens in minor units; see the totals validator for the exact conversion rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartTotals {
    pub shipping_amount: f64,
    pub shipping_discount_amount: f64,
    pub subtotal: f64,
    pub subtotal_with_discount: f64,
    pub tax: f64,
}

/// The immutable quote: a frozen copy of the cart taken at provider-checkout time.
///
/// A snapshot is single-use. It is mutated only during reconciliation (addresses, payment
/// method, guest identity) and is never reused across two orders.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub id: CartId,
    pub parent_cart_id: CartId,
    pub items: Vec<CartItem>,
    pub customer_email: Option<String>,
    pub customer_first_name: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_is_guest: bool,
    pub reserved_order_number: Option<OrderNumber>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub shipping_method_code: Option<String>,
    pub payment_method: Option<String>,
    pub is_virtual: bool,
    pub totals: CartTotals,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_by_reference(&self, reference: &ItemRef) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.reference == reference)
    }

    /// Recompute the derived totals from the current line items. The configured discount delta
    /// and the quoted shipping/tax figures are preserved.
    pub fn collect_totals(&mut self) {
        let discount = self.totals.subtotal - self.totals.subtotal_with_discount;
        let subtotal: f64 = self.items.iter().map(CartItem::row_total).sum();
        self.totals.subtotal = subtotal;
        self.totals.subtotal_with_discount = subtotal - discount;
    }
}

/// The live, session-bound cart that spawned the snapshot.
///
/// `is_active` stays true while the checkout is retryable and is cleared once the order has been
/// authorized. After a successful reconciliation, `parent_cart_id` is redirected to point at the
/// consumed snapshot; the cycle is an intentional lookup shortcut, held as an id rather than an
/// owning reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentCart {
    pub id: CartId,
    pub items_count: u32,
    pub is_active: bool,
    pub customer_id: Option<i64>,
    pub reserved_order_number: Option<OrderNumber>,
    pub parent_cart_id: Option<CartId>,
}

impl ParentCart {
    pub fn is_empty(&self) -> bool {
        self.items_count == 0
    }
}

//--------------------------------------     Orders       ------------------------------------------------------------

/// A committed order. At most one exists per cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub increment_id: OrderNumber,
    /// The snapshot this order was created from. If an order already backs the current snapshot,
    /// reconciliation treats the attempt as already completed rather than as an error.
    pub cart_id: CartId,
    pub grand_total: MinorUnits,
    pub created_at: DateTime<Utc>,
}

/// A recurring-payment profile produced by order submission, reported through the completion
/// event but otherwise opaque to the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringProfile {
    pub reference: String,
    pub description: String,
}

//--------------------------------------     Shipping & stock       --------------------------------------------------

/// A quoted shipping rate from the storefront's rate service.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRate {
    pub carrier_title: String,
    pub method_title: Option<String>,
    pub carrier_code: String,
    pub method_code: Option<String>,
}

impl ShippingRate {
    /// The storefront shipping-method code as written onto a cart, `"carrier_method"`.
    pub fn code(&self) -> String {
        match &self.method_code {
            Some(method) => format!("{}_{}", self.carrier_code, method),
            None => self.carrier_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StockItem {
    pub qty: f64,
    /// The reserved minimum the storefront never sells below.
    pub min_qty: f64,
}

impl StockItem {
    pub fn available(&self) -> f64 {
        self.qty - self.min_qty
    }

    pub fn check_qty(&self, requested: u32) -> bool {
        f64::from(requested) <= self.available()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stock_availability_subtracts_the_reserved_minimum() {
        let stock = StockItem { qty: 10.0, min_qty: 2.0 };
        assert_eq!(stock.available(), 8.0);
        assert!(stock.check_qty(8));
        assert!(!stock.check_qty(9));
    }

    #[test]
    fn shipping_rate_code_omits_missing_method() {
        let rate = ShippingRate {
            carrier_title: "UPS".to_string(),
            method_title: Some("Ground".to_string()),
            carrier_code: "ups".to_string(),
            method_code: Some("ground".to_string()),
        };
        assert_eq!(rate.code(), "ups_ground");
        let carrier_only = ShippingRate {
            carrier_title: "Store pickup".to_string(),
            method_title: None,
            carrier_code: "pickup".to_string(),
            method_code: None,
        };
        assert_eq!(carrier_only.code(), "pickup");
    }

    #[test]
    fn collect_totals_preserves_the_discount_delta() {
        let mut snapshot = CartSnapshot {
            id: CartId(2),
            parent_cart_id: CartId(1),
            items: vec![CartItem {
                reference: "item-1".into(),
                product_id: ProductId(101),
                qty: 2,
                calculation_price: 12.25,
                has_children: false,
            }],
            customer_email: None,
            customer_first_name: None,
            customer_last_name: None,
            customer_is_guest: false,
            reserved_order_number: None,
            shipping_address: None,
            billing_address: None,
            shipping_method_code: None,
            payment_method: None,
            is_virtual: false,
            totals: CartTotals {
                shipping_amount: 4.99,
                shipping_discount_amount: 0.0,
                subtotal: 20.0,
                subtotal_with_discount: 18.0,
                tax: 1.96,
            },
        };
        snapshot.collect_totals();
        assert_eq!(snapshot.totals.subtotal, 24.5);
        assert_eq!(snapshot.totals.subtotal_with_discount, 22.5);
    }
}
