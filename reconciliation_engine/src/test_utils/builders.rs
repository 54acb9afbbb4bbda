//! Canned fixtures. The snapshot and transaction agree on every total, so individual tests
//! perturb exactly the figure they are exercising.
//!
//! The standard cart holds one line, `item-1`, 2 x $12.25 = $24.50, with a $2.00 cart discount,
//! $4.99 shipping and $1.96 tax. The matching transaction declares 2450 / 200 / 499 / 196 minor
//! units.

use crate::transaction::{
    ConsumerInfo,
    CreditCardInfo,
    Shipment,
    Transaction,
    TransactionAddress,
    TransactionCart,
    TransactionLineItem,
    TransactionOrder,
};
use crate::types::{CartId, CartItem, CartSnapshot, CartTotals, ParentCart, ProductId, ShippingRate};

pub fn standard_parent_cart(id: CartId) -> ParentCart {
    ParentCart {
        id,
        items_count: 1,
        is_active: true,
        customer_id: None,
        reserved_order_number: None,
        parent_cart_id: None,
    }
}

pub fn standard_snapshot(id: CartId, parent_cart_id: CartId) -> CartSnapshot {
    CartSnapshot {
        id,
        parent_cart_id,
        items: vec![CartItem {
            reference: "item-1".into(),
            product_id: ProductId(101),
            qty: 2,
            calculation_price: 12.25,
            has_children: false,
        }],
        customer_email: Some("jo@example.com".to_string()),
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
            subtotal: 24.50,
            subtotal_with_discount: 22.50,
            tax: 1.96,
        },
    }
}

pub fn standard_transaction(snapshot_id: &CartId) -> Transaction {
    let shipping_address = TransactionAddress {
        email_address: Some("jo@example.com".to_string()),
        first_name: Some("Jo".to_string()),
        last_name: Some("Moss".to_string()),
        street_address1: Some("1 Main St".to_string()),
        locality: Some("Springfield".to_string()),
        region: Some("OR".to_string()),
        postal_code: Some("97477".to_string()),
        country_code: Some("US".to_string()),
        phone: Some("555-0100".to_string()),
    };
    Transaction {
        reference: "TX-STD-0001".to_string(),
        order: TransactionOrder {
            cart: TransactionCart {
                order_reference: snapshot_id.clone(),
                items: vec![TransactionLineItem {
                    reference: "item-1".into(),
                    total_amount: 2450.into(),
                    quantity: 2,
                }],
                shipments: vec![Shipment {
                    shipping_address: Some(shipping_address),
                    reference: Some("ups_ground".to_string()),
                    service: Some("UPS - Ground".to_string()),
                }],
                shipping_amount: 499.into(),
                discount_amount: 200.into(),
                tax_amount: 196.into(),
            },
        },
        from_consumer: Some(ConsumerInfo {
            first_name: Some("Jo".to_string()),
            last_name: Some("Moss".to_string()),
        }),
        from_credit_card: Some(CreditCardInfo {
            billing_address: TransactionAddress {
                email_address: Some("jo@example.com".to_string()),
                first_name: Some("Jo".to_string()),
                last_name: Some("Moss".to_string()),
                ..Default::default()
            },
        }),
        indemnification_reason: None,
    }
}

pub fn ups_ground_rate() -> ShippingRate {
    ShippingRate {
        carrier_title: "UPS".to_string(),
        method_title: Some("Ground".to_string()),
        carrier_code: "ups".to_string(),
        method_code: Some("ground".to_string()),
    }
}
