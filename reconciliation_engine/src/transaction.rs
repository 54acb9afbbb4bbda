//! Wire model for the provider-side transaction record.
//!
//! The transaction is authoritative for cart contents, addresses and declared monetary totals.
//! It is read-only to this engine; every field mirrors the provider's JSON payload and all
//! `Amount` values arrive already expressed in minor currency units.

use bolt_common::MinorUnits;
use serde::Deserialize;

use crate::types::{Address, CartId, ItemRef, MERCHANT_BACK_OFFICE};

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub reference: String,
    pub order: TransactionOrder,
    #[serde(default)]
    pub from_consumer: Option<ConsumerInfo>,
    #[serde(default)]
    pub from_credit_card: Option<CreditCardInfo>,
    #[serde(default)]
    pub indemnification_reason: Option<String>,
}

impl Transaction {
    /// The id of the cart snapshot this transaction was checked out from.
    pub fn snapshot_cart_id(&self) -> CartId {
        self.order.cart.order_reference.clone()
    }

    pub fn is_merchant_back_office(&self) -> bool {
        self.indemnification_reason.as_deref() == Some(MERCHANT_BACK_OFFICE)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionOrder {
    pub cart: TransactionCart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionCart {
    pub order_reference: CartId,
    #[serde(default)]
    pub items: Vec<TransactionLineItem>,
    #[serde(default)]
    pub shipments: Vec<Shipment>,
    pub shipping_amount: Amount,
    pub discount_amount: Amount,
    pub tax_amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionLineItem {
    pub reference: ItemRef,
    pub total_amount: Amount,
    pub quantity: u32,
}

/// A shipment package. `reference` carries the storefront shipping-method code; legacy
/// transactions predate it and only carry the human-readable `service` string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub shipping_address: Option<TransactionAddress>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Amount {
    pub amount: i64,
}

impl Amount {
    pub fn minor_units(&self) -> MinorUnits {
        MinorUnits::from(self.amount)
    }
}

impl From<i64> for Amount {
    fn from(amount: i64) -> Self {
        Self { amount }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumerInfo {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditCardInfo {
    pub billing_address: TransactionAddress,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionAddress {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub street_address1: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<&TransactionAddress> for Address {
    fn from(addr: &TransactionAddress) -> Self {
        Self {
            first_name: addr.first_name.clone(),
            last_name: addr.last_name.clone(),
            street: addr.street_address1.clone(),
            city: addr.locality.clone(),
            region: addr.region.clone(),
            postal_code: addr.postal_code.clone(),
            country_code: addr.country_code.clone(),
            phone: addr.phone.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserializes_a_provider_payload() {
        let json = r#"{
            "reference": "TX-ABCD-1234",
            "indemnification_reason": "merchant_back_office",
            "order": {
                "cart": {
                    "order_reference": 42,
                    "shipping_amount": { "amount": 499 },
                    "discount_amount": { "amount": 200 },
                    "tax_amount": { "amount": 196 },
                    "items": [
                        { "reference": "item-1", "total_amount": { "amount": 2450 }, "quantity": 2 }
                    ],
                    "shipments": [
                        { "reference": null, "service": "UPS - Ground",
                          "shipping_address": { "first_name": "Jo", "locality": "Springfield" } }
                    ]
                }
            },
            "from_consumer": { "first_name": "Jo", "last_name": "Moss" },
            "from_credit_card": { "billing_address": { "email_address": "jo@example.com" } }
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.snapshot_cart_id(), CartId(42));
        assert!(tx.is_merchant_back_office());
        assert_eq!(tx.order.cart.shipping_amount.minor_units().value(), 499);
        assert_eq!(tx.order.cart.items[0].quantity, 2);
        let shipment = &tx.order.cart.shipments[0];
        assert!(shipment.reference.is_none());
        assert_eq!(shipment.service.as_deref(), Some("UPS - Ground"));
        let billing = &tx.from_credit_card.unwrap().billing_address;
        assert_eq!(billing.email_address.as_deref(), Some("jo@example.com"));
    }

    #[test]
    fn missing_optional_sections_default_cleanly() {
        let json = r#"{
            "reference": "TX-1",
            "order": { "cart": {
                "order_reference": 7,
                "shipping_amount": { "amount": 0 },
                "discount_amount": { "amount": 0 },
                "tax_amount": { "amount": 0 }
            } }
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.order.cart.items.is_empty());
        assert!(tx.order.cart.shipments.is_empty());
        assert!(!tx.is_merchant_back_office());
    }
}
