use serde_json::{json, Value};

use crate::types::ShippingRate;

/// Resolve a legacy transaction's human-readable service string against currently quoted rates.
///
/// The provider writes the string as `"CarrierTitle - MethodTitle"`. Rates without a method
/// title match on the carrier title alone. The comparison is exact; fuzzy matching would let a
/// renamed carrier silently select the wrong rate.
pub fn find_matching_rate<'a>(rates: &'a [ShippingRate], service: &str) -> Option<&'a ShippingRate> {
    rates.iter().find(|rate| match &rate.method_title {
        Some(method) => format!("{} - {}", rate.carrier_title, method) == service,
        None => rate.carrier_title == service,
    })
}

/// Context payload attached to the "shipping method not found" notification.
pub fn rates_debug_context(rates: &[ShippingRate], service: &str) -> Value {
    let quoted: Vec<Value> = rates
        .iter()
        .map(|rate| {
            json!({
                "carrier_title": rate.carrier_title,
                "method_title": rate.method_title,
                "code": rate.code(),
            })
        })
        .collect();
    json!({ "service": service, "rates": quoted })
}
