//! Pure comparison of the snapshot's computed totals against the transaction's declared ones.
//!
//! Everything is compared in minor currency units. Shipping, discount and per-line totals
//! truncate the decimal figure; tax rounds half away from zero. The asymmetry matches the
//! provider's own conversion and decides pass/fail at boundary cents, so it must not be
//! normalised.

use bolt_common::MinorUnits;

use crate::reconciler::errors::ReconciliationError;
use crate::transaction::Transaction;
use crate::types::CartSnapshot;

pub fn validate_totals(snapshot: &CartSnapshot, transaction: &Transaction) -> Result<(), ReconciliationError> {
    let cart = &transaction.order.cart;

    // Virtual carts have nothing to ship; the shipping check only applies to physical ones.
    if !snapshot.is_virtual {
        let computed =
            MinorUnits::truncated(snapshot.totals.shipping_amount - snapshot.totals.shipping_discount_amount);
        let declared = cart.shipping_amount.minor_units();
        if computed != declared {
            return Err(ReconciliationError::ShippingTotalMismatch { declared, computed });
        }
        // Shipping tax is folded into the full tax total below and is not validated separately.
    }

    let computed = MinorUnits::truncated(snapshot.totals.subtotal - snapshot.totals.subtotal_with_discount);
    let declared = cart.discount_amount.minor_units();
    if computed != declared {
        return Err(ReconciliationError::DiscountTotalMismatch { declared, computed });
    }

    let computed = MinorUnits::rounded(snapshot.totals.tax);
    let declared = cart.tax_amount.minor_units();
    if computed != declared {
        return Err(ReconciliationError::TaxTotalMismatch { declared, computed });
    }

    for line in &cart.items {
        let declared = line.total_amount.minor_units();
        let computed = match snapshot.item_by_reference(&line.reference) {
            Some(item) => MinorUnits::rounded(item.row_total()),
            // The provider billed an item the snapshot no longer holds.
            None => MinorUnits::from(0),
        };
        if declared != computed {
            return Err(ReconciliationError::ItemPriceChanged {
                item: line.reference.clone(),
                declared,
                computed,
            });
        }
    }

    Ok(())
}
