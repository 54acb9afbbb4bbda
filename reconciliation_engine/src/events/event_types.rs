use chrono::{DateTime, Utc};

use crate::types::{CartId, Order, RecurringProfile};

/// Emitted once per successfully reconciled checkout, after the order is committed and the
/// parent cart has been linked to its consumed snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutCompletedEvent {
    pub order: Order,
    pub snapshot_id: CartId,
    pub recurring_profiles: Vec<RecurringProfile>,
    pub completed_at: DateTime<Utc>,
}
