use serde_json::Value;

/// Routes non-fatal diagnostics to an external monitoring collaborator.
///
/// Implementations must never fail the caller: an unmatched shipping rate or an
/// already-processed order is worth a ticket, not an aborted checkout.
pub trait NotificationSink {
    fn warn(&self, message: &str, context: Value);

    fn error(&self, message: &str, context: Value);
}
