use thiserror::Error;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Error)]
pub enum TransactionSourceError {
    #[error("Failed to fetch transaction {0}. {1}")]
    FetchFailed(String, String),
    #[error("Transaction payload could not be parsed. {0}")]
    InvalidPayload(String),
}

/// Fetches a provider transaction by its reference. The provider is the authoritative source
/// of cart contents, addresses and declared totals; a fetch failure is terminal for the call
/// that needed the transaction.
#[allow(async_fn_in_trait)]
pub trait TransactionSource {
    async fn fetch_transaction(&self, reference: &str) -> Result<Transaction, TransactionSourceError>;
}
