use cil_types::{Amount, TransactionId};

/// Errors produced by ledger operations.
///
/// Missing entries and bad amounts are expected conditions: they leave state
/// unchanged and are surfaced to the caller for a user-facing message, never
/// raised as a panic. Duplicate creation is not an error at all; it is a
/// benign no-op handled by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Amount, reason: String },

    #[error("ledger entry not found: {0}")]
    NotFound(TransactionId),

    #[error("ledger state lock poisoned")]
    StatePoisoned,
}
