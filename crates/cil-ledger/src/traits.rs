use cil_types::{Amount, TransactionId};

use crate::error::LedgerError;
use crate::records::{EntryDraft, LedgerEntry};

/// Write boundary for ledger mutations.
pub trait LedgerWrite: Send + Sync {
    /// Open a new entry, or return the existing one unchanged when the id
    /// is already present (idempotent creation).
    fn open_entry(&self, draft: EntryDraft) -> Result<LedgerEntry, LedgerError>;

    /// Apply a payment to an existing entry and return the updated record.
    fn apply_payment(
        &self,
        id: &TransactionId,
        amount: Amount,
    ) -> Result<LedgerEntry, LedgerError>;
}

/// Read boundary for ledger queries, audits, and report building.
pub trait LedgerRead: Send + Sync {
    /// Look up one entry. Absence is not an error.
    fn entry(&self, id: &TransactionId) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Snapshot of all entries, in insertion order.
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Snapshot of the unsettled entries, in insertion order.
    fn outstanding(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    fn entry_count(&self) -> Result<u64, LedgerError>;
}
