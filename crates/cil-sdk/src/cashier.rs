use chrono::Utc;

use cil_ledger::{
    ChangeFilter, ChangeStream, EntryDraft, InMemoryLedger, LedgerEntry, LedgerRead, LedgerWrite,
    ProjectionBuilder, ReceivablesSummary, Statement, StoreConfig,
};
use cil_types::{Amount, DebtKind, TransactionId};

use crate::error::{SdkError, SdkResult};

/// High-level installment desk API for the Cellkom.Store application.
///
/// Owns one in-memory ledger store per session. The sale and service
/// transaction workflows open entries here when a transaction is finalized
/// with a balance left to pay; UI views and report generators read and
/// subscribe. Entries are historical financial records and are never
/// deleted.
pub struct Cashier {
    ledger: InMemoryLedger,
}

impl Cashier {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            ledger: InMemoryLedger::new(config),
        }
    }

    /// Record a partially paid sale, stamped with the current time.
    pub fn open_sale(
        &self,
        id: impl Into<String>,
        customer: impl Into<String>,
        total: Amount,
        down_payment: Amount,
        note: impl Into<String>,
    ) -> SdkResult<LedgerEntry> {
        self.open(DebtKind::Sale, id, customer, total, down_payment, note)
    }

    /// Record a partially paid service transaction, stamped with the
    /// current time.
    pub fn open_service(
        &self,
        id: impl Into<String>,
        customer: impl Into<String>,
        total: Amount,
        down_payment: Amount,
        note: impl Into<String>,
    ) -> SdkResult<LedgerEntry> {
        self.open(DebtKind::Service, id, customer, total, down_payment, note)
    }

    /// Open from an explicit draft; the caller controls the transaction
    /// date.
    pub fn open_entry(&self, draft: EntryDraft) -> SdkResult<LedgerEntry> {
        if draft.id.as_str().trim().is_empty() {
            return Err(SdkError::BlankTransactionId);
        }
        Ok(self.ledger.open_entry(draft)?)
    }

    fn open(
        &self,
        kind: DebtKind,
        id: impl Into<String>,
        customer: impl Into<String>,
        total: Amount,
        down_payment: Amount,
        note: impl Into<String>,
    ) -> SdkResult<LedgerEntry> {
        self.open_entry(EntryDraft {
            id: TransactionId::new(id),
            kind,
            customer: customer.into(),
            opened_at: Utc::now(),
            total,
            down_payment,
            note: note.into(),
        })
    }

    /// Collect an installment payment against an entry.
    pub fn collect(&self, id: &TransactionId, amount: Amount) -> SdkResult<LedgerEntry> {
        Ok(self.ledger.apply_payment(id, amount)?)
    }

    /// Look up one entry. Absence is not an error.
    pub fn entry(&self, id: &TransactionId) -> SdkResult<Option<LedgerEntry>> {
        Ok(self.ledger.entry(id)?)
    }

    /// Snapshot of all entries, in insertion order.
    pub fn entries(&self) -> SdkResult<Vec<LedgerEntry>> {
        Ok(self.ledger.entries()?)
    }

    /// Snapshot of the unsettled entries.
    pub fn outstanding(&self) -> SdkResult<Vec<LedgerEntry>> {
        Ok(self.ledger.outstanding()?)
    }

    /// Aggregate receivables position for dashboards.
    pub fn receivables(&self) -> SdkResult<ReceivablesSummary> {
        Ok(ProjectionBuilder::receivables(&self.ledger)?)
    }

    /// Payment statement for one entry, for receipts and customer views.
    pub fn statement(&self, id: &TransactionId) -> SdkResult<Statement> {
        Ok(ProjectionBuilder::statement(&self.ledger, id)?)
    }

    /// Subscribe to store changes matching the filter.
    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeStream {
        self.ledger.subscribe(filter)
    }

    /// Borrow the underlying store for read-side composition.
    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }
}

impl Default for Cashier {
    fn default() -> Self {
        Self::new()
    }
}
