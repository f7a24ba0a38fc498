//! High-level SDK for the Cellkom Installment Ledger.
//!
//! The main entry point for application code embedding CIL: the sale and
//! service transaction workflows open entries and collect payments through
//! [`Cashier`]; UI views and report generators read and subscribe.

pub mod cashier;
pub mod error;

pub use cashier::Cashier;
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use cil_ledger::{
    ChangeFilter, ChangeKind, ChangeStream, EntryDraft, LedgerChange, LedgerEntry, Payment,
    ReceivablesSummary, SettlementStatus, Statement, StatementLine, StoreConfig,
};
pub use cil_types::{Amount, DebtKind, PaymentId, TransactionId};
