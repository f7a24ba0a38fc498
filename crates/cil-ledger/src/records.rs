use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cil_types::{Amount, DebtKind, PaymentId, TransactionId};

use crate::error::LedgerError;

/// One payment applied to a ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Amount,
    pub received_at: DateTime<Utc>,
}

/// Settlement state derived from the running balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementStatus {
    /// Part of the debt is still owed.
    Outstanding,
    /// The full debt has been paid.
    Settled,
}

impl SettlementStatus {
    /// Returns `true` if settled.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Outstanding => "Outstanding",
            Self::Settled => "Settled",
        };
        write!(f, "{s}")
    }
}

/// Creation input supplied by the sale/service transaction workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Identifier of the originating transaction.
    pub id: TransactionId,
    /// Whether the debt came from a sale or a service transaction.
    pub kind: DebtKind,
    /// Customer display label; informational only.
    pub customer: String,
    /// When the originating transaction was finalized.
    pub opened_at: DateTime<Utc>,
    /// The original debt.
    pub total: Amount,
    /// Amount paid at the counter when the transaction was finalized.
    pub down_payment: Amount,
    /// Free-text description of the transaction.
    pub note: String,
}

/// The record of one debt (a sale or service transaction paid partially).
///
/// `id`, `kind`, `customer`, `opened_at`, `total`, and `note` are fixed at
/// creation. `paid`, `remaining`, `status`, and `payments` change only
/// through [`LedgerEntry::with_payment`]; the history is append-only and
/// entries are never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: TransactionId,
    pub kind: DebtKind,
    pub customer: String,
    pub opened_at: DateTime<Utc>,
    pub total: Amount,
    pub paid: Amount,
    pub remaining: Amount,
    pub status: SettlementStatus,
    pub payments: Vec<Payment>,
    pub note: String,
}

/// Derive the remaining balance and settlement status for a debt.
///
/// The single derivation point: entry creation and payment application both
/// go through here, so `paid + remaining == total` (post-clamp) holds by
/// construction. Remaining debt is clamped at zero; an overpaid entry reads
/// as settled, never negative.
pub fn settlement(total: Amount, paid: Amount) -> (Amount, SettlementStatus) {
    let remaining = total.sub_or_zero(paid);
    let status = if remaining.is_zero() {
        SettlementStatus::Settled
    } else {
        SettlementStatus::Outstanding
    };
    (remaining, status)
}

impl LedgerEntry {
    /// Open a new entry from a draft.
    ///
    /// The down payment is recorded in the payment history even when zero,
    /// so the history explains the paid total from the moment of creation.
    /// A down payment above the total is accepted; the surplus shows in
    /// `paid` while `remaining` clamps to zero.
    pub fn open(draft: EntryDraft, recorded_at: DateTime<Utc>) -> Result<Self, LedgerError> {
        if draft.total.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: draft.total,
                reason: "total must not be negative".into(),
            });
        }
        if draft.down_payment.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: draft.down_payment,
                reason: "down payment must not be negative".into(),
            });
        }

        let paid = draft.down_payment;
        let (remaining, status) = settlement(draft.total, paid);

        Ok(Self {
            id: draft.id,
            kind: draft.kind,
            customer: draft.customer,
            opened_at: draft.opened_at,
            total: draft.total,
            paid,
            remaining,
            status,
            payments: vec![Payment {
                id: PaymentId::new(),
                amount: draft.down_payment,
                received_at: recorded_at,
            }],
            note: draft.note,
        })
    }

    /// Apply one payment, returning the updated entry.
    ///
    /// Pure with respect to `self`: the caller decides whether the result
    /// replaces the stored record, so the balance update and the history
    /// append are one value and cannot be observed apart. Overpayment is
    /// accepted: the full amount lands in `paid` and in the history while
    /// `remaining` stays clamped at zero.
    pub fn with_payment(
        &self,
        amount: Amount,
        received_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "payment must be positive".into(),
            });
        }

        let paid = self
            .paid
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidAmount {
                amount,
                reason: "paid total would overflow".into(),
            })?;
        let (remaining, status) = settlement(self.total, paid);

        let mut updated = self.clone();
        updated.paid = paid;
        updated.remaining = remaining;
        updated.status = status;
        updated.payments.push(Payment {
            id: PaymentId::new(),
            amount,
            received_at,
        });
        Ok(updated)
    }

    /// Sum of all recorded payments; `None` if the sum overflows.
    pub fn payments_total(&self) -> Option<Amount> {
        self.payments
            .iter()
            .try_fold(Amount::ZERO, |acc, payment| acc.checked_add(payment.amount))
    }

    /// Returns `true` if the debt is fully paid.
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}
