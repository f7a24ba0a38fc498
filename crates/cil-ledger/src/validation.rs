use cil_types::TransactionId;

use crate::error::LedgerError;
use crate::records::{settlement, LedgerEntry};
use crate::traits::LedgerRead;

/// Result of auditing one ledger entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub id: TransactionId,
    pub payment_count: u64,
    pub amounts_conserved: bool,
    pub history_sum_matches: bool,
    pub status_consistent: bool,
    pub history_ordered: bool,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if all checks passed.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific bookkeeping violation detected during an audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    ConservationBreak,
    NegativeRemaining,
    HistorySumMismatch,
    StatusMismatch,
    UnorderedHistory,
}

/// Bookkeeping invariant auditor.
///
/// Re-checks, against any reader, what the record layer guarantees by
/// construction: conservation of amounts, the history explaining the paid
/// total, and the settlement status matching the balance. Useful as a
/// sweep over state that crossed a process or persistence boundary.
pub struct LedgerAudit;

impl LedgerAudit {
    /// Audit a single entry against every bookkeeping invariant.
    pub fn audit_entry(entry: &LedgerEntry) -> AuditReport {
        let mut violations = Vec::new();
        let mut amounts_conserved = true;
        let mut history_sum_matches = true;
        let mut status_consistent = true;
        let mut history_ordered = true;

        let (expected_remaining, expected_status) = settlement(entry.total, entry.paid);

        if entry.remaining != expected_remaining {
            amounts_conserved = false;
            violations.push(Violation {
                kind: ViolationKind::ConservationBreak,
                description: format!(
                    "remaining {} does not match derived {}",
                    entry.remaining, expected_remaining
                ),
            });
        }

        if entry.remaining.is_negative() {
            amounts_conserved = false;
            violations.push(Violation {
                kind: ViolationKind::NegativeRemaining,
                description: format!("remaining balance {} is negative", entry.remaining),
            });
        }

        if entry.status != expected_status {
            status_consistent = false;
            violations.push(Violation {
                kind: ViolationKind::StatusMismatch,
                description: format!(
                    "status {} does not match balance-derived {}",
                    entry.status, expected_status
                ),
            });
        }

        match entry.payments_total() {
            Some(sum) if sum == entry.paid => {}
            Some(sum) => {
                history_sum_matches = false;
                violations.push(Violation {
                    kind: ViolationKind::HistorySumMismatch,
                    description: format!(
                        "payment history sums to {} but paid total is {}",
                        sum, entry.paid
                    ),
                });
            }
            None => {
                history_sum_matches = false;
                violations.push(Violation {
                    kind: ViolationKind::HistorySumMismatch,
                    description: "payment history sum overflows".into(),
                });
            }
        }

        for pair in entry.payments.windows(2) {
            if pair[1].received_at < pair[0].received_at {
                history_ordered = false;
                violations.push(Violation {
                    kind: ViolationKind::UnorderedHistory,
                    description: format!(
                        "payment {} received before its predecessor",
                        pair[1].id
                    ),
                });
                break;
            }
        }

        AuditReport {
            id: entry.id.clone(),
            payment_count: entry.payments.len() as u64,
            amounts_conserved,
            history_sum_matches,
            status_consistent,
            history_ordered,
            violations,
        }
    }

    /// Audit every entry visible through the reader.
    pub fn audit_all<R: LedgerRead>(reader: &R) -> Result<Vec<AuditReport>, LedgerError> {
        Ok(reader.entries()?.iter().map(Self::audit_entry).collect())
    }
}
