use chrono::{DateTime, Utc};

use cil_types::{Amount, DebtKind, TransactionId};

use crate::error::LedgerError;
use crate::records::{LedgerEntry, SettlementStatus};
use crate::traits::LedgerRead;

/// Per-kind receivables totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindTotals {
    pub entry_count: u64,
    pub outstanding_total: Amount,
}

/// Aggregate receivables position across the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivablesSummary {
    pub entry_count: u64,
    pub settled_count: u64,
    pub outstanding_count: u64,
    pub billed_total: Amount,
    pub collected_total: Amount,
    pub outstanding_total: Amount,
    pub sales: KindTotals,
    pub services: KindTotals,
}

/// One line of a payment statement: a payment and the balance after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementLine {
    pub seq: u64,
    pub received_at: DateTime<Utc>,
    pub amount: Amount,
    pub balance_after: Amount,
}

/// Payment timeline for one entry, with running balances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub id: TransactionId,
    pub customer: String,
    pub kind: DebtKind,
    pub opened_at: DateTime<Utc>,
    pub total: Amount,
    pub lines: Vec<StatementLine>,
    pub closing_balance: Amount,
    pub status: SettlementStatus,
}

/// Deterministic report projections over any ledger reader.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Aggregate receivables position for dashboards.
    pub fn receivables<R: LedgerRead>(reader: &R) -> Result<ReceivablesSummary, LedgerError> {
        let entries = reader.entries()?;

        let mut summary = ReceivablesSummary {
            entry_count: entries.len() as u64,
            settled_count: 0,
            outstanding_count: 0,
            billed_total: Amount::ZERO,
            collected_total: Amount::ZERO,
            outstanding_total: Amount::ZERO,
            sales: KindTotals::default(),
            services: KindTotals::default(),
        };

        for entry in &entries {
            if entry.is_settled() {
                summary.settled_count += 1;
            } else {
                summary.outstanding_count += 1;
            }
            summary.billed_total = summary.billed_total.saturating_add(entry.total);
            summary.collected_total = summary.collected_total.saturating_add(entry.paid);
            summary.outstanding_total = summary.outstanding_total.saturating_add(entry.remaining);

            let kind_totals = match entry.kind {
                DebtKind::Sale => &mut summary.sales,
                DebtKind::Service => &mut summary.services,
            };
            kind_totals.entry_count += 1;
            kind_totals.outstanding_total =
                kind_totals.outstanding_total.saturating_add(entry.remaining);
        }

        Ok(summary)
    }

    /// Payment timeline for one entry, for receipts and customer views.
    pub fn statement<R: LedgerRead>(
        reader: &R,
        id: &TransactionId,
    ) -> Result<Statement, LedgerError> {
        let entry = reader
            .entry(id)?
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        let mut running_paid = Amount::ZERO;
        let lines = entry
            .payments
            .iter()
            .enumerate()
            .map(|(index, payment)| {
                running_paid = running_paid.saturating_add(payment.amount);
                StatementLine {
                    seq: (index + 1) as u64,
                    received_at: payment.received_at,
                    amount: payment.amount,
                    balance_after: entry.total.sub_or_zero(running_paid),
                }
            })
            .collect();

        Ok(Statement {
            id: entry.id.clone(),
            customer: entry.customer.clone(),
            kind: entry.kind,
            opened_at: entry.opened_at,
            total: entry.total,
            lines,
            closing_balance: entry.remaining,
            status: entry.status,
        })
    }
}
