use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::debug;

use cil_types::{Amount, TransactionId};

use crate::error::LedgerError;
use crate::feed::{ChangeFilter, ChangeKind, ChangeRouter, ChangeStream, LedgerChange};
use crate::records::{EntryDraft, LedgerEntry};
use crate::traits::{LedgerRead, LedgerWrite};

/// Configuration for the in-memory ledger store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// In-memory ledger store: the single source of truth for one session.
///
/// Construct one instance per application session (or per test); state is
/// owned by the instance, never process-wide. Every mutation runs under one
/// write-lock acquisition — lookup, payment application, write-back, and
/// change routing included — so a read-modify-write cycle is atomic and
/// observers only ever see fully applied states.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    router: ChangeRouter,
    config: StoreConfig,
}

#[derive(Default)]
struct LedgerState {
    entries: HashMap<TransactionId, LedgerEntry>,
    /// Insertion order; keeps snapshots stable for a given store state.
    order: Vec<TransactionId>,
}

impl LedgerState {
    fn snapshot(&self) -> Vec<LedgerEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect()
    }
}

impl InMemoryLedger {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            router: ChangeRouter::new(),
            config,
        }
    }

    /// Subscribe to changes matching the given filter.
    ///
    /// Each routed change carries a fresh snapshot of the store. Dropping
    /// the returned stream unsubscribes.
    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeStream {
        self.router.subscribe(filter, self.config.channel_capacity)
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::StatePoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::StatePoisoned)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl LedgerWrite for InMemoryLedger {
    fn open_entry(&self, draft: EntryDraft) -> Result<LedgerEntry, LedgerError> {
        let mut state = self.write_state()?;

        if let Some(existing) = state.entries.get(&draft.id) {
            // Idempotent creation: nothing mutated, nothing routed.
            debug!(id = %existing.id, "duplicate entry open ignored");
            return Ok(existing.clone());
        }

        let entry = LedgerEntry::open(draft, Utc::now())?;
        state.order.push(entry.id.clone());
        state.entries.insert(entry.id.clone(), entry.clone());

        let change = LedgerChange {
            kind: ChangeKind::EntryOpened,
            entry: entry.clone(),
            snapshot: state.snapshot(),
            at: Utc::now(),
        };
        self.router.route(&change);
        debug!(id = %entry.id, total = %entry.total, remaining = %entry.remaining, "entry opened");

        Ok(entry)
    }

    fn apply_payment(
        &self,
        id: &TransactionId,
        amount: Amount,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut state = self.write_state()?;

        let current = state
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        let updated = current.with_payment(amount, Utc::now())?;
        state.entries.insert(id.clone(), updated.clone());

        let change = LedgerChange {
            kind: ChangeKind::PaymentApplied,
            entry: updated.clone(),
            snapshot: state.snapshot(),
            at: Utc::now(),
        };
        self.router.route(&change);
        debug!(
            id = %updated.id,
            amount = %amount,
            remaining = %updated.remaining,
            status = %updated.status,
            "payment applied"
        );

        Ok(updated)
    }
}

impl LedgerRead for InMemoryLedger {
    fn entry(&self, id: &TransactionId) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.read_state()?.entries.get(id).cloned())
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.read_state()?.snapshot())
    }

    fn outstanding(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .read_state()?
            .snapshot()
            .into_iter()
            .filter(|entry| !entry.is_settled())
            .collect())
    }

    fn entry_count(&self) -> Result<u64, LedgerError> {
        Ok(self.read_state()?.entries.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_types::DebtKind;

    use crate::records::SettlementStatus;

    fn draft(id: &str, total: i64, down_payment: i64) -> EntryDraft {
        EntryDraft {
            id: TransactionId::new(id),
            kind: DebtKind::Sale,
            customer: "Budi Santoso".into(),
            opened_at: Utc::now(),
            total: Amount::new(total),
            down_payment: Amount::new(down_payment),
            note: "iPhone 12 bekas".into(),
        }
    }

    #[test]
    fn partial_debt_settles_over_two_payments() {
        let store = InMemoryLedger::default();
        let id = TransactionId::new("TRX-0001");

        let entry = store.open_entry(draft("TRX-0001", 850_000, 300_000)).unwrap();
        assert_eq!(entry.remaining, Amount::new(550_000));
        assert_eq!(entry.status, SettlementStatus::Outstanding);

        let settled = store.apply_payment(&id, Amount::new(550_000)).unwrap();
        assert_eq!(settled.remaining, Amount::ZERO);
        assert_eq!(settled.status, SettlementStatus::Settled);
        assert_eq!(settled.payments.len(), 2);
        assert_eq!(settled.payments_total().unwrap(), Amount::new(850_000));
    }

    #[test]
    fn duplicate_open_is_a_noop() {
        let store = InMemoryLedger::default();
        let mut stream = store.subscribe(ChangeFilter::default());

        let first = store.open_entry(draft("TRX-0001", 850_000, 300_000)).unwrap();
        assert_eq!(stream.try_recv().unwrap().kind, ChangeKind::EntryOpened);

        // Same id again, different payload: first creation wins.
        let second = store.open_entry(draft("TRX-0001", 999_999, 0)).unwrap();
        assert_eq!(second, first);
        assert_eq!(store.entry_count().unwrap(), 1);
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn overpayment_clamps_remaining_not_history() {
        let store = InMemoryLedger::default();
        let id = TransactionId::new("TRX-0002");
        store.open_entry(draft("TRX-0002", 100_000, 0)).unwrap();

        let entry = store.apply_payment(&id, Amount::new(150_000)).unwrap();
        assert_eq!(entry.paid, Amount::new(150_000));
        assert_eq!(entry.remaining, Amount::ZERO);
        assert_eq!(entry.status, SettlementStatus::Settled);
        assert_eq!(entry.payments[1].amount, Amount::new(150_000));
    }

    #[test]
    fn non_positive_payments_leave_entry_unchanged() {
        let store = InMemoryLedger::default();
        let id = TransactionId::new("TRX-0003");
        let before = store.open_entry(draft("TRX-0003", 100_000, 25_000)).unwrap();

        for bad in [0, -500] {
            let error = store.apply_payment(&id, Amount::new(bad)).unwrap_err();
            assert!(matches!(error, LedgerError::InvalidAmount { .. }));
        }
        assert_eq!(store.entry(&id).unwrap().unwrap(), before);
    }

    #[test]
    fn payment_against_unknown_id_routes_nothing() {
        let store = InMemoryLedger::default();
        store.open_entry(draft("TRX-0004", 100_000, 0)).unwrap();
        let mut stream = store.subscribe(ChangeFilter::default());

        let missing = TransactionId::new("nonexistent-id");
        let error = store.apply_payment(&missing, Amount::new(1_000)).unwrap_err();
        assert_eq!(error, LedgerError::NotFound(missing));
        assert_eq!(store.entry_count().unwrap(), 1);
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn negative_total_is_rejected() {
        let store = InMemoryLedger::default();
        let error = store.open_entry(draft("TRX-0005", -1, 0)).unwrap_err();
        assert!(matches!(error, LedgerError::InvalidAmount { .. }));
        assert_eq!(store.entry_count().unwrap(), 0);
    }

    #[test]
    fn subscriber_receives_fresh_snapshots() {
        let store = InMemoryLedger::default();
        let mut stream = store.subscribe(ChangeFilter::default());

        store.open_entry(draft("TRX-0006", 200_000, 50_000)).unwrap();
        let opened = stream.try_recv().unwrap();
        assert_eq!(opened.kind, ChangeKind::EntryOpened);
        assert_eq!(opened.snapshot.len(), 1);

        let id = TransactionId::new("TRX-0006");
        store.apply_payment(&id, Amount::new(150_000)).unwrap();
        let paid = stream.try_recv().unwrap();
        assert_eq!(paid.kind, ChangeKind::PaymentApplied);
        assert_eq!(paid.snapshot[0].remaining, Amount::ZERO);
        assert_eq!(paid.snapshot[0].status, SettlementStatus::Settled);
    }

    #[test]
    fn filtered_subscriber_sees_only_its_entry() {
        let store = InMemoryLedger::default();
        let mut stream = store.subscribe(ChangeFilter {
            ids: Some(vec![TransactionId::new("TRX-B")]),
            ..Default::default()
        });

        store.open_entry(draft("TRX-A", 100_000, 0)).unwrap();
        store.open_entry(draft("TRX-B", 100_000, 0)).unwrap();

        let change = stream.try_recv().unwrap();
        assert_eq!(change.entry.id, TransactionId::new("TRX-B"));
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn snapshots_keep_insertion_order() {
        let store = InMemoryLedger::default();
        for id in ["TRX-3", "TRX-1", "TRX-2"] {
            store.open_entry(draft(id, 100_000, 0)).unwrap();
        }

        let ids: Vec<String> = store
            .entries()
            .unwrap()
            .iter()
            .map(|entry| entry.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["TRX-3", "TRX-1", "TRX-2"]);
    }

    #[test]
    fn outstanding_excludes_settled_entries() {
        let store = InMemoryLedger::default();
        store.open_entry(draft("TRX-OPEN", 100_000, 40_000)).unwrap();
        store.open_entry(draft("TRX-DONE", 100_000, 100_000)).unwrap();

        let outstanding = store.outstanding().unwrap();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].id, TransactionId::new("TRX-OPEN"));
    }

    #[test]
    fn concurrent_payments_are_serialized() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryLedger::default());
        let id = TransactionId::new("TRX-CONC");
        store.open_entry(draft("TRX-CONC", 100_000, 0)).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..25 {
                    store.apply_payment(&id, Amount::new(1_000)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let entry = store.entry(&id).unwrap().unwrap();
        assert_eq!(entry.paid, Amount::new(100_000));
        assert_eq!(entry.remaining, Amount::ZERO);
        assert_eq!(entry.status, SettlementStatus::Settled);
        // Down payment plus one hundred installments.
        assert_eq!(entry.payments.len(), 101);
        assert_eq!(entry.payments_total().unwrap(), entry.paid);
    }
}
