use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use cil_types::TransactionId;

use crate::records::LedgerEntry;

/// Classification of ledger changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A new entry has been opened.
    EntryOpened,
    /// A payment has been applied to an entry.
    PaymentApplied,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EntryOpened => "EntryOpened",
            Self::PaymentApplied => "PaymentApplied",
        };
        write!(f, "{s}")
    }
}

/// A single change notification.
///
/// Carries the touched entry plus a fresh snapshot of the whole store, so
/// observers can re-render without a follow-up read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerChange {
    pub kind: ChangeKind,
    pub entry: LedgerEntry,
    pub snapshot: Vec<LedgerEntry>,
    pub at: DateTime<Utc>,
}

/// Filter for subscribing to a subset of ledger changes.
#[derive(Clone, Debug, Default)]
pub struct ChangeFilter {
    /// If set, only changes touching these entries are delivered.
    pub ids: Option<Vec<TransactionId>>,
    /// If set, only changes of these kinds are delivered.
    pub kinds: Option<Vec<ChangeKind>>,
}

impl ChangeFilter {
    /// Returns `true` if the given change matches this filter.
    pub fn matches(&self, change: &LedgerChange) -> bool {
        if let Some(ref ids) = self.ids {
            if !ids.contains(&change.entry.id) {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&change.kind) {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for ledger changes.
///
/// Dropping the stream unsubscribes; the router prunes closed subscribers
/// on the next routed change.
pub type ChangeStream = broadcast::Receiver<LedgerChange>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: ChangeFilter,
    sender: broadcast::Sender<LedgerChange>,
}

/// Fan-out router that delivers changes to matching subscribers.
pub(crate) struct ChangeRouter {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl ChangeRouter {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a new subscriber with the given filter.
    /// Returns a broadcast receiver for the matching changes.
    pub(crate) fn subscribe(&self, filter: ChangeFilter, capacity: usize) -> ChangeStream {
        let (tx, rx) = broadcast::channel(capacity);
        let sub = Subscriber { filter, sender: tx };
        self.subscribers
            .write()
            .expect("feed lock poisoned")
            .push(sub);
        rx
    }

    /// Route a change to all matching subscribers.
    /// Subscribers whose channels are closed are pruned.
    pub(crate) fn route(&self, change: &LedgerChange) {
        let mut subs = self.subscribers.write().expect("feed lock poisoned");
        subs.retain(|sub| {
            if sub.filter.matches(change) {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(change.clone()).is_ok()
            } else {
                // Keep non-matching subscribers; they may match future
                // changes. Only prune if the channel itself is closed.
                sub.sender.receiver_count() > 0
            }
        });
    }

    /// Number of active subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("feed lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_types::{Amount, DebtKind};

    use crate::records::{EntryDraft, LedgerEntry};

    fn entry(id: &str) -> LedgerEntry {
        LedgerEntry::open(
            EntryDraft {
                id: TransactionId::new(id),
                kind: DebtKind::Service,
                customer: "Siti Rahma".into(),
                opened_at: Utc::now(),
                total: Amount::new(200_000),
                down_payment: Amount::new(50_000),
                note: "ganti LCD".into(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn change(kind: ChangeKind, id: &str) -> LedgerChange {
        let entry = entry(id);
        LedgerChange {
            kind,
            snapshot: vec![entry.clone()],
            entry,
            at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ChangeFilter::default();
        assert!(filter.matches(&change(ChangeKind::EntryOpened, "a")));
        assert!(filter.matches(&change(ChangeKind::PaymentApplied, "b")));
    }

    #[test]
    fn kind_filter_selects() {
        let filter = ChangeFilter {
            kinds: Some(vec![ChangeKind::PaymentApplied]),
            ..Default::default()
        };
        assert!(filter.matches(&change(ChangeKind::PaymentApplied, "a")));
        assert!(!filter.matches(&change(ChangeKind::EntryOpened, "a")));
    }

    #[test]
    fn id_filter_selects() {
        let filter = ChangeFilter {
            ids: Some(vec![TransactionId::new("a")]),
            ..Default::default()
        };
        assert!(filter.matches(&change(ChangeKind::EntryOpened, "a")));
        assert!(!filter.matches(&change(ChangeKind::EntryOpened, "b")));
    }

    #[test]
    fn router_delivers_to_matching_subscribers() {
        let router = ChangeRouter::new();
        let mut all = router.subscribe(ChangeFilter::default(), 16);
        let mut payments_only = router.subscribe(
            ChangeFilter {
                kinds: Some(vec![ChangeKind::PaymentApplied]),
                ..Default::default()
            },
            16,
        );
        assert_eq!(router.subscriber_count(), 2);

        router.route(&change(ChangeKind::EntryOpened, "a"));

        assert_eq!(all.try_recv().unwrap().kind, ChangeKind::EntryOpened);
        assert!(payments_only.try_recv().is_err());
    }

    #[test]
    fn dropped_subscriber_is_pruned_on_next_route() {
        let router = ChangeRouter::new();
        let stream = router.subscribe(ChangeFilter::default(), 16);
        assert_eq!(router.subscriber_count(), 1);

        drop(stream);
        router.route(&change(ChangeKind::EntryOpened, "a"));
        assert_eq!(router.subscriber_count(), 0);
    }
}
