use std::collections::HashMap;

use parking_lot::RwLock;

use ms_transaction::Transaction;

/// Concurrent map of transactions this node originated but has not yet seen
/// confirmed (spec §4.4, C5). Used only for gossip suppression and
/// rebroadcast; it never affects validation outcomes.
#[derive(Default)]
pub struct LocalOriginTracker {
    entries: RwLock<HashMap<u64, Transaction>>,
}

impl LocalOriginTracker {
    pub fn new() -> Self {
        LocalOriginTracker {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn put(&self, tx: Transaction) {
        self.entries.write().insert(tx.id, tx);
    }

    pub fn remove(&self, id: u64) -> Option<Transaction> {
        self.entries.write().remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// A point-in-time copy of every tracked transaction, for the
    /// rebroadcaster to iterate without holding the lock during peer I/O.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_primitives::{Address, Coin};
    use ms_transaction::Attachment;

    fn tx(id_seed: u64) -> Transaction {
        Transaction::build(
            Address::from_u64(id_seed),
            Address::from_u64(2),
            Coin::from_u64(10),
            Coin::from_u64(1),
            1_700_000_000 + id_seed as i64,
            60,
            1,
            None,
            Attachment::Ordinary,
            vec![],
        )
    }

    #[test]
    fn put_contains_remove_roundtrip() {
        let tracker = LocalOriginTracker::new();
        let t = tx(1);
        let id = t.id;
        tracker.put(t);
        assert!(tracker.contains(id));
        assert_eq!(tracker.snapshot().len(), 1);
        assert!(tracker.remove(id).is_some());
        assert!(!tracker.contains(id));
    }
}
