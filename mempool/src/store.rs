use std::path::Path;

use ms_database::{Environment, StoreError, WriteTransaction};
use ms_transaction::Transaction;

use crate::error::ProcessorError;

fn reparse(id: u64, bytes: &[u8]) -> Result<Transaction, ProcessorError> {
    Transaction::parse(bytes)
        .map_err(|e| ProcessorError::Fatal(format!("corrupt unconfirmed transaction {id:016x}: {e}")))
}

/// Persistent keyed set of unconfirmed transactions with an expiry index
/// (spec §4.3, C4). A thin reparsing wrapper over the raw-bytes storage
/// layer: `transaction_bytes` is opaque to the database crate, but every
/// read this type hands back is a fully reparsed [`Transaction`].
pub struct MempoolStore {
    env: Environment,
}

impl MempoolStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(MempoolStore {
            env: Environment::open(path)?,
        })
    }

    pub fn begin_write(&self) -> Result<WriteTransaction<'_>, StoreError> {
        self.env.begin_write()
    }

    /// Upsert by id (spec §4.3: "Must be called inside a storage
    /// transaction").
    pub fn insert(&self, txn: &mut WriteTransaction<'_>, tx: &Transaction) -> Result<(), StoreError> {
        txn.put(tx.id, tx.expiration(), &tx.bytes)
    }

    pub fn delete(&self, txn: &mut WriteTransaction<'_>, id: u64) -> Result<Option<Transaction>, ProcessorError> {
        match txn.delete(id)? {
            Some((_, bytes)) => Ok(Some(reparse(id, &bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, id: u64) -> Result<Option<Transaction>, ProcessorError> {
        match self.env.get(id)? {
            Some((_, bytes)) => Ok(Some(reparse(id, &bytes)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, id: u64) -> Result<bool, StoreError> {
        self.env.contains(id)
    }

    /// Finite, not restartable (spec §4.3): consumed in one pass.
    pub fn iter_all(&self) -> Result<impl Iterator<Item = Result<Transaction, ProcessorError>> + '_, StoreError> {
        let iter = self.env.iter_all()?;
        Ok(iter.map(|row| {
            let (id, _expiration, bytes) = row.map_err(ProcessorError::from)?;
            reparse(id, &bytes)
        }))
    }

    /// Deletes every row with `expiration < now`, streaming through the
    /// expiration index to bound memory (spec §4.3).
    pub fn sweep_expired(&self, txn: &mut WriteTransaction<'_>, now: i64) -> Result<Vec<Transaction>, ProcessorError> {
        txn.sweep_expired(now)?
            .into_iter()
            .map(|(id, _expiration, bytes)| reparse(id, &bytes))
            .collect()
    }

    /// No-op: the mempool is not height-versioned (spec §4.3).
    pub fn rollback(&self, _height: u32) {}

    pub fn num_transactions(&self) -> Result<usize, StoreError> {
        self.env.num_transactions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_primitives::{Address, Coin};
    use ms_transaction::Attachment;

    fn tx(timestamp: i64, deadline: u32) -> Transaction {
        Transaction::build(
            Address::from_u64(1),
            Address::from_u64(2),
            Coin::from_u64(10),
            Coin::from_u64(1),
            timestamp,
            deadline,
            1,
            None,
            Attachment::Ordinary,
            vec![],
        )
    }

    #[test]
    fn insert_get_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MempoolStore::open(dir.path()).unwrap();
        let t = tx(1_700_000_000, 60);

        let mut txn = store.begin_write().unwrap();
        store.insert(&mut txn, &t).unwrap();
        txn.commit().unwrap();

        assert!(store.contains(t.id).unwrap());
        let loaded = store.get(t.id).unwrap().unwrap();
        assert_eq!(loaded, t);

        let mut txn = store.begin_write().unwrap();
        let removed = store.delete(&mut txn, t.id).unwrap().unwrap();
        txn.commit().unwrap();
        assert_eq!(removed, t);
        assert!(!store.contains(t.id).unwrap());
    }

    #[test]
    fn sweep_expired_only_removes_past_expirations() {
        let dir = tempfile::tempdir().unwrap();
        let store = MempoolStore::open(dir.path()).unwrap();
        let expired = tx(1_000, 0);
        let live = tx(1_000_000_000, 60);

        let mut txn = store.begin_write().unwrap();
        store.insert(&mut txn, &expired).unwrap();
        store.insert(&mut txn, &live).unwrap();
        txn.commit().unwrap();

        let mut txn = store.begin_write().unwrap();
        let removed = store.sweep_expired(&mut txn, 500_000_000).unwrap();
        txn.commit().unwrap();

        assert_eq!(removed, vec![expired.clone()]);
        assert!(!store.contains(expired.id).unwrap());
        assert!(store.contains(live.id).unwrap());
    }
}
