use byteorder::ByteOrder;
use lmdb_zero as lmdb;
use lmdb_zero::traits::LmdbResultExt;

use crate::env::Environment;
use crate::error::StoreError;
use crate::row;

/// A scoped write transaction over the `unconfirmed_transaction` table.
///
/// Mirrors the `synchronized(blockchain) { db.begin(); ...; commit/rollback;
/// end }` idiom spec §9 calls out: dropping this guard without calling
/// [`commit`](Self::commit) rolls the underlying LMDB transaction back, so
/// every exit path — including an early return or a panic unwind — leaves
/// no partial mutation behind (spec I5).
pub struct WriteTransaction<'env> {
    inner: Option<lmdb::WriteTransaction<'env>>,
    env: &'env Environment,
}

impl<'env> WriteTransaction<'env> {
    pub(crate) fn new(env: &'env Environment) -> Result<Self, StoreError> {
        let inner = lmdb::WriteTransaction::new(env.env.clone())?;
        Ok(WriteTransaction {
            inner: Some(inner),
            env,
        })
    }

    /// Upserts a row by id (spec §4.3: `insert`). Also rewrites the
    /// `by_expiration` index entry so the sweeper's cursor stays accurate.
    pub fn put(&mut self, id: u64, expiration: i64, transaction_bytes: &[u8]) -> Result<(), StoreError> {
        self.delete(id)?;

        let txn = self.inner.as_mut().expect("transaction already finished");
        let mut access = txn.access();
        let key = row::id_key(id);
        let value = row::encode_row(expiration, transaction_bytes);
        access.put(&self.env.transactions, &key[..], &value, lmdb::put::Flags::empty())?;

        let exp_key = row::expiration_key(expiration);
        access.put(
            &self.env.by_expiration,
            &exp_key[..],
            &key[..],
            lmdb::put::Flags::empty(),
        )?;

        Ok(())
    }

    /// Removes a row by id (spec §4.3: `delete`), returning its
    /// `(expiration, transaction_bytes)` if it was present.
    pub fn delete(&mut self, id: u64) -> Result<Option<(i64, Vec<u8>)>, StoreError> {
        let txn = self.inner.as_mut().expect("transaction already finished");
        let mut access = txn.access();
        let key = row::id_key(id);

        let existing = match access.get::<_, [u8]>(&self.env.transactions, &key[..]).to_opt()? {
            Some(bytes) => match row::decode_row(bytes) {
                Some((expiration, tx_bytes)) => Some((expiration, tx_bytes.to_vec())),
                None => {
                    return Err(StoreError::CorruptRow {
                        id,
                        reason: "row shorter than expiration prefix".into(),
                    })
                }
            },
            None => None,
        };

        if let Some((expiration, _)) = existing {
            access.del_key(&self.env.transactions, &key[..]).ignore_missing()?;

            let exp_key = row::expiration_key(expiration);
            access
                .del_item(&self.env.by_expiration, &exp_key[..], &key[..])
                .ignore_missing()?;
        }

        Ok(existing)
    }

    /// Deletes every row with `expiration < now`, streaming through the
    /// `by_expiration` index so memory use stays bounded regardless of how
    /// many rows have expired (spec §4.3: "stream-delete to bound memory").
    pub fn sweep_expired(&mut self, now: i64) -> Result<Vec<(u64, i64, Vec<u8>)>, StoreError> {
        let mut removed = Vec::new();
        let ids: Vec<u64> = {
            let txn = self.inner.as_ref().expect("transaction already finished");
            let access = txn.access();
            let mut cursor = txn.cursor(self.env.by_expiration.clone())?;
            let mut ids = Vec::new();
            let mut entry: Result<(&[u8], &[u8]), lmdb::Error> = cursor.first(&access);
            loop {
                match entry {
                    Ok((exp_key, id_key)) => {
                        let expiration = byteorder::BigEndian::read_i32(exp_key) as i64;
                        if expiration >= now as i32 as i64 {
                            break;
                        }
                        ids.push(byteorder::BigEndian::read_u64(id_key));
                        entry = cursor.next(&access);
                    }
                    Err(lmdb::Error::Code(lmdb::error::NOTFOUND)) => break,
                    Err(e) => return Err(StoreError::Lmdb(e)),
                }
            }
            ids
        };

        for id in ids {
            if let Some((expiration, bytes)) = self.delete(id)? {
                removed.push((id, expiration, bytes));
            }
        }

        Ok(removed)
    }

    /// Commits the transaction. Consumes `self` so a commit can only happen
    /// once and the drop-rollback guard never double-fires.
    pub fn commit(mut self) -> Result<(), StoreError> {
        let inner = self.inner.take().expect("transaction already finished");
        inner.commit()?;
        Ok(())
    }
}

impl<'env> Drop for WriteTransaction<'env> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            log::trace!("rolling back uncommitted unconfirmed_transaction write");
        }
        // Dropping `lmdb::WriteTransaction` without calling `commit` aborts
        // it; nothing further to do here, but the `Option` dance above
        // keeps `commit(self)` from running a transaction twice.
    }
}
