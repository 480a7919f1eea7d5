use std::path::Path;
use std::sync::Arc;

use byteorder::ByteOrder;
use lmdb_zero as lmdb;
use lmdb_zero::traits::LmdbResultExt;

use crate::error::StoreError;
use crate::row;
use crate::txn::WriteTransaction;

const TRANSACTIONS_DB: &str = "unconfirmed_transaction";
const BY_EXPIRATION_DB: &str = "unconfirmed_transaction_by_expiration";

/// The persistent `unconfirmed_transaction` table and its `expiration`
/// index (spec §4.3, §6), backed by LMDB the way `nimiq-database` wraps it
/// for the rest of the teacher's node.
pub struct Environment {
    pub(crate) env: Arc<lmdb::Environment<'static>>,
    pub(crate) transactions: Arc<lmdb::Database<'static>>,
    pub(crate) by_expiration: Arc<lmdb::Database<'static>>,
}

impl Environment {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(|e| StoreError::CorruptRow {
            id: 0,
            reason: format!("could not create data directory: {e}"),
        })?;

        let mut builder = lmdb::EnvBuilder::new()?;
        builder.set_maxdbs(2)?;
        // 1 GiB should comfortably outgrow any realistic mempool; LMDB maps
        // this lazily so it costs no real memory until used.
        builder.set_mapsize(1024 * 1024 * 1024)?;

        let env = unsafe { builder.open(path.to_str().unwrap_or("."), lmdb::open::Flags::empty(), 0o600)? };
        let env = Arc::new(env);

        let transactions = Arc::new(lmdb::Database::open(
            env.clone(),
            Some(TRANSACTIONS_DB),
            &lmdb::DatabaseOptions::new(lmdb::db::CREATE),
        )?);
        let by_expiration = Arc::new(lmdb::Database::open(
            env.clone(),
            Some(BY_EXPIRATION_DB),
            &lmdb::DatabaseOptions::new(lmdb::db::CREATE | lmdb::db::DUPSORT),
        )?);

        Ok(Environment {
            env,
            transactions,
            by_expiration,
        })
    }

    /// Opens a scoped write transaction combining the storage layer's
    /// begin/commit/rollback with guaranteed release on every exit path
    /// (spec §9, "Storage coupling"): dropping the guard without calling
    /// `commit` rolls back.
    pub fn begin_write(&self) -> Result<WriteTransaction<'_>, StoreError> {
        WriteTransaction::new(self)
    }

    /// Read-only lookup by id; does not require the blockchain mutex (spec
    /// §5: "Read-only mempool queries ... do not require the mutex").
    pub fn get(&self, id: u64) -> Result<Option<(i64, Vec<u8>)>, StoreError> {
        let txn = lmdb::ReadTransaction::new(self.env.clone())?;
        let access = txn.access();
        let key = row::id_key(id);
        match access.get::<_, [u8]>(&self.transactions, &key[..]).to_opt()? {
            Some(bytes) => match row::decode_row(bytes) {
                Some((expiration, tx_bytes)) => Ok(Some((expiration, tx_bytes.to_vec()))),
                None => Err(StoreError::CorruptRow {
                    id,
                    reason: "row shorter than expiration prefix".into(),
                }),
            },
            None => Ok(None),
        }
    }

    pub fn contains(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.get(id)?.is_some())
    }

    /// Streams every row in the table (spec §4.3: "finite, not restartable;
    /// holds resources, scoped").
    pub fn iter_all(&self) -> Result<UnconfirmedIter, StoreError> {
        let txn = lmdb::ReadTransaction::new(self.env.clone())?;
        UnconfirmedIter::new(txn, self.transactions.clone())
    }

    pub fn num_transactions(&self) -> Result<usize, StoreError> {
        let txn = lmdb::ReadTransaction::new(self.env.clone())?;
        let access = txn.access();
        let stat = access.db_stat(&self.transactions)?;
        Ok(stat.entries)
    }
}

/// A cursor-backed, scoped iterator over every stored row. Not restartable:
/// once exhausted (or dropped), the underlying read transaction ends.
pub struct UnconfirmedIter {
    txn: lmdb::ReadTransaction<'static>,
    db: Arc<lmdb::Database<'static>>,
    next_key: Option<[u8; 8]>,
    started: bool,
}

impl UnconfirmedIter {
    fn new(txn: lmdb::ReadTransaction<'static>, db: Arc<lmdb::Database<'static>>) -> Result<Self, StoreError> {
        Ok(UnconfirmedIter {
            txn,
            db,
            next_key: None,
            started: false,
        })
    }
}

impl Iterator for UnconfirmedIter {
    type Item = Result<(u64, i64, Vec<u8>), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let access = self.txn.access();
        let mut cursor = match self.txn.cursor(self.db.clone()) {
            Ok(cursor) => cursor,
            Err(e) => return Some(Err(StoreError::Lmdb(e))),
        };

        let entry: Result<(&[u8], &[u8]), lmdb::Error> = if !self.started {
            self.started = true;
            cursor.first(&access)
        } else {
            cursor.next(&access)
        };

        match entry {
            Ok((key, value)) => {
                if key.len() != 8 {
                    return Some(Err(StoreError::CorruptRow {
                        id: 0,
                        reason: "id key is not 8 bytes".into(),
                    }));
                }
                let id = byteorder::BigEndian::read_u64(key);
                match row::decode_row(value) {
                    Some((expiration, bytes)) => Some(Ok((id, expiration, bytes.to_vec()))),
                    None => Some(Err(StoreError::CorruptRow {
                        id,
                        reason: "row shorter than expiration prefix".into(),
                    })),
                }
            }
            Err(lmdb::Error::Code(lmdb::error::NOTFOUND)) => None,
            Err(e) => Some(Err(StoreError::Lmdb(e))),
        }
    }
}
