use thiserror::Error;

/// Corresponds to spec §7's `StorageFailure`: wraps the underlying
/// storage-layer error. Every storage mutation in this crate rolls back and
/// returns this type; callers never see a partially-committed transaction.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lmdb error: {0}")]
    Lmdb(#[from] lmdb_zero::Error),

    #[error("corrupted row for unconfirmed transaction {id}: {reason}")]
    CorruptRow { id: u64, reason: String },
}
