use thiserror::Error;

use ms_database::StoreError;
use ms_transaction::{TransactionError, ValidationError};

use crate::blockchain::BlockchainError;

/// Errors the processor and workers can raise (spec §7).
///
/// `Storage`/`Blockchain` wrap `StorageFailure`; `Validation` carries the
/// `NotValid`/`NotCurrentlyValid`/`NotYetEnabled` taxonomy through unchanged;
/// `Fatal` is an unexpected internal invariant break that should terminate
/// the owning worker (spec §7: "the process exits with a diagnostic").
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("blockchain interface failure: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("malformed transaction: {0}")]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fatal mempool invariant violated: {0}")]
    Fatal(String),
}

impl ProcessorError {
    /// Whether this error should be silently absorbed by the peer-batch path
    /// rather than propagated to blacklist the peer (spec §7).
    pub fn is_transient(&self) -> bool {
        match self {
            ProcessorError::Validation(v) => v.is_transient(),
            _ => false,
        }
    }
}
