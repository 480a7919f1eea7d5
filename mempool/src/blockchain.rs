use thiserror::Error;

use ms_primitives::Address;
use ms_transaction::{Currency, Transaction};

/// The confirmed-ledger lookups the capability and naming validators need
/// (spec §4.2: "Duplicate against active registry").
///
/// Kept separate from [`Blockchain`] the way the teacher keeps
/// `AbstractBlockchain` narrow: the capability validator only ever reads
/// currencies, never mutates the chain.
pub trait CurrencyRegistry: Send + Sync {
    fn get_currency(&self, id: u64) -> Option<Currency>;
    fn find_currency_by_name(&self, normalized_name: &str) -> Option<Currency>;
    fn find_currency_by_code(&self, code: &str) -> Option<Currency>;
}

#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("blockchain interface failed: {0}")]
    Internal(String),
}

/// The external consensus engine's interface, as far as the mempool core
/// depends on it (spec §1: "the block/consensus engine ... only their
/// interface is referenced"). Not a consensus implementation.
pub trait Blockchain: CurrencyRegistry + Send + Sync {
    /// Current confirmed chain height.
    fn height(&self) -> u32;

    /// Whether the chain is still syncing/downloading (spec §4.6: "the
    /// chain is still downloading").
    fn is_syncing(&self) -> bool;

    /// Whether `id` is already in a confirmed block.
    fn contains_confirmed(&self, id: u64) -> bool;

    fn account_exists(&self, address: Address) -> bool;

    /// Verifies `tx`'s signature against its sender's public key.
    fn verify_signature(&self, tx: &Transaction) -> bool;

    /// Speculatively applies `tx`'s unconfirmed state (balance debits,
    /// reservations, ...). Returns `false` on insufficient funds / double
    /// spend rather than erroring (spec §4.6: "boolean (false means
    /// double-spend / insufficient funds)").
    fn apply_unconfirmed(&self, tx: &Transaction) -> Result<bool, BlockchainError>;

    /// Reverses a previously applied unconfirmed state (spec §4.6,
    /// `undo_unconfirmed`).
    fn undo_unconfirmed(&self, tx: &Transaction) -> Result<(), BlockchainError>;

    /// Reverses a transaction's *confirmed* application, as part of a block
    /// rollback (spec §4.6 `on_block_undone`: "call `undo()` (external)").
    fn undo_confirmed(&self, tx: &Transaction) -> Result<(), BlockchainError>;
}
