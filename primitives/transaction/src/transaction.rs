use ms_primitives::{Address, Coin};

use crate::attachment::Attachment;
use crate::codec;
use crate::error::TransactionError;

/// A transaction as consumed by the mempool core (spec §3).
///
/// Everything about the transaction's full on-chain semantics beyond what
/// the mempool and capability validator read is out of scope (spec §1);
/// this type carries exactly the fields spec §3 lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: u64,
    pub sender: Address,
    pub recipient: Address,
    pub amount: Coin,
    pub fee: Coin,
    pub timestamp: i64,
    /// Deadline in minutes; `expiration = timestamp + deadline * 60`.
    pub deadline: u32,
    pub version: u8,
    /// Economic-clustering anchor; `Some` iff `version >= 1`.
    pub ec_block: Option<EcBlock>,
    pub attachment: Attachment,
    pub signature: Vec<u8>,
    /// Canonical wire encoding. `id` is derived from these bytes.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlock {
    pub height: u32,
    pub id: u64,
}

impl Transaction {
    /// Builds a transaction from its constituent fields, producing the
    /// canonical `bytes` encoding and deriving `id` from it (spec §3:
    /// "`id` is derived from [bytes]").
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        sender: Address,
        recipient: Address,
        amount: Coin,
        fee: Coin,
        timestamp: i64,
        deadline: u32,
        version: u8,
        ec_block: Option<EcBlock>,
        attachment: Attachment,
        signature: Vec<u8>,
    ) -> Self {
        let bytes = codec::encode(
            sender, recipient, amount, fee, timestamp, deadline, version, ec_block, &attachment,
            &signature,
        );
        let id = codec::derive_id(&bytes);
        Transaction {
            id,
            sender,
            recipient,
            amount,
            fee,
            timestamp,
            deadline,
            version,
            ec_block,
            attachment,
            signature,
            bytes,
        }
    }

    /// Reparses a transaction from its canonical bytes (spec §4.3: "on
    /// load, the transaction is reparsed").
    pub fn parse(bytes: &[u8]) -> Result<Self, TransactionError> {
        codec::decode(bytes)
    }

    /// `expiration = timestamp + deadline * 60` (spec §3).
    pub fn expiration(&self) -> i64 {
        self.timestamp + (self.deadline as i64) * 60
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration() < now
    }

    /// The total the sender commits: `amount + fee`.
    pub fn total_value(&self) -> Coin {
        self.amount + self.fee
    }

    pub fn serialized_size(&self) -> usize {
        self.bytes.len()
    }
}
