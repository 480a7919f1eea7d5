use std::fmt;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

/// An account identifier.
///
/// The Monetary System operates on plain numeric account ids (spec §3:
/// `sender_id`, `recipient_id`, `account_id`), unlike the teacher's 20-byte
/// `nimiq_keys::Address`. Kept as a thin newtype, the way the teacher wraps
/// its own address type, so call sites read `Address` rather than `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Address(u64);

impl Address {
    pub const fn from_u64(id: u64) -> Self {
        Address(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Address {
    fn from(id: u64) -> Self {
        Address(id)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
