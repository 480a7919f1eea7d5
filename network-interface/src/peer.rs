use std::fmt;

/// Opaque peer identity, the way the teacher's `libp2p::PeerId` is opaque to
/// everything above the network crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(u64);

impl PeerId {
    pub const fn from_u64(id: u64) -> Self {
        PeerId(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{:016x}", self.0)
    }
}

/// Why a peer was sanctioned (spec GLOSSARY: "Blacklist — peer-level
/// sanction taken when a peer supplies a permanently invalid payload").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistReason {
    InvalidTransaction(&'static str),
    MalformedResponse(String),
}

impl fmt::Display for BlacklistReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistReason::InvalidTransaction(reason) => {
                write!(f, "supplied an invalid transaction: {reason}")
            }
            BlacklistReason::MalformedResponse(reason) => {
                write!(f, "sent a malformed response: {reason}")
            }
        }
    }
}
