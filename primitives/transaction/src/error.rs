use thiserror::Error;

/// Errors from parsing/encoding the canonical wire form (spec §6,
/// "Transaction canonical encoding").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction bytes are truncated")]
    Truncated,
    #[error("unknown attachment discriminant {0}")]
    UnknownAttachment(u8),
    #[error("transaction bytes have trailing garbage")]
    TrailingBytes,
}

/// The error taxonomy from spec §7.
///
/// `NotValid` is permanent (the peer-batch path must blacklist the peer
/// that supplied it); `NotCurrentlyValid` is transient (silently skipped in
/// the peer path, retried by ordinary mempool churn); `NotYetEnabled` is a
/// feature gate and, per spec §7, "treated as `NotCurrentlyValid` by the
/// peer path".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not valid: {0}")]
    NotValid(&'static str),

    #[error("not currently valid: {0}")]
    NotCurrentlyValid(&'static str),

    #[error("not yet enabled: {0}")]
    NotYetEnabled(&'static str),
}

impl ValidationError {
    /// Whether the peer-batch path should silently skip this error rather
    /// than propagate it (which would cause the caller to blacklist the
    /// peer). `NotCurrentlyValid` and `NotYetEnabled` are transient; only
    /// `NotValid` is fatal to the peer.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ValidationError::NotValid(_))
    }
}
