use crate::capability::CapabilityFlags;

/// Proof-of-work hash functions a MINTABLE currency may mint against.
///
/// Spec §4.1 (MINTABLE, present) only requires that `attachment.algorithm`
/// "resolve to a known hash function"; `Unknown` is what every unrecognized
/// wire value decodes to, making that check a real match rather than a
/// stubbed-out always-true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum MintingAlgorithm {
    Sha256,
    Scrypt,
    Unknown(u8),
}

impl MintingAlgorithm {
    pub fn from_wire(value: u8) -> Self {
        match value {
            2 => MintingAlgorithm::Sha256,
            3 => MintingAlgorithm::Scrypt,
            other => MintingAlgorithm::Unknown(other),
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, MintingAlgorithm::Unknown(_))
    }
}

/// The tagged payload a transaction carries (spec §3, "attachment").
///
/// `Ordinary` covers every transaction outside the Monetary System's
/// registry (spec Non-goals: "specifying the full transaction type
/// registry beyond what the Monetary System capability validator
/// requires") and never reaches `CapabilityValidator`. The remaining
/// variants are the subtypes spec §4.1 names explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Attachment {
    Ordinary,

    /// Creates a new currency. `currency_type` is the proposed capability
    /// bitmask; there is no `Currency` row yet to read it from.
    Issuance {
        currency_type: CapabilityFlags,
        name: String,
        code: String,
        description: String,
        issuance_height: u32,
        current_supply: u64,
        min_difficulty: u8,
        max_difficulty: u8,
        algorithm: MintingAlgorithm,
    },

    Transfer {
        currency_id: u64,
        units: u64,
    },

    PublishExchangeOffer {
        currency_id: u64,
    },

    ExchangeBuy {
        currency_id: u64,
    },

    ExchangeSell {
        currency_id: u64,
    },

    ReserveIncrease {
        currency_id: u64,
        amount_per_unit: u64,
    },

    ReserveClaim {
        currency_id: u64,
        units: u64,
    },

    Minting {
        currency_id: u64,
        nonce: u64,
        counter: u32,
    },
}

impl Attachment {
    /// The currency this attachment is about, if any (`Issuance` creates a
    /// currency rather than referencing one).
    pub fn currency_id(&self) -> Option<u64> {
        match self {
            Attachment::Ordinary | Attachment::Issuance { .. } => None,
            Attachment::Transfer { currency_id, .. }
            | Attachment::PublishExchangeOffer { currency_id }
            | Attachment::ExchangeBuy { currency_id }
            | Attachment::ExchangeSell { currency_id }
            | Attachment::ReserveIncrease { currency_id, .. }
            | Attachment::ReserveClaim { currency_id, .. }
            | Attachment::Minting { currency_id, .. } => Some(*currency_id),
        }
    }

    /// Whether this attachment is a Monetary System subtype at all (as
    /// opposed to an ordinary payment, which never reaches the capability
    /// validator).
    pub fn is_monetary_system(&self) -> bool {
        !matches!(self, Attachment::Ordinary)
    }
}
