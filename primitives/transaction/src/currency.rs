use ms_primitives::{Address, Coin};

use crate::capability::CapabilityFlags;

/// A Monetary System currency (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Currency {
    pub id: u64,
    pub account_id: Address,
    pub name: String,
    pub code: String,
    pub description: String,
    pub currency_type: CapabilityFlags,
    pub current_supply: Coin,
    pub issuance_height: u32,
}

impl Currency {
    /// `is_active ⇔ current height ≥ issuance_height` (spec §3).
    pub fn is_active(&self, current_height: u32) -> bool {
        current_height >= self.issuance_height
    }
}
