//! Protocol-fixed constants named by spec §6.
//!
//! Values are placeholders for a still-unlaunched network the way a fresh
//! chain's genesis policy module is before its hard-fork heights are fixed;
//! what's load-bearing here is that every rule in the capability and naming
//! validators reads these names, never a bare literal.

/// Height at which the Monetary System transaction types become valid.
/// Genesis (height 0) predates the feature.
pub const MONETARY_SYSTEM_BLOCK: u32 = 1;

/// Height at which `version` becomes `1` and EC-block fields are required;
/// also the height below which the mempool refuses to process transactions
/// at all (spec §4.6, "chain ... below DIGITAL_GOODS_STORE_BLOCK").
pub const DIGITAL_GOODS_STORE_BLOCK: u32 = 1;

pub const MIN_CURRENCY_NAME_LENGTH: usize = 3;
pub const MAX_CURRENCY_NAME_LENGTH: usize = 10;
pub const CURRENCY_CODE_LENGTH: usize = 3;
pub const MAX_CURRENCY_DESCRIPTION_LENGTH: usize = 1000;

/// Characters a (lowercased) currency name may be drawn from.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Characters a currency code may be drawn from.
pub const ALLOWED_CURRENCY_CODE_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Drift tolerances and worker periods (spec §6, "Hard-coded drifts").
pub const MAX_TIMESTAMP_DRIFT_SECS: i64 = 15;
pub const MAX_DEADLINE_MINUTES: u32 = 1440;
pub const REBROADCAST_STALENESS_SECS: i64 = 30;
pub const SWEEP_PERIOD_SECS: u64 = 1;
pub const PEER_PULL_PERIOD_SECS: u64 = 5;
pub const REBROADCAST_PERIOD_SECS: u64 = 60;
