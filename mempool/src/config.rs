use std::path::PathBuf;
use std::time::Duration;

use ms_primitives::policy;

/// Configuration for the mempool and its three workers (spec §6, "Hard-coded
/// drifts"), generalized from the teacher's `MempoolConfig { filter_rules,
/// filter_limit }` shape (seen in the sibling `maestroi-core-rs-albatross`
/// revision of this same crate).
#[derive(Debug, Clone)]
pub struct MempoolConfig {
    /// Directory the LMDB environment backing the mempool table lives in.
    pub data_dir: PathBuf,
    pub sweep_period: Duration,
    pub rebroadcast_period: Duration,
    pub peer_pull_period: Duration,
    pub rebroadcast_staleness: Duration,
    pub timestamp_drift: i64,
    pub max_deadline_minutes: u32,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        MempoolConfig {
            data_dir: PathBuf::from("./mempool-db"),
            sweep_period: Duration::from_secs(policy::SWEEP_PERIOD_SECS),
            rebroadcast_period: Duration::from_secs(policy::REBROADCAST_PERIOD_SECS),
            peer_pull_period: Duration::from_secs(policy::PEER_PULL_PERIOD_SECS),
            rebroadcast_staleness: Duration::from_secs(policy::REBROADCAST_STALENESS_SECS as u64),
            timestamp_drift: policy::MAX_TIMESTAMP_DRIFT_SECS,
            max_deadline_minutes: policy::MAX_DEADLINE_MINUTES,
        }
    }
}
