use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use ms_mempool::MempoolConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk configuration (TOML), the way the teacher's `ClientConfig`
/// separates a serde-deserialized file shape from the runtime config types
/// consumers actually hold.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub data_dir: String,
    pub log_level: String,
    pub sweep_period_secs: u64,
    pub rebroadcast_period_secs: u64,
    pub peer_pull_period_secs: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = MempoolConfig::default();
        ConfigFile {
            data_dir: defaults.data_dir.to_string_lossy().into_owned(),
            log_level: "info".to_string(),
            sweep_period_secs: defaults.sweep_period.as_secs(),
            rebroadcast_period_secs: defaults.rebroadcast_period.as_secs(),
            peer_pull_period_secs: defaults.peer_pull_period.as_secs(),
        }
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn mempool_config(&self) -> MempoolConfig {
        let defaults = MempoolConfig::default();
        MempoolConfig {
            data_dir: PathBuf::from(&self.data_dir),
            sweep_period: Duration::from_secs(self.sweep_period_secs),
            rebroadcast_period: Duration::from_secs(self.rebroadcast_period_secs),
            peer_pull_period: Duration::from_secs(self.peer_pull_period_secs),
            ..defaults
        }
    }
}
