mod config;
mod logging;
mod standalone;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use ms_mempool::{EventBus, LocalOriginTracker, MempoolEvent, MempoolStore, TransactionProcessor, Workers};
use ms_primitives::SystemClock;

use config::ConfigFile;
use standalone::{StandaloneBlockchain, StandaloneNetwork};

/// Monetary System node: runs the mempool, its validators and its three
/// background workers as a single process (spec §1, §4.6-§4.7).
///
/// Consensus and peer networking are out of scope (spec §1, "only their
/// interface is referenced"); this binary wires the mempool against the
/// `standalone` module's single-node stand-ins so it is independently
/// runnable. A real deployment replaces [`StandaloneBlockchain`] and
/// [`StandaloneNetwork`] with the consensus/network crates' implementations
/// of [`ms_mempool::Blockchain`]/[`ms_network_interface::Network`].
#[derive(Parser, Debug)]
#[command(name = "ms-node", about = "Monetary System mempool node")]
struct Cli {
    /// Path to a TOML config file. Missing file falls back to defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the config file's `data_dir`.
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Overrides the config file's `log_level` (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut file = match &cli.config {
        Some(path) => match ConfigFile::load(path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => ConfigFile::default(),
    };

    if let Some(data_dir) = &cli.data_dir {
        file.data_dir = data_dir.to_string_lossy().into_owned();
    }
    if let Some(log_level) = &cli.log_level {
        file.log_level = log_level.clone();
    }

    logging::initialize_logging(&file.log_level);

    let mempool_config = file.mempool_config();
    log::info!("starting ms-node, data_dir={}", mempool_config.data_dir.display());

    let store = match MempoolStore::open(&mempool_config.data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("failed to open mempool store: {e}");
            std::process::exit(1);
        }
    };

    let events = Arc::new(EventBus::new());
    events.subscribe(Arc::new(|event: &MempoolEvent| match event {
        MempoolEvent::AddedUnconfirmed(txs) => log::debug!("{} transaction(s) entered the mempool", txs.len()),
        MempoolEvent::RemovedUnconfirmed(txs) => log::debug!("{} transaction(s) left the mempool", txs.len()),
        MempoolEvent::AddedConfirmed(txs) => log::debug!("{} transaction(s) confirmed", txs.len()),
        MempoolEvent::AddedDoubleSpending(txs) => log::warn!("{} double-spend(s) rejected", txs.len()),
    }));

    let processor = Arc::new(TransactionProcessor::new(
        Arc::new(StandaloneBlockchain::new()),
        store,
        Arc::new(LocalOriginTracker::new()),
        events,
        Arc::new(StandaloneNetwork::new()),
        Arc::new(SystemClock),
        mempool_config,
    ));

    let workers = Workers::new();
    workers.start(processor.clone());
    log::info!("workers started: expiry sweeper, rebroadcaster, peer puller");

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }

    log::info!("shutting down");
    workers.stop();
}
