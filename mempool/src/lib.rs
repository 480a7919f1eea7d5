pub mod blockchain;
pub mod capability;
pub mod config;
pub mod error;
pub mod events;
pub mod local_origin;
pub mod naming;
pub mod store;
pub mod processor;
pub mod workers;

pub use blockchain::{Blockchain, BlockchainError, CurrencyRegistry};
pub use capability::CapabilityValidator;
pub use config::MempoolConfig;
pub use error::ProcessorError;
pub use events::{EventBus, MempoolEvent, MempoolListener};
pub use local_origin::LocalOriginTracker;
pub use naming::NamingValidator;
pub use processor::TransactionProcessor;
pub use store::MempoolStore;
pub use workers::Workers;
