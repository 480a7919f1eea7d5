pub mod error;
pub mod message;
pub mod network;
pub mod peer;

pub use error::NetworkError;
pub use network::{Network, Topic, TransactionTopic};
pub use peer::{BlacklistReason, PeerId};
