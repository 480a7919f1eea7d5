pub mod attachment;
pub mod capability;
mod codec;
pub mod currency;
pub mod error;
pub mod transaction;

pub use attachment::{Attachment, MintingAlgorithm};
pub use capability::CapabilityFlags;
pub use currency::Currency;
pub use error::{TransactionError, ValidationError};
pub use transaction::{EcBlock, Transaction};
