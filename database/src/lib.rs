mod env;
mod error;
mod row;
mod txn;

pub use env::{Environment, UnconfirmedIter};
pub use error::StoreError;
pub use txn::WriteTransaction;
