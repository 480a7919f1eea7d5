use async_trait::async_trait;
use futures::stream::BoxStream;

use ms_transaction::Transaction;

use crate::error::NetworkError;
use crate::message::UnconfirmedTransactionsResponse;
use crate::peer::{BlacklistReason, PeerId};

/// A gossip topic, the way the teacher's `nimiq_network_interface::network::Topic`
/// lets `Mempool::start_executor` subscribe generically. The Monetary System
/// mempool only ever uses the one transaction topic, but the trait keeps the
/// contract general the way the teacher's does.
pub trait Topic {
    const NAME: &'static str;
}

#[derive(Clone, Debug, Default)]
pub struct TransactionTopic;

impl Topic for TransactionTopic {
    const NAME: &'static str = "transactions";
}

/// The network contract `TransactionProcessor`/the workers depend on (spec
/// §1, "peer connection management and wire framing" is out of scope; only
/// this contract is specified).
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Subscribes to the transaction gossip topic, yielding transactions as
    /// peers push them.
    async fn subscribe_transactions(&self) -> Result<BoxStream<'static, Transaction>, NetworkError>;

    /// Gossips transactions to a subset of connected peers. Must never be
    /// called while holding the blockchain lock (spec §5).
    async fn send_to_some(&self, transactions: Vec<Transaction>);

    /// Picks a random connected peer, if any (spec §4.7, PeerPuller).
    fn random_connected_peer(&self) -> Option<PeerId>;

    /// Sends `getUnconfirmedTransactions` to `peer` and awaits its reply.
    async fn request_unconfirmed_transactions(
        &self,
        peer: PeerId,
    ) -> Result<UnconfirmedTransactionsResponse, NetworkError>;

    /// Sanctions a peer that supplied a permanently invalid payload (spec
    /// GLOSSARY: "Blacklist").
    fn blacklist(&self, peer: PeerId, reason: BlacklistReason);
}
