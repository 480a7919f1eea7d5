use async_trait::async_trait;
use futures::stream::BoxStream;

use ms_mempool::blockchain::{Blockchain, BlockchainError, CurrencyRegistry};
use ms_network_interface::message::UnconfirmedTransactionsResponse;
use ms_network_interface::{BlacklistReason, Network, NetworkError, PeerId};
use ms_primitives::Address;
use ms_transaction::{Currency, Transaction};

/// Single-node stand-in for the out-of-scope consensus engine (spec §1).
///
/// Accepts every transaction it is asked to apply and never reports a
/// confirmed currency or account, which is enough to exercise the mempool,
/// its validators and its workers end to end without a real ledger. Not
/// suitable for anything beyond local experimentation.
pub struct StandaloneBlockchain {
    height: std::sync::atomic::AtomicU32,
}

impl StandaloneBlockchain {
    pub fn new() -> Self {
        StandaloneBlockchain {
            height: std::sync::atomic::AtomicU32::new(ms_primitives::policy::DIGITAL_GOODS_STORE_BLOCK),
        }
    }
}

impl CurrencyRegistry for StandaloneBlockchain {
    fn get_currency(&self, _id: u64) -> Option<Currency> {
        None
    }

    fn find_currency_by_name(&self, _normalized_name: &str) -> Option<Currency> {
        None
    }

    fn find_currency_by_code(&self, _code: &str) -> Option<Currency> {
        None
    }
}

impl Blockchain for StandaloneBlockchain {
    fn height(&self) -> u32 {
        self.height.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn is_syncing(&self) -> bool {
        false
    }

    fn contains_confirmed(&self, _id: u64) -> bool {
        false
    }

    fn account_exists(&self, _address: Address) -> bool {
        true
    }

    fn verify_signature(&self, _tx: &Transaction) -> bool {
        true
    }

    fn apply_unconfirmed(&self, _tx: &Transaction) -> Result<bool, BlockchainError> {
        Ok(true)
    }

    fn undo_unconfirmed(&self, _tx: &Transaction) -> Result<(), BlockchainError> {
        Ok(())
    }

    fn undo_confirmed(&self, _tx: &Transaction) -> Result<(), BlockchainError> {
        Ok(())
    }
}

/// Single-node stand-in for the out-of-scope peer network (spec §1): no
/// peers are ever connected, so gossip and pulls are both no-ops.
pub struct StandaloneNetwork;

impl StandaloneNetwork {
    pub fn new() -> Self {
        StandaloneNetwork
    }
}

#[async_trait]
impl Network for StandaloneNetwork {
    async fn subscribe_transactions(&self) -> Result<BoxStream<'static, Transaction>, NetworkError> {
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn send_to_some(&self, transactions: Vec<Transaction>) {
        log::debug!("no peers connected, dropping {} transaction(s) to gossip", transactions.len());
    }

    fn random_connected_peer(&self) -> Option<PeerId> {
        None
    }

    async fn request_unconfirmed_transactions(
        &self,
        _peer: PeerId,
    ) -> Result<UnconfirmedTransactionsResponse, NetworkError> {
        Ok(UnconfirmedTransactionsResponse {
            unconfirmed_transactions: vec![],
        })
    }

    fn blacklist(&self, peer: PeerId, reason: BlacklistReason) {
        log::warn!("would blacklist {peer}: {reason}");
    }
}
