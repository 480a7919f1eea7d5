use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use futures::stream::BoxStream;

use ms_mempool::{EventBus, LocalOriginTracker, MempoolConfig, MempoolStore, TransactionProcessor};
use ms_mempool::blockchain::{Blockchain, BlockchainError, CurrencyRegistry};
use ms_network_interface::message::UnconfirmedTransactionsResponse;
use ms_network_interface::{BlacklistReason, Network, NetworkError, PeerId};
use ms_primitives::clock::test_support::FakeClock;
use ms_primitives::{Address, Clock, Coin};
use ms_transaction::{Attachment, CapabilityFlags, Currency, MintingAlgorithm, Transaction};

struct FakeBlockchain {
    height: StdMutex<u32>,
    confirmed: StdMutex<HashSet<u64>>,
    reject_apply: StdMutex<HashSet<u64>>,
}

impl FakeBlockchain {
    fn new(height: u32) -> Self {
        FakeBlockchain {
            height: StdMutex::new(height),
            confirmed: StdMutex::new(HashSet::new()),
            reject_apply: StdMutex::new(HashSet::new()),
        }
    }

    fn reject_next_apply(&self, id: u64) {
        self.reject_apply.lock().unwrap().insert(id);
    }
}

impl CurrencyRegistry for FakeBlockchain {
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

impl Blockchain for FakeBlockchain {
    fn height(&self) -> u32 {
        *self.height.lock().unwrap()
    }

    fn is_syncing(&self) -> bool {
        false
    }

    fn contains_confirmed(&self, id: u64) -> bool {
        self.confirmed.lock().unwrap().contains(&id)
    }

    fn account_exists(&self, _address: Address) -> bool {
        true
    }

    fn verify_signature(&self, _tx: &Transaction) -> bool {
        true
    }

    fn apply_unconfirmed(&self, tx: &Transaction) -> Result<bool, BlockchainError> {
        Ok(!self.reject_apply.lock().unwrap().remove(&tx.id))
    }

    fn undo_unconfirmed(&self, _tx: &Transaction) -> Result<(), BlockchainError> {
        Ok(())
    }

    fn undo_confirmed(&self, _tx: &Transaction) -> Result<(), BlockchainError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeNetwork {
    sent: StdMutex<Vec<Transaction>>,
    blacklisted: StdMutex<Vec<(PeerId, BlacklistReason)>>,
}

#[async_trait]
impl Network for FakeNetwork {
    async fn subscribe_transactions(&self) -> Result<BoxStream<'static, Transaction>, NetworkError> {
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn send_to_some(&self, transactions: Vec<Transaction>) {
        self.sent.lock().unwrap().extend(transactions);
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
        self.blacklisted.lock().unwrap().push((peer, reason));
    }
}

fn ordinary_tx(sender: u64, timestamp: i64, deadline: u32) -> Transaction {
    Transaction::build(
        Address::from_u64(sender),
        Address::from_u64(99),
        Coin::from_u64(10),
        Coin::from_u64(1),
        timestamp,
        deadline,
        1,
        None,
        Attachment::Ordinary,
        vec![0xAB],
    )
}

fn build_processor(
    clock: Arc<FakeClock>,
) -> (Arc<TransactionProcessor>, Arc<FakeBlockchain>, Arc<FakeNetwork>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MempoolStore::open(dir.path()).unwrap());
    let blockchain = Arc::new(FakeBlockchain::new(10));
    let network = Arc::new(FakeNetwork::default());
    let events = Arc::new(EventBus::new());
    let local_origin = Arc::new(LocalOriginTracker::new());

    let processor = Arc::new(TransactionProcessor::new(
        blockchain.clone(),
        store,
        local_origin,
        events,
        network.clone(),
        clock.clone() as Arc<dyn Clock>,
        MempoolConfig::default(),
    ));

    (processor, blockchain, network, dir)
}

/// S5 — Local broadcast echoed by peer.
#[tokio::test]
async fn s5_local_broadcast_echoed_by_peer_is_not_double_counted() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, network, _dir) = build_processor(clock);

    let tx = ordinary_tx(1, 1_700_000_000, 60);
    processor.broadcast(tx.clone()).await.expect("broadcast accepted");
    assert!(processor.local_origin().contains(tx.id));
    assert!(network.sent.lock().unwrap().is_empty());

    let accepted = processor
        .process_peer_batch(vec![tx.clone()], true)
        .await
        .expect("peer echo processed");

    assert!(!processor.local_origin().contains(tx.id));
    assert!(accepted.is_empty());
    assert!(network.sent.lock().unwrap().is_empty());
    assert!(processor.store().contains(tx.id).unwrap());
}

/// S6 — Expiry sweep.
#[tokio::test]
async fn s6_expiry_sweep_removes_only_past_expirations() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock.clone());

    let expiring = ordinary_tx(1, 1_699_999_000, 0);
    let live = ordinary_tx(2, 1_700_000_000, 60);

    processor
        .process_transactions(vec![expiring.clone(), live.clone()], false)
        .await
        .unwrap();

    assert!(processor.store().contains(expiring.id).unwrap());
    assert!(processor.store().contains(live.id).unwrap());

    processor.sweep_expired().expect("sweep succeeds");

    assert!(!processor.store().contains(expiring.id).unwrap());
    assert!(processor.store().contains(live.id).unwrap());
}

/// P1 / P6 — accepted transactions land in the mempool exactly once, and
/// reprocessing the same transaction is idempotent.
#[tokio::test]
async fn reprocessing_an_accepted_transaction_is_idempotent() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let tx = ordinary_tx(1, 1_700_000_000, 60);

    let first = processor.process_transactions(vec![tx.clone()], false).await.unwrap();
    assert_eq!(first.len(), 1);

    let second = processor.process_transactions(vec![tx.clone()], false).await.unwrap();
    assert!(second.is_empty(), "duplicate id must be skipped, not re-accepted");

    assert_eq!(processor.store().num_transactions().unwrap(), 1);
}

/// Drift gate: a transaction already past its deadline never reaches the
/// mempool at all.
#[tokio::test]
async fn drift_gate_rejects_expired_timestamps_before_locking() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let stale = ordinary_tx(1, 1_000_000, 0);
    let accepted = processor.process_transactions(vec![stale.clone()], false).await.unwrap();

    assert!(accepted.is_empty());
    assert!(!processor.store().contains(stale.id).unwrap());
}

/// Double-spend: `apply_unconfirmed` returning false keeps the transaction
/// out of the mempool and surfaces it as a double-spend instead.
#[tokio::test]
async fn double_spend_is_not_inserted() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, blockchain, _network, _dir) = build_processor(clock);

    let tx = ordinary_tx(1, 1_700_000_000, 60);
    blockchain.reject_next_apply(tx.id);

    let accepted = processor.process_transactions(vec![tx.clone()], false).await.unwrap();
    assert!(accepted.is_empty());
    assert!(!processor.store().contains(tx.id).unwrap());
}

fn issuance_tx(currency_type: CapabilityFlags, name: &str, code: &str, timestamp: i64) -> Transaction {
    Transaction::build(
        Address::from_u64(1),
        Address::from_u64(1),
        Coin::ZERO,
        Coin::from_u64(1),
        timestamp,
        60,
        1,
        None,
        Attachment::Issuance {
            currency_type,
            name: name.to_string(),
            code: code.to_string(),
            description: String::new(),
            issuance_height: 0,
            current_supply: 0,
            min_difficulty: 0,
            max_difficulty: 0,
            algorithm: MintingAlgorithm::Unknown(0),
        },
        vec![0xAB],
    )
}

fn transfer_tx(currency_id: u64, timestamp: i64) -> Transaction {
    Transaction::build(
        Address::from_u64(1),
        Address::from_u64(2),
        Coin::from_u64(10),
        Coin::from_u64(1),
        timestamp,
        60,
        1,
        None,
        Attachment::Transfer { currency_id, units: 5 },
        vec![0xAB],
    )
}

/// A peer-supplied Issuance with valid naming and a coherent capability
/// bitmask passes `validate_self` and reaches the mempool.
#[tokio::test]
async fn peer_issuance_with_valid_naming_and_capabilities_is_accepted() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let tx = issuance_tx(CapabilityFlags::EXCHANGEABLE, "goldcoin", "GLD", 1_700_000_000);
    let accepted = processor
        .process_peer_batch(vec![tx.clone()], false)
        .await
        .expect("valid issuance is accepted");

    assert_eq!(accepted.len(), 1);
    assert!(processor.store().contains(tx.id).unwrap());
}

/// An Issuance whose name fails the naming validator's shape check is a
/// `NotValid` and must propagate so the caller blacklists the peer.
#[tokio::test]
async fn peer_issuance_with_invalid_name_is_rejected() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let tx = issuance_tx(CapabilityFlags::EXCHANGEABLE, "ab", "GLD", 1_700_000_000);
    let err = processor
        .process_peer_batch(vec![tx.clone()], false)
        .await
        .expect_err("too-short currency name must be rejected");

    assert!(matches!(
        err,
        ms_mempool::ProcessorError::Validation(ms_transaction::ValidationError::NotValid(_))
    ));
    assert!(!processor.store().contains(tx.id).unwrap());
}

/// A Transfer referencing a currency the local registry doesn't know about
/// yet is a transient `NotCurrentlyValid`, not a permanent rejection: it
/// still flows into `process_transactions` rather than blacklisting the
/// peer for what may just be a sync-lag gap.
#[tokio::test]
async fn peer_transfer_against_unknown_currency_is_not_blacklisted() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let tx = transfer_tx(999, 1_700_000_000);
    let accepted = processor
        .process_peer_batch(vec![tx.clone()], false)
        .await
        .expect("unknown currency must not blacklist the peer");

    assert_eq!(accepted.len(), 1);
    assert!(processor.store().contains(tx.id).unwrap());
}

/// P2 — `on_block_applied` clears confirmed ids from the mempool.
#[tokio::test]
async fn on_block_applied_clears_confirmed_transactions() {
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let (processor, _blockchain, _network, _dir) = build_processor(clock);

    let tx = ordinary_tx(1, 1_700_000_000, 60);
    processor.process_transactions(vec![tx.clone()], false).await.unwrap();
    assert!(processor.store().contains(tx.id).unwrap());

    processor.on_block_applied(&[tx.clone()]).unwrap();
    assert!(!processor.store().contains(tx.id).unwrap());
}
