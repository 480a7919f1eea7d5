use std::sync::Arc;

use parking_lot::Mutex;

use ms_network_interface::{BlacklistReason, Network};
use ms_primitives::{policy, Clock};
use ms_transaction::{Attachment, Currency, Transaction, ValidationError};

use crate::blockchain::{Blockchain, CurrencyRegistry};
use crate::capability::CapabilityValidator;
use crate::config::MempoolConfig;
use crate::error::ProcessorError;
use crate::events::{EventBus, MempoolEvent};
use crate::local_origin::LocalOriginTracker;
use crate::naming::NamingValidator;
use crate::store::MempoolStore;

/// Narrows an `Arc<dyn Blockchain>` to the `CurrencyRegistry` surface
/// `NamingValidator` needs, without relying on trait-object upcasting.
struct AsRegistry<'a>(&'a dyn Blockchain);

impl CurrencyRegistry for AsRegistry<'_> {
    fn get_currency(&self, id: u64) -> Option<Currency> {
        self.0.get_currency(id)
    }

    fn find_currency_by_name(&self, normalized_name: &str) -> Option<Currency> {
        self.0.find_currency_by_name(normalized_name)
    }

    fn find_currency_by_code(&self, code: &str) -> Option<Currency> {
        self.0.find_currency_by_code(code)
    }
}

/// Orchestrates validation, mempool insertion/removal, peer gossip, and fork
/// reconciliation (spec §4.6, C7).
///
/// `blockchain_lock` is the "process-wide blockchain mutex" of spec §5: a
/// dedicated lock independent of whatever internal locking `Blockchain`'s
/// implementation uses, held across every storage-transaction-scoped
/// mutation. There is no process-wide singleton (spec §9, "Global
/// singleton"): the caller builds one explicit instance at node startup.
pub struct TransactionProcessor {
    blockchain: Arc<dyn Blockchain>,
    store: Arc<MempoolStore>,
    local_origin: Arc<LocalOriginTracker>,
    events: Arc<EventBus>,
    network: Arc<dyn Network>,
    clock: Arc<dyn Clock>,
    config: MempoolConfig,
    blockchain_lock: Mutex<()>,
}

impl TransactionProcessor {
    pub fn new(
        blockchain: Arc<dyn Blockchain>,
        store: Arc<MempoolStore>,
        local_origin: Arc<LocalOriginTracker>,
        events: Arc<EventBus>,
        network: Arc<dyn Network>,
        clock: Arc<dyn Clock>,
        config: MempoolConfig,
    ) -> Self {
        TransactionProcessor {
            blockchain,
            store,
            local_origin,
            events,
            network,
            clock,
            config,
            blockchain_lock: Mutex::new(()),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn store(&self) -> &Arc<MempoolStore> {
        &self.store
    }

    pub fn local_origin(&self) -> &Arc<LocalOriginTracker> {
        &self.local_origin
    }

    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    /// `broadcast(tx)` (spec §4.6).
    ///
    /// Registers `tx` as locally originated *before* processing it: with
    /// `send_to_peers = true`, `process_transactions` suppresses the forward
    /// queue for any id already in the tracker, so our own new transaction
    /// isn't gossiped back to us as if it were someone else's echo. The
    /// entry is re-added on acceptance (`process_transactions` removes it as
    /// part of that suppression) and dropped again on rejection.
    pub async fn broadcast(&self, tx: Transaction) -> Result<(), ProcessorError> {
        if !self.blockchain.verify_signature(&tx) {
            return Err(ProcessorError::Validation(ValidationError::NotValid("signature")));
        }

        self.local_origin.put(tx.clone());

        let accepted = self.process_transactions(vec![tx.clone()], true).await?;
        if accepted.iter().any(|accepted_tx| accepted_tx.id == tx.id) {
            self.local_origin.put(tx.clone());
            log::info!("accepted locally broadcast transaction {:016x}", tx.id);
            Ok(())
        } else {
            self.local_origin.remove(tx.id);
            Err(ProcessorError::Validation(ValidationError::NotValid(
                "double spending",
            )))
        }
    }

    /// `process_peer_batch(json_array, send_to_peers)` (spec §4.6).
    ///
    /// A `NotValid` anywhere propagates to the caller, which must blacklist
    /// the peer; `NotCurrentlyValid` is caught and the transaction still
    /// flows into `process_transactions` (spec §9, Open Questions: this is
    /// intentional so transient failures don't poison gossip).
    pub async fn process_peer_batch(
        &self,
        transactions: Vec<Transaction>,
        send_to_peers: bool,
    ) -> Result<Vec<Transaction>, ProcessorError> {
        let mut parsed = Vec::with_capacity(transactions.len());
        for tx in transactions {
            match self.validate_self(&tx) {
                Ok(()) => {}
                Err(ValidationError::NotCurrentlyValid(_)) | Err(ValidationError::NotYetEnabled(_)) => {}
                Err(e) => return Err(ProcessorError::Validation(e)),
            }
            parsed.push(tx);
        }

        let accepted = self.process_transactions(parsed.clone(), send_to_peers).await?;

        for tx in &parsed {
            self.local_origin.remove(tx.id);
        }

        Ok(accepted)
    }

    /// Self-validation a peer-supplied transaction must pass before ever
    /// reaching `process_transactions` (spec §4.6 step 2: "the full
    /// transaction self-validation including §4.1/§4.2 where applicable").
    /// Ordinary (non Monetary System) transactions have nothing further to
    /// check; Monetary System attachments run naming (Issuance only) and
    /// capability validation against the current confirmed registry.
    fn validate_self(&self, tx: &Transaction) -> Result<(), ValidationError> {
        if tx.version < 1 {
            return Err(ValidationError::NotCurrentlyValid("unsupported version"));
        }

        if !tx.attachment.is_monetary_system() {
            return Ok(());
        }

        let height = self.blockchain.height();

        if let Attachment::Issuance {
            currency_type,
            name,
            code,
            description,
            ..
        } = &tx.attachment
        {
            NamingValidator::validate_naming(&AsRegistry(self.blockchain.as_ref()), name, code, description)?;
            return CapabilityValidator::validate(height, *currency_type, None, tx);
        }

        let currency_id = tx
            .attachment
            .currency_id()
            .expect("non-Issuance monetary system attachment always carries a currency id");
        let currency = self
            .blockchain
            .get_currency(currency_id)
            .ok_or(ValidationError::NotCurrentlyValid("unknown currency"))?;

        CapabilityValidator::validate(height, currency.currency_type, Some(&currency), tx)
    }

    /// `process_transactions(batch, send_to_peers)` (spec §4.6). Executed
    /// under the blockchain lock per-transaction; partial success is
    /// permitted (spec §5, "Ordering").
    pub async fn process_transactions(
        &self,
        batch: Vec<Transaction>,
        send_to_peers: bool,
    ) -> Result<Vec<Transaction>, ProcessorError> {
        let now = self.clock.now();
        let mut added_unconfirmed = Vec::new();
        let mut added_double_spending = Vec::new();
        let mut forward_queue = Vec::new();

        for tx in batch {
            if !self.passes_drift_gate(&tx, now) {
                continue;
            }

            let _guard = self.blockchain_lock.lock();
            let mut txn = self.store.begin_write()?;

            if self.blockchain.is_syncing() || self.blockchain.height() < policy::DIGITAL_GOODS_STORE_BLOCK {
                // Premature: drop the lock/transaction and stop the whole
                // batch rather than skipping just this entry.
                drop(txn);
                break;
            }

            if self.blockchain.contains_confirmed(tx.id) || self.store.contains(tx.id)? {
                continue;
            }

            if !self.blockchain.verify_signature(&tx) {
                if self.blockchain.account_exists(tx.sender) {
                    log::warn!("signature verification failed for transaction {:016x}", tx.id);
                }
                continue;
            }

            let applied = self.blockchain.apply_unconfirmed(&tx)?;
            if applied {
                if send_to_peers && self.local_origin.contains(tx.id) {
                    self.local_origin.remove(tx.id);
                } else {
                    forward_queue.push(tx.clone());
                }
                self.store.insert(&mut txn, &tx)?;
                txn.commit()?;
                added_unconfirmed.push(tx);
            } else {
                txn.commit()?;
                added_double_spending.push(tx);
            }
        }

        if !forward_queue.is_empty() {
            self.network.send_to_some(forward_queue).await;
        }

        self.events.emit(MempoolEvent::AddedUnconfirmed(added_unconfirmed.clone()));
        self.events.emit(MempoolEvent::AddedDoubleSpending(added_double_spending));

        Ok(added_unconfirmed)
    }

    fn passes_drift_gate(&self, tx: &Transaction, now: i64) -> bool {
        if tx.timestamp > now + self.config.timestamp_drift {
            return false;
        }
        if tx.expiration() < now {
            return false;
        }
        if tx.deadline > self.config.max_deadline_minutes {
            return false;
        }
        if tx.version < 1 {
            return false;
        }
        true
    }

    /// `on_block_applied(block)` (spec §4.6).
    pub fn on_block_applied(&self, block_transactions: &[Transaction]) -> Result<(), ProcessorError> {
        let _guard = self.blockchain_lock.lock();
        let mut txn = self.store.begin_write()?;

        let mut added_confirmed = Vec::new();
        let mut removed_unconfirmed = Vec::new();

        for tx in block_transactions {
            added_confirmed.push(tx.clone());
            if self.store.contains(tx.id)? {
                if let Some(removed) = self.store.delete(&mut txn, tx.id)? {
                    removed_unconfirmed.push(removed);
                }
            }
        }

        txn.commit()?;

        self.events.emit(MempoolEvent::AddedConfirmed(added_confirmed));
        self.events.emit(MempoolEvent::RemovedUnconfirmed(removed_unconfirmed));
        Ok(())
    }

    /// `on_block_undone(block)` (spec §4.6).
    pub fn on_block_undone(&self, block_transactions: &[Transaction]) -> Result<(), ProcessorError> {
        let _guard = self.blockchain_lock.lock();
        let mut txn = self.store.begin_write()?;

        let mut added_unconfirmed = Vec::new();
        for tx in block_transactions {
            self.blockchain.undo_confirmed(tx)?;
            self.store.insert(&mut txn, tx)?;
            added_unconfirmed.push(tx.clone());
        }

        txn.commit()?;
        self.events.emit(MempoolEvent::AddedUnconfirmed(added_unconfirmed));
        Ok(())
    }

    /// `apply_unconfirmed_bulk(ids)` (spec §4.6).
    pub fn apply_unconfirmed_bulk(&self, ids: &[u64]) -> Result<(), ProcessorError> {
        let _guard = self.blockchain_lock.lock();
        let mut txn = self.store.begin_write()?;

        let mut removed = Vec::new();
        for &id in ids {
            if let Some(tx) = self.store.get(id)? {
                if !self.blockchain.apply_unconfirmed(&tx)? {
                    if let Some(removed_tx) = self.store.delete(&mut txn, id)? {
                        removed.push(removed_tx);
                    }
                }
            }
        }

        txn.commit()?;
        self.events.emit(MempoolEvent::RemovedUnconfirmed(removed));
        Ok(())
    }

    /// `undo_all_unconfirmed() -> Set<id>` (spec §4.6). Does not delete
    /// rows; used when the ledger will reapply them.
    pub fn undo_all_unconfirmed(&self) -> Result<Vec<u64>, ProcessorError> {
        let _guard = self.blockchain_lock.lock();

        let mut touched = Vec::new();
        for entry in self.store.iter_all()? {
            let tx = entry?;
            self.blockchain.undo_unconfirmed(&tx)?;
            touched.push(tx.id);
        }
        Ok(touched)
    }

    /// `remove_unconfirmed(batch)` (spec §4.6).
    pub fn remove_unconfirmed(&self, ids: &[u64]) -> Result<(), ProcessorError> {
        let _guard = self.blockchain_lock.lock();
        let mut txn = self.store.begin_write()?;

        let mut removed = Vec::new();
        for &id in ids {
            if let Some(tx) = self.store.delete(&mut txn, id)? {
                self.blockchain.undo_unconfirmed(&tx)?;
                removed.push(tx);
            }
        }

        txn.commit()?;
        self.events.emit(MempoolEvent::RemovedUnconfirmed(removed));
        Ok(())
    }

    /// Sanctions a peer for a permanently invalid payload, the way
    /// `process_peer_batch`'s caller is expected to on a propagated
    /// `NotValid` (spec §4.6 step 1).
    pub fn blacklist_for(&self, peer: ms_network_interface::PeerId, reason: &'static str) {
        self.network.blacklist(peer, BlacklistReason::InvalidTransaction(reason));
    }

    /// ExpirySweeper body (spec §4.7): under the blockchain lock,
    /// `sweep_expired(now)`, undo each removed entry's unconfirmed state,
    /// emit `RemovedUnconfirmed`.
    pub fn sweep_expired(&self) -> Result<(), ProcessorError> {
        let now = self.clock.now();
        let _guard = self.blockchain_lock.lock();
        let mut txn = self.store.begin_write()?;

        let removed = self.store.sweep_expired(&mut txn, now)?;
        for tx in &removed {
            self.blockchain.undo_unconfirmed(tx)?;
        }

        txn.commit()?;
        self.events.emit(MempoolEvent::RemovedUnconfirmed(removed));
        Ok(())
    }

    /// Rebroadcaster body (spec §4.7): snapshot the local-origin tracker;
    /// drop confirmed/expired entries from it; gossip anything stale enough
    /// to be worth resending. No locks are held during the peer I/O.
    pub async fn rebroadcast(&self) -> Result<(), ProcessorError> {
        let now = self.clock.now();
        let staleness = self.config.rebroadcast_staleness.as_secs() as i64;
        let mut forward = Vec::new();

        for tx in self.local_origin.snapshot() {
            if self.blockchain.contains_confirmed(tx.id) || tx.is_expired(now) {
                self.local_origin.remove(tx.id);
            } else if tx.timestamp < now - staleness {
                forward.push(tx);
            }
        }

        if !forward.is_empty() {
            self.network.send_to_some(forward).await;
        }
        Ok(())
    }

    /// PeerPuller body (spec §4.7): pull `getUnconfirmedTransactions` from a
    /// random connected peer and fold the reply into the mempool without
    /// re-forwarding it (it was already someone else's gossip).
    pub async fn pull_from_peer(&self) -> Result<(), ProcessorError> {
        let Some(peer) = self.network.random_connected_peer() else {
            return Ok(());
        };

        let response = match self.network.request_unconfirmed_transactions(peer).await {
            Ok(response) => response,
            Err(e) => {
                self.network
                    .blacklist(peer, BlacklistReason::MalformedResponse(e.to_string()));
                return Ok(());
            }
        };

        let mut transactions = Vec::with_capacity(response.unconfirmed_transactions.len());
        for tx_json in response.unconfirmed_transactions {
            match tx_json.into_transaction() {
                Ok(tx) => transactions.push(tx),
                Err(e) => {
                    self.network
                        .blacklist(peer, BlacklistReason::MalformedResponse(e.to_string()));
                    return Ok(());
                }
            }
        }

        match self.process_peer_batch(transactions, false).await {
            Ok(_) => Ok(()),
            Err(e) if !e.is_transient() => {
                self.network.blacklist(peer, BlacklistReason::InvalidTransaction("rejected pulled transaction"));
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }
}
