//! Blockchain engine: owns the chain, the open-transaction pool, the peer
//! set and the resolve-flag, and orchestrates mining, block admission and
//! conflict resolution.
//!
//! The engine is generic over a [`ChainStore`] (persistence) and a
//! [`PeerBroadcaster`] (outbound HTTP to peers), so tests can swap in an
//! in-memory store and a recording broadcaster without touching disk or
//! the network.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::broadcast::{BroadcastOutcome, PeerBroadcaster};
use crate::hashing::{hash_block, proof_of_work};
use crate::metrics::NodeMetrics;
use crate::types::{Block, Snapshot, Transaction, MINING_SENTINEL};
use crate::verification;

use super::config::ConsensusConfig;
use super::error::{BlockOutcome, EngineError, ValidationError};
use super::store::ChainStore;

/// Owns all mutable node state: the chain, the open-transaction pool, the
/// peer set and the resolve-flag.
pub struct BlockchainEngine<S, B> {
    config: ConsensusConfig,
    store: S,
    broadcaster: B,
    chain: Vec<Block>,
    open_transactions: Vec<Transaction>,
    peers: BTreeSet<String>,
    resolve_flag: bool,
    metrics: Option<Arc<NodeMetrics>>,
}

impl<S, B> BlockchainEngine<S, B>
where
    S: ChainStore,
    B: PeerBroadcaster,
{
    /// Builds a new engine, loading a persisted snapshot if one exists and
    /// otherwise starting from a fresh genesis chain.
    pub fn new(config: ConsensusConfig, store: S, broadcaster: B, initial_peers: Vec<String>) -> Self {
        let mut engine = Self {
            config,
            store,
            broadcaster,
            chain: vec![Block::genesis()],
            open_transactions: Vec::new(),
            peers: initial_peers.into_iter().collect(),
            resolve_flag: false,
            metrics: None,
        };

        match engine.store.load() {
            Ok(Some(snapshot)) => {
                tracing::info!(blocks = snapshot.chain.len(), "loaded chain snapshot from disk");
                engine.chain = snapshot.chain;
                engine.open_transactions = snapshot.open_transactions;
                engine.peers.extend(snapshot.peers);
            }
            Ok(None) => {
                tracing::info!("no snapshot found, starting from genesis");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load chain snapshot, starting from genesis");
            }
        }

        engine
    }

    /// Attaches a metrics registry; operation counters are recorded from
    /// here on.
    pub fn with_metrics(mut self, metrics: Arc<NodeMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn persist(&self) {
        let snapshot = Snapshot {
            chain: self.chain.clone(),
            open_transactions: self.open_transactions.clone(),
            peers: self.peers.iter().cloned().collect(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            tracing::error!(error = %e, "failed to persist chain snapshot");
        }
    }

    /// Returns the current tip block. The chain always has at least the
    /// genesis block, so this never panics in practice.
    pub fn tip(&self) -> &Block {
        self.chain.last().expect("chain always has at least genesis")
    }

    /// Returns the full chain.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Returns the open-transaction pool.
    pub fn open_transactions(&self) -> &[Transaction] {
        &self.open_transactions
    }

    /// Returns `true` if a peer rejected a broadcast and mining is blocked
    /// until [`Self::resolve`] clears it.
    pub fn resolve_pending(&self) -> bool {
        self.resolve_flag
    }

    /// Returns the current peer set as a sorted vector.
    pub fn peers(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    /// Adds a peer URL to the peer set. No-op if already present.
    pub fn add_peer_node(&mut self, url: String) {
        self.peers.insert(url);
        self.persist();
    }

    /// Removes a peer URL from the peer set. No-op if absent.
    pub fn remove_peer_node(&mut self, url: &str) {
        self.peers.remove(url);
        self.persist();
    }

    /// Computes `participant`'s balance: received minus sent, across both
    /// the confirmed chain and the open-transaction pool.
    pub fn get_balance(&self, participant: &str) -> f64 {
        let received: f64 = self
            .chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .filter(|tx| tx.recipient == participant)
            .map(|tx| tx.amount)
            .sum();
        let sent_confirmed: f64 = self
            .chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .filter(|tx| tx.sender == participant)
            .map(|tx| tx.amount)
            .sum();
        let sent_pending: f64 = self
            .open_transactions
            .iter()
            .filter(|tx| tx.sender == participant)
            .map(|tx| tx.amount)
            .sum();
        received - sent_confirmed - sent_pending
    }

    /// Validates and admits a transaction into the open-transaction pool.
    ///
    /// `is_receiving` distinguishes a transaction a client submitted to
    /// this node (`false`, so it gets broadcast onward) from one a peer
    /// already broadcast to us (`true`, so we don't echo it back).
    pub fn add_transaction(
        &mut self,
        sender: String,
        recipient: String,
        amount: f64,
        signature: String,
        is_receiving: bool,
    ) -> Result<Transaction, EngineError> {
        let tx = Transaction {
            sender,
            recipient,
            amount,
            signature,
        };

        let balance = self.get_balance(&tx.sender);
        if !verification::verify_transaction(&tx, balance, true) {
            if let Some(m) = &self.metrics {
                m.transactions_rejected.inc();
            }
            return Err(EngineError::Validation(ValidationError::InsufficientFunds));
        }

        self.open_transactions.push(tx.clone());
        self.persist();
        if let Some(m) = &self.metrics {
            m.transactions_admitted.inc();
        }
        tracing::info!(sender = %tx.sender, recipient = %tx.recipient, amount = tx.amount, "transaction admitted");

        if !is_receiving {
            for peer in self.peers.clone() {
                if let Err(e) = self.broadcaster.broadcast_transaction(&peer, &tx) {
                    if let Some(m) = &self.metrics {
                        m.broadcasts_failed.inc();
                    }
                    tracing::warn!(peer = %peer, error = %e, "transaction broadcast failed");
                }
            }
        }

        Ok(tx)
    }

    /// Mines a new block: proves work over the open-transaction pool,
    /// appends a reward transaction paying `miner_public_key`, and
    /// broadcasts the result to every peer.
    pub fn mine_block(&mut self, miner_public_key: &str) -> Result<Block, EngineError> {
        if self.resolve_flag {
            return Err(EngineError::Validation(ValidationError::ResolvePending));
        }
        if !verification::verify_transactions(&self.open_transactions) {
            return Err(EngineError::Validation(ValidationError::InvalidSignature));
        }

        let last_hash = hash_block(self.tip());
        let proof = proof_of_work(&self.open_transactions, &last_hash, self.config.pow_difficulty);

        let mut transactions = self.open_transactions.clone();
        transactions.push(Transaction {
            sender: MINING_SENTINEL.to_string(),
            recipient: miner_public_key.to_string(),
            amount: self.config.mining_reward,
            signature: String::new(),
        });

        let block = Block {
            index: self.chain.len() as u64,
            previous_hash: last_hash,
            timestamp: current_unix_timestamp(),
            transactions,
            proof,
        };

        self.chain.push(block.clone());
        self.open_transactions.clear();
        self.persist();
        if let Some(m) = &self.metrics {
            m.blocks_mined.inc();
        }
        tracing::info!(index = block.index, proof = block.proof, "block mined");

        for peer in self.peers.clone() {
            match self.broadcaster.broadcast_block(&peer, &block) {
                Ok(BroadcastOutcome::Rejected) => {
                    tracing::warn!(peer = %peer, "peer rejected mined block, flagging resolution");
                    self.resolve_flag = true;
                }
                Ok(_) => {}
                Err(e) => {
                    if let Some(m) = &self.metrics {
                        m.broadcasts_failed.inc();
                    }
                    tracing::warn!(peer = %peer, error = %e, "block broadcast failed");
                }
            }
        }

        Ok(block)
    }

    /// Admits a block received from a peer.
    ///
    /// - Rejects it outright if its index is not ahead of the local tip.
    /// - Defers it (and flags resolution) if it is ahead by more than one.
    /// - Otherwise validates proof-of-work and parent hash before
    ///   appending, pruning any pool transactions the block already
    ///   includes.
    pub fn add_block(&mut self, block: Block) -> Result<BlockOutcome, EngineError> {
        let tip_index = self.tip().index;

        if block.index <= tip_index {
            tracing::warn!(index = block.index, tip = tip_index, "rejected inbound block: not ahead of tip");
            return Ok(BlockOutcome::Rejected);
        }
        if block.index > tip_index + 1 {
            tracing::warn!(index = block.index, tip = tip_index, "inbound block far ahead of tip, deferring");
            self.resolve_flag = true;
            return Ok(BlockOutcome::Deferred);
        }

        let expected_parent_hash = hash_block(self.tip());
        let parent_ok = block.previous_hash == expected_parent_hash;
        let pow_ok = crate::hashing::valid_proof(
            block.transactions_without_reward(),
            &block.previous_hash,
            block.proof,
            self.config.pow_difficulty,
        );
        if !parent_ok || !pow_ok {
            tracing::warn!(index = block.index, "rejected inbound block: invalid proof or parent hash");
            return Ok(BlockOutcome::Rejected);
        }

        self.open_transactions
            .retain(|pool_tx| !block.transactions.iter().any(|btx| btx.matches(pool_tx)));
        self.chain.push(block.clone());
        self.persist();
        if let Some(m) = &self.metrics {
            m.blocks_received.inc();
        }
        tracing::info!(index = block.index, "appended inbound block");
        Ok(BlockOutcome::Appended)
    }

    /// Fetches every peer's chain and adopts the longest one that passes
    /// [`verification::verify_chain`], clearing the resolve-flag either
    /// way. Returns whether the local chain was replaced.
    pub fn resolve(&mut self) -> Result<bool, EngineError> {
        let mut winner = self.chain.clone();
        let mut replaced = false;

        for peer in self.peers.clone() {
            match self.broadcaster.fetch_chain(&peer) {
                Ok(candidate) => {
                    if candidate.len() > winner.len() && verification::verify_chain(&candidate, self.config.pow_difficulty) {
                        winner = candidate;
                        replaced = true;
                    }
                }
                Err(e) => tracing::warn!(peer = %peer, error = %e, "failed to fetch chain during resolution"),
            }
        }

        self.resolve_flag = false;
        self.chain = winner;
        if replaced {
            self.open_transactions.clear();
        }
        self.persist();
        if let Some(m) = &self.metrics {
            m.resolutions_performed.inc();
            if replaced {
                m.resolutions_adopted.inc();
            }
        }
        tracing::info!(replaced, chain_len = self.chain.len(), "resolution complete");
        Ok(replaced)
    }
}

/// Returns the current wall-clock time as seconds since the Unix epoch.
pub fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::BroadcastError;
    use crate::storage::InMemoryChainStore;
    use crate::wallet::Wallet;
    use std::sync::Mutex;

    /// Records every call made to it; never actually reaches the network.
    #[derive(Default)]
    struct RecordingBroadcaster {
        block_outcome: Mutex<BroadcastOutcome>,
        fetch_chain_result: Mutex<Option<Vec<Block>>>,
    }

    impl Default for BroadcastOutcome {
        fn default() -> Self {
            BroadcastOutcome::Accepted
        }
    }

    impl PeerBroadcaster for RecordingBroadcaster {
        fn broadcast_transaction(&self, _peer: &str, _tx: &Transaction) -> Result<(), BroadcastError> {
            Ok(())
        }

        fn broadcast_block(&self, _peer: &str, _block: &Block) -> Result<BroadcastOutcome, BroadcastError> {
            Ok(*self.block_outcome.lock().unwrap())
        }

        fn fetch_chain(&self, _peer: &str) -> Result<Vec<Block>, BroadcastError> {
            match self.fetch_chain_result.lock().unwrap().clone() {
                Some(chain) => Ok(chain),
                None => Err(BroadcastError::Network("no peer configured".to_string())),
            }
        }
    }

    fn new_engine() -> BlockchainEngine<InMemoryChainStore, RecordingBroadcaster> {
        BlockchainEngine::new(
            ConsensusConfig::default(),
            InMemoryChainStore::new(),
            RecordingBroadcaster::default(),
            Vec::new(),
        )
    }

    fn signed_transfer(wallet: &Wallet, recipient: &str, amount: f64) -> (String, String, f64, String) {
        let sender = wallet.public_key().unwrap().to_string();
        let signature = wallet.sign_transaction(&sender, recipient, amount).unwrap();
        (sender, recipient.to_string(), amount, signature)
    }

    #[test]
    fn fresh_engine_starts_at_genesis() {
        let engine = new_engine();
        assert_eq!(engine.chain().len(), 1);
        assert_eq!(engine.tip().index, 0);
        assert!(!engine.resolve_pending());
    }

    #[test]
    fn add_transaction_rejects_insufficient_funds() {
        let mut engine = new_engine();
        let mut wallet = Wallet::new();
        wallet.create_keys().unwrap();
        let (sender, recipient, amount, signature) = signed_transfer(&wallet, "bob", 100.0);

        let result = engine.add_transaction(sender, recipient, amount, signature, false);
        assert!(result.is_err());
        assert!(engine.open_transactions().is_empty());
    }

    #[test]
    fn mine_block_pays_reward_to_miner() {
        let mut engine = new_engine();
        let mut wallet = Wallet::new();
        wallet.create_keys().unwrap();
        let miner_key = wallet.public_key().unwrap().to_string();

        let block = engine.mine_block(&miner_key).expect("mining should succeed");
        assert_eq!(block.index, 1);
        assert_eq!(engine.get_balance(&miner_key), 10.0);
        assert!(engine.open_transactions().is_empty());
    }

    #[test]
    fn mine_block_admits_pending_transfer_and_pays_sender_and_recipient() {
        let mut engine = new_engine();
        let mut miner = Wallet::new();
        miner.create_keys().unwrap();
        let miner_key = miner.public_key().unwrap().to_string();

        engine.mine_block(&miner_key).unwrap();
        assert_eq!(engine.get_balance(&miner_key), 10.0);

        let (sender, recipient, amount, signature) = signed_transfer(&miner, "bob-key", 4.0);
        engine.add_transaction(sender, recipient, amount, signature, false).unwrap();

        engine.mine_block(&miner_key).unwrap();
        assert_eq!(engine.get_balance(&miner_key), 16.0);
        assert_eq!(engine.get_balance("bob-key"), 4.0);
    }

    #[test]
    fn mining_blocked_while_resolve_pending() {
        let mut engine = new_engine();
        *engine.broadcaster.block_outcome.lock().unwrap() = BroadcastOutcome::Rejected;
        engine.add_peer_node("127.0.0.1:5002".to_string());

        let mut wallet = Wallet::new();
        wallet.create_keys().unwrap();
        let miner_key = wallet.public_key().unwrap().to_string();

        engine.mine_block(&miner_key).unwrap();
        assert!(engine.resolve_pending());

        let err = engine.mine_block(&miner_key).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::ResolvePending)));
    }

    #[test]
    fn add_block_rejects_non_advancing_index() {
        let mut engine = new_engine();
        let stale = engine.tip().clone();
        let outcome = engine.add_block(stale).unwrap();
        assert_eq!(outcome, BlockOutcome::Rejected);
    }

    #[test]
    fn add_block_defers_when_far_ahead() {
        let mut engine = new_engine();
        let far_future = Block {
            index: 5,
            previous_hash: "whatever".to_string(),
            timestamp: 1,
            transactions: Vec::new(),
            proof: 1,
        };
        let outcome = engine.add_block(far_future).unwrap();
        assert_eq!(outcome, BlockOutcome::Deferred);
        assert!(engine.resolve_pending());
    }

    #[test]
    fn add_block_appends_valid_successor() {
        let mut engine = new_engine();
        let last_hash = hash_block(engine.tip());
        let proof = proof_of_work(&[], &last_hash, engine.config.pow_difficulty);
        let block = Block {
            index: 1,
            previous_hash: last_hash,
            timestamp: 1,
            transactions: Vec::new(),
            proof,
        };
        let outcome = engine.add_block(block).unwrap();
        assert_eq!(outcome, BlockOutcome::Appended);
        assert_eq!(engine.chain().len(), 2);
    }

    #[test]
    fn resolve_adopts_longer_valid_chain() {
        let mut engine = new_engine();
        engine.add_peer_node("127.0.0.1:5002".to_string());

        let genesis = Block::genesis();
        let last_hash = hash_block(&genesis);
        let proof = proof_of_work(&[], &last_hash, 2);
        let longer = vec![
            genesis,
            Block {
                index: 1,
                previous_hash: last_hash,
                timestamp: 1,
                transactions: Vec::new(),
                proof,
            },
        ];
        *engine.broadcaster.fetch_chain_result.lock().unwrap() = Some(longer.clone());

        let replaced = engine.resolve().unwrap();
        assert!(replaced);
        assert_eq!(engine.chain().len(), 2);
        assert!(!engine.resolve_pending());
    }

    #[test]
    fn resolve_keeps_local_chain_when_no_peer_has_a_longer_one() {
        let mut engine = new_engine();
        let mut wallet = Wallet::new();
        wallet.create_keys().unwrap();
        engine.mine_block(wallet.public_key().unwrap()).unwrap();

        let replaced = engine.resolve().unwrap();
        assert!(!replaced);
        assert_eq!(engine.chain().len(), 2);
    }
}
