//! Core domain types used by the chain.
//!
//! This module defines the transaction and block shapes shared across the
//! wallet, verification predicates, engine, storage and HTTP facade. The
//! goal is to avoid "naked" JSON values in public APIs and instead use
//! strongly-typed structs with a single canonical on-wire shape.

use serde::{Deserialize, Serialize};

/// Sender value used by the block reward transaction the engine appends
/// when mining. A reward transaction bypasses both the funds check and the
/// signature check during verification.
pub const MINING_SENTINEL: &str = "MINING";

/// A single value transfer between two hex-encoded public keys.
///
/// `sender` and `recipient` are the hex-encoded DER public keys of the two
/// parties. `signature` is the hex-encoded RSA/PKCS#1v1.5 signature over
/// the canonical `sender||recipient||amount` message, empty for reward
/// transactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub signature: String,
}

impl Transaction {
    /// Returns `true` if this transaction is the mining reward appended to
    /// a block by the miner, rather than a client-submitted transfer.
    pub fn is_reward(&self) -> bool {
        self.sender == MINING_SENTINEL
    }

    /// Field-wise equality used to reconcile the open-transaction pool
    /// against a block's contents.
    pub fn matches(&self, other: &Transaction) -> bool {
        self.sender == other.sender
            && self.recipient == other.recipient
            && self.amount == other.amount
            && self.signature == other.signature
    }
}

/// A block in the chain: a batch of transactions plus the proof-of-work
/// that ties it to its predecessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
}

impl Block {
    /// Builds the genesis block. Its proof is a fixed constant since there
    /// is no predecessor to prove work against.
    pub fn genesis() -> Self {
        Block {
            index: 0,
            previous_hash: String::new(),
            timestamp: 0,
            transactions: Vec::new(),
            proof: 100,
        }
    }

    /// Returns this block's transactions with the trailing mining reward
    /// stripped off, or the full slice if there is no reward present.
    pub fn transactions_without_reward(&self) -> &[Transaction] {
        match self.transactions.last() {
            Some(tx) if tx.is_reward() => &self.transactions[..self.transactions.len() - 1],
            _ => &self.transactions[..],
        }
    }
}

/// On-disk / on-wire snapshot of everything a node needs to resume
/// operation: the chain itself, the open-transaction pool, and the peer
/// set. See [`crate::storage::FileChainStore`] for the exact 3-line
/// encoding.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub chain: Vec<Block>,
    pub open_transactions: Vec<Transaction>,
    pub peers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_transaction_is_recognised() {
        let tx = Transaction {
            sender: MINING_SENTINEL.to_string(),
            recipient: "abc".to_string(),
            amount: 10.0,
            signature: String::new(),
        };
        assert!(tx.is_reward());
    }

    #[test]
    fn transactions_without_reward_strips_trailing_reward_only() {
        let transfer = Transaction {
            sender: "alice".to_string(),
            recipient: "bob".to_string(),
            amount: 1.0,
            signature: "sig".to_string(),
        };
        let reward = Transaction {
            sender: MINING_SENTINEL.to_string(),
            recipient: "bob".to_string(),
            amount: 10.0,
            signature: String::new(),
        };

        let block = Block {
            index: 1,
            previous_hash: "deadbeef".to_string(),
            timestamp: 1,
            transactions: vec![transfer.clone(), reward],
            proof: 42,
        };
        assert_eq!(block.transactions_without_reward(), &[transfer]);

        let empty_block = Block::genesis();
        assert!(empty_block.transactions_without_reward().is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = Snapshot {
            chain: vec![Block::genesis()],
            open_transactions: Vec::new(),
            peers: vec!["127.0.0.1:5002".to_string()],
        };
        let encoded = serde_json::to_string(&snapshot).expect("snapshot should serialize");
        let decoded: Snapshot = serde_json::from_str(&encoded).expect("snapshot should parse");
        assert_eq!(decoded.chain.len(), 1);
        assert_eq!(decoded.peers, snapshot.peers);
    }
}
