//! Peer broadcaster: propagates transactions and blocks to known peers and
//! fetches their chains during resolution.
//!
//! This mirrors an HTTP client abstraction the engine depends on through a
//! trait so tests can substitute a recording double instead of hitting the
//! network.

use std::fmt;

use crate::types::{Block, Transaction};

pub mod http;

pub use http::HttpBroadcaster;

/// Errors a broadcast or fetch operation can fail with.
#[derive(Debug)]
pub enum BroadcastError {
    /// Transport-level failure (DNS, connection refused, timeout, ...).
    Network(String),
    /// Peer responded but with an unexpected status or body.
    Protocol(String),
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastError::Network(msg) => write!(f, "network error: {msg}"),
            BroadcastError::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for BroadcastError {}

/// What a peer did with a broadcast block, mirroring the HTTP status codes
/// defined by the `/broadcast-block` contract (201/200/409).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BroadcastOutcome {
    Accepted,
    Deferred,
    Rejected,
}

/// Abstraction over talking to peer nodes. Implemented by [`HttpBroadcaster`]
/// for production use and by recording test doubles in unit tests.
pub trait PeerBroadcaster {
    /// Forwards a transaction to `peer`, marking it as peer-originated so
    /// the receiving node doesn't re-broadcast it.
    fn broadcast_transaction(&self, peer: &str, tx: &Transaction) -> Result<(), BroadcastError>;

    /// Forwards a mined block to `peer`.
    fn broadcast_block(&self, peer: &str, block: &Block) -> Result<BroadcastOutcome, BroadcastError>;

    /// Fetches `peer`'s full chain, used during conflict resolution.
    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, BroadcastError>;
}
