//! HTTP-based peer broadcaster.
//!
//! Talks to peer nodes over plain HTTP using the blocking `reqwest` client;
//! higher layers call these methods while already holding the engine's
//! lock, so there is no async/await here to interleave with.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::types::{Block, Transaction};

use super::{BroadcastError, BroadcastOutcome, PeerBroadcaster};

/// HTTP implementation of [`PeerBroadcaster`].
pub struct HttpBroadcaster {
    client: Client,
}

impl HttpBroadcaster {
    /// Builds a broadcaster whose HTTP calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, BroadcastError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BroadcastError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn url(peer: &str, path: &str) -> String {
        format!("http://{}/{}", peer.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Serialize)]
struct BroadcastTransactionBody<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: f64,
    signature: &'a str,
}

#[derive(Serialize)]
struct BroadcastBlockBody<'a> {
    block: &'a Block,
}

impl PeerBroadcaster for HttpBroadcaster {
    fn broadcast_transaction(&self, peer: &str, tx: &Transaction) -> Result<(), BroadcastError> {
        let url = Self::url(peer, "broadcast-transaction");
        let body = BroadcastTransactionBody {
            sender: &tx.sender,
            recipient: &tx.recipient,
            amount: tx.amount,
            signature: &tx.signature,
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| BroadcastError::Network(format!("POST {url} failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(BroadcastError::Protocol(format!("peer returned {}", resp.status())))
        }
    }

    fn broadcast_block(&self, peer: &str, block: &Block) -> Result<BroadcastOutcome, BroadcastError> {
        let url = Self::url(peer, "broadcast-block");
        let body = BroadcastBlockBody { block };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| BroadcastError::Network(format!("POST {url} failed: {e}")))?;
        match resp.status().as_u16() {
            201 => Ok(BroadcastOutcome::Accepted),
            200 => Ok(BroadcastOutcome::Deferred),
            409 => Ok(BroadcastOutcome::Rejected),
            other => Err(BroadcastError::Protocol(format!("unexpected status {other}"))),
        }
    }

    fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, BroadcastError> {
        let url = Self::url(peer, "chain");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BroadcastError::Network(format!("GET {url} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(BroadcastError::Protocol(format!("peer returned {}", resp.status())));
        }
        resp.json::<Vec<Block>>()
            .map_err(|e| BroadcastError::Protocol(format!("failed to parse chain: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_avoids_double_slashes() {
        assert_eq!(
            HttpBroadcaster::url("127.0.0.1:5002/", "broadcast-transaction"),
            "http://127.0.0.1:5002/broadcast-transaction"
        );
        assert_eq!(
            HttpBroadcaster::url("127.0.0.1:5002", "/chain"),
            "http://127.0.0.1:5002/chain"
        );
    }

    #[test]
    fn new_builds_a_client() {
        assert!(HttpBroadcaster::new(Duration::from_secs(1)).is_ok());
    }
}
