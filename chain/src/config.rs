//! Top-level configuration for a node.
//!
//! This module aggregates configuration for:
//!
//! - consensus parameters (`ConsensusConfig`): mining reward and PoW
//!   difficulty,
//! - where on disk the chain snapshot and wallet keys live,
//! - the Prometheus metrics exporter (enable flag + listen address),
//! - the timeout applied to outbound peer broadcasts.
//!
//! `api-gateway`'s `main.rs` builds a `NodeConfig` from parsed CLI flags
//! plus these defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::consensus::ConsensusConfig;

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Builds the default metrics config for a node listening on `port`,
    /// exporting metrics on `port + 1000` so that running several nodes on
    /// one host doesn't collide.
    pub fn for_port(port: u16) -> Self {
        let metrics_port = port.saturating_add(1000);
        let addr: SocketAddr = format!("127.0.0.1:{metrics_port}")
            .parse()
            .expect("derived metrics address should always parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for a node.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Port the HTTP facade listens on. Also used to derive the wallet
    /// and chain snapshot file names and the metrics listen address.
    pub port: u16,
    /// Directory holding `wallet-<port>.txt` and `blockchain-<port>.txt`.
    pub data_dir: PathBuf,
    /// Consensus tuning (mining reward, PoW difficulty).
    pub consensus: ConsensusConfig,
    /// Prometheus metrics exporter configuration.
    pub metrics: MetricsConfig,
    /// Timeout applied to outbound peer broadcast HTTP calls.
    pub broadcast_timeout: Duration,
    /// Peers to seed the peer set with at startup.
    pub initial_peers: Vec<String>,
}

impl NodeConfig {
    /// Builds a `NodeConfig` for `port` with every other field defaulted.
    pub fn for_port(port: u16) -> Self {
        Self {
            port,
            data_dir: PathBuf::from("."),
            consensus: ConsensusConfig::default(),
            metrics: MetricsConfig::for_port(port),
            broadcast_timeout: Duration::from_secs(5),
            initial_peers: Vec::new(),
        }
    }

    /// Path to this node's wallet key file.
    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(format!("wallet-{}.txt", self.port))
    }

    /// Path to this node's chain snapshot file.
    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join(format!("blockchain-{}.txt", self.port))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::for_port(5001)
    }
}
