//! Chain library crate.
//!
//! This crate provides the core building blocks for a proof-of-work node:
//!
//! - strongly-typed domain types (`types`),
//! - canonical hashing and proof-of-work (`hashing`),
//! - RSA wallets and transaction signing (`wallet`),
//! - transaction and chain validity predicates (`verification`),
//! - a generic blockchain engine (`consensus`),
//! - storage backends (`storage`),
//! - an outbound peer broadcaster (`broadcast`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level node configuration (`config`).
//!
//! `api-gateway` composes these pieces into the HTTP-facing node binary.

pub mod broadcast;
pub mod config;
pub mod consensus;
pub mod hashing;
pub mod metrics;
pub mod storage;
pub mod types;
pub mod verification;
pub mod wallet;

// Re-export top-level configuration types.
pub use config::{MetricsConfig, NodeConfig};

// Re-export "core" consensus types and traits.
pub use consensus::{BlockOutcome, BlockchainEngine, ChainStore, ConsensusConfig, EngineError, ValidationError};

// Re-export storage backends.
pub use storage::{FileChainStore, InMemoryChainStore, StorageError};

// Re-export the peer broadcaster interface and its HTTP implementation.
pub use broadcast::{BroadcastError, BroadcastOutcome, HttpBroadcaster, PeerBroadcaster};

// Re-export metrics registry and node metrics.
pub use metrics::{MetricsRegistry, NodeMetrics, run_prometheus_http_server};

// Re-export the wallet.
pub use wallet::{Wallet, WalletError};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the default node engine stack: flat-file persistence and
/// an HTTP peer broadcaster.
pub type DefaultEngine = BlockchainEngine<FileChainStore, HttpBroadcaster>;
