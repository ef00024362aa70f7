//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use chain::{DefaultEngine, NodeConfig, Wallet};

/// Shared state held by the HTTP facade.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. The engine and wallet each carry their own lock so a
/// read of one doesn't block the other. Metrics are recorded by the engine
/// itself (see [`chain::BlockchainEngine::with_metrics`]); the facade never
/// touches the registry directly.
pub struct AppState {
    /// Embedded blockchain engine (chain, pool, peers, persistence).
    pub engine: Mutex<DefaultEngine>,
    /// This node's signing keypair, if one has been created or loaded.
    pub wallet: Mutex<Wallet>,
    /// Node configuration, including the wallet file path.
    pub config: NodeConfig,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
