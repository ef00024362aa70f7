//! Blockchain engine and related abstractions.
//!
//! This module provides:
//!
//! - configuration parameters ([`config::ConsensusConfig`]),
//! - the persistence interface the engine depends on ([`store::ChainStore`]),
//! - the error hierarchy ([`error::EngineError`], [`error::ValidationError`],
//!   [`error::BlockOutcome`]),
//! - and the engine itself ([`engine::BlockchainEngine`]).

pub mod config;
pub mod engine;
pub mod error;
pub mod store;

pub use config::ConsensusConfig;
pub use engine::BlockchainEngine;
pub use error::{BlockOutcome, EngineError, ValidationError};
pub use store::ChainStore;
