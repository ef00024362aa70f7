//! Storage backends for the blockchain engine.
//!
//! This module provides concrete implementations of
//! [`crate::consensus::store::ChainStore`]:
//!
//! - an in-memory store ([`mem::InMemoryChainStore`]) for tests,
//! - a flat-file store ([`file::FileChainStore`]) that persists the full
//!   snapshot as three newline-separated JSON arrays.

use std::fmt;

pub mod file;
pub mod mem;

pub use file::FileChainStore;
pub use mem::InMemoryChainStore;

/// Errors a storage backend can fail with.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    Io(std::io::Error),
    /// Persisted data could not be parsed back into a snapshot.
    Corrupt(&'static str),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {e}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt snapshot: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}
