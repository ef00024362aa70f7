//! In-memory chain store.
//!
//! Useful for unit tests and short-lived simulations where a flat-file
//! snapshot on disk would just be friction.

use std::sync::Mutex;

use crate::consensus::store::ChainStore;
use crate::storage::StorageError;
use crate::types::Snapshot;

/// In-memory implementation of [`ChainStore`]. Clonable handles share the
/// same backing snapshot via an internal mutex.
#[derive(Default)]
pub struct InMemoryChainStore {
    snapshot: Mutex<Option<Snapshot>>,
}

impl InMemoryChainStore {
    /// Creates a new, empty in-memory store (no snapshot persisted yet).
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for InMemoryChainStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}
