//! Persistence abstraction used by the blockchain engine.

use crate::storage::StorageError;
use crate::types::Snapshot;

/// Whole-snapshot persistence interface used by the engine.
///
/// Unlike a block-by-block store, the engine always persists and loads a
/// complete [`Snapshot`] (chain, open-transaction pool, peer set) as one
/// unit, matching the reference node's flat-file format.
pub trait ChainStore {
    /// Loads the most recently persisted snapshot, or `None` if nothing
    /// has been persisted yet (a fresh node).
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;

    /// Overwrites the persisted snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}
