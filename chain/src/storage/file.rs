//! Flat-file chain store.
//!
//! The snapshot is written as exactly three lines:
//!
//! ```text
//! <chain as a JSON array of blocks>
//! <open transactions as a JSON array>
//! <peer URLs as a JSON array of strings>
//! ```
//!
//! Saves overwrite the whole file; there is no append/journal format.

use std::fs;
use std::path::PathBuf;

use crate::consensus::store::ChainStore;
use crate::storage::StorageError;
use crate::types::{Block, Snapshot, Transaction};

/// [`ChainStore`] backed by a single file on disk.
pub struct FileChainStore {
    path: PathBuf,
}

impl FileChainStore {
    /// Creates a store that reads/writes `path`. The file need not exist
    /// yet; [`ChainStore::load`] returns `Ok(None)` for a missing file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ChainStore for FileChainStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut lines = contents.lines();
        let chain_line = lines.next().ok_or(StorageError::Corrupt("missing chain line"))?;
        let open_tx_line = lines
            .next()
            .ok_or(StorageError::Corrupt("missing open transactions line"))?;
        let peers_line = lines.next().ok_or(StorageError::Corrupt("missing peers line"))?;

        let chain: Vec<Block> =
            serde_json::from_str(chain_line).map_err(|_| StorageError::Corrupt("invalid chain JSON"))?;
        let open_transactions: Vec<Transaction> = serde_json::from_str(open_tx_line)
            .map_err(|_| StorageError::Corrupt("invalid open transactions JSON"))?;
        let peers: Vec<String> =
            serde_json::from_str(peers_line).map_err(|_| StorageError::Corrupt("invalid peers JSON"))?;

        Ok(Some(Snapshot {
            chain,
            open_transactions,
            peers,
        }))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let chain_line = serde_json::to_string(&snapshot.chain)
            .map_err(|_| StorageError::Corrupt("failed to encode chain"))?;
        let open_tx_line = serde_json::to_string(&snapshot.open_transactions)
            .map_err(|_| StorageError::Corrupt("failed to encode open transactions"))?;
        let peers_line = serde_json::to_string(&snapshot.peers)
            .map_err(|_| StorageError::Corrupt("failed to encode peers"))?;

        let contents = format!("{chain_line}\n{open_tx_line}\n{peers_line}\n");
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
