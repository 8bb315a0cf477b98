//! UMBRA Storage Layer
//!
//! Persistent storage for the accumulator subsystem, backed by redb:
//! - Accumulator values keyed by their 32-bit checksum
//! - Deterministic mint records and the wallet lookahead pool
//! - Wallet counters (derivation count, seed hash)

pub mod accumulator;
pub mod wallet;
mod error;

pub use accumulator::{AccumulatorValueRecord, AccumulatorValueStore};
pub use error::{StorageError, StorageResult};
pub use wallet::WalletStore;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

/// Main storage interface
pub struct Storage {
    db: Arc<Database>,
    pub accumulators: AccumulatorValueStore,
    pub wallet: WalletStore,
}

impl Storage {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Arc::new(Database::create(path)?);
        let accumulators = AccumulatorValueStore::new(db.clone())?;
        let wallet = WalletStore::new(db.clone())?;

        Ok(Self {
            db,
            accumulators,
            wallet,
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_open() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path().join("test.db")).unwrap();
        assert_eq!(storage.accumulators.count().unwrap(), 0);
        assert!(storage.wallet.load_pool().unwrap().is_empty());
    }
}
