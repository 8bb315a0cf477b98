//! Wallet mint storage
//!
//! Persists deterministic mint records keyed by pubcoin hash, the lookahead
//! mint pool, and the wallet counters that survive restarts (highest used
//! derivation count and the seed hash the records belong to).

use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use umbra_zerocoin::{DeterministicMint, MintPoolEntry};

use crate::{StorageError, StorageResult};

/// Table for deterministic mint records, keyed by pubcoin hash
const DMINTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("deterministic_mints");

/// Table for lookahead mint pool entries, keyed by pubcoin hash
const MINT_POOL: TableDefinition<&[u8], &[u8]> = TableDefinition::new("mint_pool");

/// Table for wallet counters and seed metadata
const WALLET_META: TableDefinition<&str, &[u8]> = TableDefinition::new("wallet_meta");

/// Wallet mint store
pub struct WalletStore {
    db: Arc<Database>,
}

impl WalletStore {
    /// Create new wallet store
    pub fn new(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DMINTS)?;
            let _ = write_txn.open_table(MINT_POOL)?;
            let _ = write_txn.open_table(WALLET_META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Save (or overwrite) a deterministic mint record
    pub fn save_mint(&self, mint: &DeterministicMint) -> StorageResult<()> {
        let encoded = bincode::serialize(mint)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DMINTS)?;
            table.insert(mint.pubcoin_hash.as_slice(), encoded.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Get a mint record by pubcoin hash
    pub fn get_mint(&self, pubcoin_hash: &[u8; 32]) -> StorageResult<Option<DeterministicMint>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DMINTS)?;

        let result = match table.get(pubcoin_hash.as_slice())? {
            Some(data) => {
                let bytes = data.value().to_vec();
                Some(bincode::deserialize(&bytes)?)
            }
            None => None,
        };

        Ok(result)
    }

    /// All stored mint records
    pub fn list_mints(&self) -> StorageResult<Vec<DeterministicMint>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DMINTS)?;
        let bytes_list: Vec<Vec<u8>> = table
            .iter()?
            .filter_map(|r| r.ok())
            .map(|(_, data)| data.value().to_vec())
            .collect();
        drop(table);
        drop(read_txn);

        let mut mints = Vec::new();
        for bytes in bytes_list {
            let mint: DeterministicMint = bincode::deserialize(&bytes)?;
            mints.push(mint);
        }

        Ok(mints)
    }

    /// Save a lookahead pool entry
    pub fn save_pool_entry(&self, entry: &MintPoolEntry) -> StorageResult<()> {
        let encoded = bincode::serialize(entry)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MINT_POOL)?;
            table.insert(entry.pubcoin_hash.as_slice(), encoded.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Remove a pool entry once its coin is seen on-chain
    pub fn remove_pool_entry(&self, pubcoin_hash: &[u8; 32]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MINT_POOL)?;
            table.remove(pubcoin_hash.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// All lookahead pool entries
    pub fn load_pool(&self) -> StorageResult<Vec<MintPoolEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MINT_POOL)?;
        let bytes_list: Vec<Vec<u8>> = table
            .iter()?
            .filter_map(|r| r.ok())
            .map(|(_, data)| data.value().to_vec())
            .collect();
        drop(table);
        drop(read_txn);

        let mut entries = Vec::new();
        for bytes in bytes_list {
            let entry: MintPoolEntry = bincode::deserialize(&bytes)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Record the highest derivation count handed out
    pub fn set_count_last_used(&self, count: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(WALLET_META)?;
            table.insert("count_last_used", &count.to_le_bytes()[..])?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Highest derivation count handed out, if any
    pub fn get_count_last_used(&self) -> StorageResult<Option<u32>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_META)?;

        let result = match table.get("count_last_used")? {
            Some(data) => {
                let bytes = data.value().to_vec();
                let arr: [u8; 4] = bytes
                    .try_into()
                    .map_err(|_| StorageError::InvalidData("Invalid count bytes".into()))?;
                Some(u32::from_le_bytes(arr))
            }
            None => None,
        };

        Ok(result)
    }

    /// Record which master seed the stored records derive from
    pub fn set_seed_hash(&self, seed_hash: &[u8; 32]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(WALLET_META)?;
            table.insert("seed_hash", seed_hash.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    pub fn get_seed_hash(&self) -> StorageResult<Option<[u8; 32]>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_META)?;

        let result = match table.get("seed_hash")? {
            Some(data) => {
                let bytes = data.value().to_vec();
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| StorageError::InvalidData("Invalid seed hash bytes".into()))?;
                Some(arr)
            }
            None => None,
        };

        Ok(result)
    }
}
