//! Accumulator value storage
//!
//! The on-disk side of the checksum reverse index: 32-bit checksum to the
//! full accumulator value it digests, plus the height the value was first
//! recorded at. Checksums are lossy, so this table is the only way back from
//! an embedded checkpoint to usable accumulator state.

use std::sync::Arc;

use num_bigint::BigUint;
use redb::{Database, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::{StorageError, StorageResult};

/// Table for checksum -> accumulator value records
const ACC_VALUES: TableDefinition<u32, &[u8]> = TableDefinition::new("accumulator_values");

/// One stored accumulator value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatorValueRecord {
    /// Big-endian bytes of the accumulator value
    pub value: Vec<u8>,
    /// Height the value was first recorded at
    pub height: u64,
}

impl AccumulatorValueRecord {
    pub fn new(value: &BigUint, height: u64) -> Self {
        Self {
            value: value.to_bytes_be(),
            height,
        }
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.value)
    }
}

/// Accumulator value store keyed by checksum
pub struct AccumulatorValueStore {
    db: Arc<Database>,
}

impl AccumulatorValueStore {
    /// Create new accumulator value store
    pub fn new(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACC_VALUES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Save an accumulator value under its checksum
    pub fn put_value(&self, checksum: u32, record: &AccumulatorValueRecord) -> StorageResult<()> {
        if record.value.is_empty() {
            return Err(StorageError::InvalidData(
                "empty accumulator value".to_string(),
            ));
        }
        let encoded = bincode::serialize(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ACC_VALUES)?;
            table.insert(checksum, encoded.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Get the accumulator value recorded for a checksum
    pub fn get_value(&self, checksum: u32) -> StorageResult<Option<AccumulatorValueRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACC_VALUES)?;

        let result = match table.get(checksum)? {
            Some(data) => {
                let bytes = data.value().to_vec();
                Some(bincode::deserialize(&bytes)?)
            }
            None => None,
        };

        Ok(result)
    }

    /// Remove a checksum's record. Removing an absent key is not an error.
    pub fn erase_value(&self, checksum: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ACC_VALUES)?;
            table.remove(checksum)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACC_VALUES)?;
        Ok(table.len()?)
    }
}
