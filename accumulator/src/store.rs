//! Checksum reverse index
//!
//! Maps a 32-bit checkpoint slice back to the full accumulator value it
//! digests. Two tiers: a hot in-memory map for everything seen this run, and
//! the redb-backed durable store for values that must survive restarts.
//! Durable writes are gated on the legacy-parameter cutover height so the
//! pre-cutover era never grows the database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use num_bigint::BigUint;
use parking_lot::RwLock;
use tracing::{debug, trace};
use umbra_chain::ChainIndex;
use umbra_storage::{AccumulatorValueRecord, Storage};
use umbra_zerocoin::{Checksum, ZerocoinParams};

use crate::errors::AccumulatorResult;

/// Hot cache + durable reverse index from checksum to accumulator value
pub struct ChecksumStore {
    cache: RwLock<HashMap<Checksum, BigUint>>,
    durable: Arc<Storage>,
    legacy_cutover_height: u64,
}

impl ChecksumStore {
    pub fn new(durable: Arc<Storage>, legacy_cutover_height: u64) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            durable,
            legacy_cutover_height,
        }
    }

    /// Record a checksum's accumulator value. The hot cache always takes the
    /// value; the durable tier only past the legacy cutover. Overwrites are
    /// idempotent.
    pub fn put(&self, checksum: Checksum, value: &BigUint, height: u64) -> AccumulatorResult<()> {
        self.cache.write().insert(checksum, value.clone());
        if height >= self.legacy_cutover_height {
            self.durable
                .accumulators
                .put_value(checksum, &AccumulatorValueRecord::new(value, height))?;
        } else {
            trace!(checksum, height, "legacy-era checksum kept memory-only");
        }
        Ok(())
    }

    /// Look a checksum up, hot cache first. With `memory_only` the durable
    /// tier is never consulted. Absence is `None`, not an error; callers on
    /// consensus paths turn it into `MissingChecksum`.
    pub fn get(&self, checksum: Checksum, memory_only: bool) -> AccumulatorResult<Option<BigUint>> {
        if let Some(value) = self.cache.read().get(&checksum) {
            return Ok(Some(value.clone()));
        }
        if memory_only {
            return Ok(None);
        }
        match self.durable.accumulators.get_value(checksum)? {
            Some(record) => {
                let value = record.to_biguint();
                self.cache.write().insert(checksum, value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Lookup that maps absence to the accumulator base, mirroring callers
    /// that treat an unknown digest as "nothing accumulated yet"
    pub fn get_or_identity(
        &self,
        checksum: Checksum,
        params: &ZerocoinParams,
    ) -> AccumulatorResult<BigUint> {
        Ok(self
            .get(checksum, false)?
            .unwrap_or_else(|| params.accumulator_base.clone()))
    }

    /// Remove a checksum from both tiers
    pub fn erase(&self, checksum: Checksum) -> AccumulatorResult<()> {
        self.cache.write().remove(&checksum);
        self.durable.accumulators.erase_value(checksum)?;
        Ok(())
    }

    /// Prune checksums recorded for interval boundaries in
    /// `[start_height, end_height]`.
    ///
    /// A boundary's digests are erased only when the immediately following
    /// boundary's checkpoint no longer carries them; the last boundary in
    /// range is never touched, so anything the checkpoint at `end_height`
    /// (or later) still references survives. Returns the number of digests
    /// erased.
    pub fn prune_range(
        &self,
        start_height: u64,
        end_height: u64,
        interval: u64,
        chain: &ChainIndex,
    ) -> AccumulatorResult<usize> {
        let mut erased = 0usize;
        let mut boundary = start_height + (interval - start_height % interval) % interval;

        while boundary + interval <= end_height {
            let current = chain.checkpoint_at(boundary)?;
            let next = chain.checkpoint_at(boundary + interval)?;
            let kept: HashSet<Checksum> = next.slots().into_iter().collect();

            for checksum in current.slots() {
                if checksum != 0 && !kept.contains(&checksum) {
                    self.erase(checksum)?;
                    erased += 1;
                }
            }
            boundary += interval;
        }

        debug!(start_height, end_height, erased, "pruned checksum range");
        Ok(erased)
    }

    /// Number of hot-cache entries (durable tier not counted)
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(cutover: u64) -> (tempfile::TempDir, ChecksumStore) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path().join("test.db")).unwrap());
        let store = ChecksumStore::new(storage, cutover);
        (dir, store)
    }

    #[test]
    fn test_put_get_both_tiers() {
        let (_dir, store) = open_store(0);
        let value = BigUint::from(0xABCDu32);
        store.put(7, &value, 100).unwrap();

        assert_eq!(store.get(7, true).unwrap(), Some(value.clone()));
        assert_eq!(store.get(7, false).unwrap(), Some(value));
        assert_eq!(store.get(8, false).unwrap(), None);
    }

    #[test]
    fn test_legacy_gate_keeps_memory_only() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path().join("test.db")).unwrap());
        let value = BigUint::from(42u8);
        {
            let store = ChecksumStore::new(storage.clone(), 500);
            store.put(7, &value, 100).unwrap();
            assert_eq!(store.get(7, true).unwrap(), Some(value.clone()));
        }
        // a fresh store sees nothing durable for the pre-cutover write
        let store = ChecksumStore::new(storage, 500);
        assert_eq!(store.get(7, false).unwrap(), None);

        store.put(9, &value, 600).unwrap();
        let reopened = ChecksumStore::new(store.durable.clone(), 500);
        assert_eq!(reopened.get(9, false).unwrap(), Some(value));
    }

    #[test]
    fn test_erase_removes_both_tiers() {
        let (_dir, store) = open_store(0);
        let value = BigUint::from(9u8);
        store.put(3, &value, 10).unwrap();
        store.erase(3).unwrap();
        assert_eq!(store.get(3, false).unwrap(), None);
    }

    #[test]
    fn test_get_or_identity_on_missing() {
        let (_dir, store) = open_store(0);
        let params = ZerocoinParams::testing();
        assert_eq!(
            store.get_or_identity(99, &params).unwrap(),
            params.accumulator_base
        );
    }
}
