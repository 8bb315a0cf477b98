//! Lookahead mint pool
//!
//! Holds `(pubcoin hash -> derivation counter)` pairs generated ahead of
//! use, so chain sync can recognize owned coins with no secret material in
//! memory. Entries leave the pool once their coin is confirmed on-chain.

use std::collections::BTreeMap;

use umbra_zerocoin::MintPoolEntry;

/// In-memory lookahead pool, keyed by pubcoin hash
#[derive(Debug, Default)]
pub struct MintPool {
    entries: BTreeMap<[u8; 32], MintPoolEntry>,
}

impl MintPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: MintPoolEntry) {
        self.entries.insert(entry.pubcoin_hash, entry);
    }

    pub fn remove(&mut self, pubcoin_hash: &[u8; 32]) -> Option<MintPoolEntry> {
        self.entries.remove(pubcoin_hash)
    }

    pub fn contains(&self, pubcoin_hash: &[u8; 32]) -> bool {
        self.entries.contains_key(pubcoin_hash)
    }

    pub fn get(&self, pubcoin_hash: &[u8; 32]) -> Option<&MintPoolEntry> {
        self.entries.get(pubcoin_hash)
    }

    /// Highest derivation counter in the pool
    pub fn max_count(&self) -> Option<u32> {
        self.entries.values().map(|entry| entry.count).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MintPoolEntry> {
        self.entries.values()
    }

    /// Snapshot of the current entries, for iteration that mutates the pool
    pub fn snapshot(&self) -> Vec<MintPoolEntry> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(count: u32) -> MintPoolEntry {
        MintPoolEntry {
            seed_hash: [1u8; 32],
            pubcoin_hash: [count as u8; 32],
            count,
        }
    }

    #[test]
    fn test_add_remove_and_max_count() {
        let mut pool = MintPool::new();
        assert!(pool.max_count().is_none());

        for count in [3u32, 1, 7] {
            pool.add(entry(count));
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.max_count(), Some(7));
        assert!(pool.contains(&[3u8; 32]));

        let removed = pool.remove(&[7u8; 32]).unwrap();
        assert_eq!(removed.count, 7);
        assert_eq!(pool.max_count(), Some(3));
    }
}
