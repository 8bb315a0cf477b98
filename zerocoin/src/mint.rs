//! Deterministic mint records
//!
//! A [`DeterministicMint`] holds everything a wallet needs to track a
//! seed-derived coin without storing secret material: the derivation
//! counter plus hashes of the seed, serial, pubcoin, and stake handle. The
//! coin itself is always re-derivable from `(master seed, count)`.
//!
//! A [`MintPoolEntry`] is the lookahead form: just the pubcoin hash and the
//! counter, generated ahead of use so chain sync can recognize owned coins.

use serde::{Deserialize, Serialize};

use crate::denominations::Denomination;

/// Wallet record for one deterministic mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicMint {
    pub version: u8,
    /// Derivation counter; the sole handle needed to regenerate the coin
    pub count: u32,
    /// Hash of the master seed this mint derives from
    pub seed_hash: [u8; 32],
    pub serial_hash: [u8; 32],
    pub pubcoin_hash: [u8; 32],
    pub stake_hash: [u8; 32],
    pub denomination: Denomination,
    /// Height the mint was observed on-chain, 0 until seen
    pub height: u64,
    /// Minting transaction id, zeroed until seen
    pub txid: [u8; 32],
    /// Set once a spend of this mint's serial is observed
    pub used: bool,
}

impl DeterministicMint {
    pub fn new(
        version: u8,
        count: u32,
        seed_hash: [u8; 32],
        serial_hash: [u8; 32],
        pubcoin_hash: [u8; 32],
        stake_hash: [u8; 32],
        denomination: Denomination,
    ) -> Self {
        Self {
            version,
            count,
            seed_hash,
            serial_hash,
            pubcoin_hash,
            stake_hash,
            denomination,
            height: 0,
            txid: [0u8; 32],
            used: false,
        }
    }

    /// Record the on-chain location once the mint is observed
    pub fn mark_seen(&mut self, height: u64, txid: [u8; 32]) {
        self.height = height;
        self.txid = txid;
    }

    pub fn mark_used(&mut self, used: bool) {
        self.used = used;
    }

    pub fn is_seen(&self) -> bool {
        self.height > 0
    }
}

/// Lookahead pool record: pubcoin hash to derivation counter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPoolEntry {
    pub seed_hash: [u8; 32],
    pub pubcoin_hash: [u8; 32],
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_seen_lifecycle() {
        let mut mint = DeterministicMint::new(
            2,
            7,
            [1u8; 32],
            [2u8; 32],
            [3u8; 32],
            [4u8; 32],
            Denomination::Fifty,
        );
        assert!(!mint.is_seen());
        assert!(!mint.used);

        mint.mark_seen(120, [9u8; 32]);
        assert!(mint.is_seen());
        assert_eq!(mint.height, 120);

        mint.mark_used(true);
        assert!(mint.used);
    }
}
