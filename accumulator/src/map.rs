//! Per-denomination accumulator set
//!
//! One accumulator per spendable denomination, always fully populated. A set
//! is scratch state: the checkpoint engine and the witness builder each build
//! their own instance per pass, so the set itself needs no locking and does
//! no I/O beyond the checkpoint load.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;
use umbra_zerocoin::checkpoint::{checksum, Checkpoint, Checksum, CHECKPOINT_SLOTS};
use umbra_zerocoin::{Accumulator, Denomination, PublicCoin, ZerocoinError, ZerocoinParams, DENOMINATIONS};

use crate::bootstrap::BootstrapCheckpoint;
use crate::errors::{AccumulatorError, AccumulatorResult};
use crate::store::ChecksumStore;

/// One accumulator per denomination, in canonical order
pub struct AccumulatorSet {
    params: Arc<ZerocoinParams>,
    accumulators: Vec<Accumulator>,
}

impl AccumulatorSet {
    /// Fresh set with every denomination at the accumulator base
    pub fn new(params: Arc<ZerocoinParams>) -> Self {
        let accumulators = DENOMINATIONS
            .iter()
            .map(|denom| Accumulator::new(params.clone(), *denom))
            .collect();
        Self {
            params,
            accumulators,
        }
    }

    /// Reinitialize every denomination to the accumulator base
    pub fn reset(&mut self) {
        for accumulator in &mut self.accumulators {
            accumulator.set_value(self.params.accumulator_base.clone());
        }
    }

    /// Restore the set from a packed checkpoint via the checksum store.
    ///
    /// A zero slice denotes pre-activation state and restores to the base;
    /// any other slice must resolve through the store or the whole load
    /// fails with `MissingChecksum`.
    pub fn load_checkpoint(
        &mut self,
        checkpoint: &Checkpoint,
        store: &ChecksumStore,
    ) -> AccumulatorResult<()> {
        for (index, denom) in DENOMINATIONS.iter().enumerate() {
            let slice = checkpoint.slice(*denom)?;
            let value = if slice == 0 {
                self.params.accumulator_base.clone()
            } else {
                store
                    .get(slice, false)?
                    .ok_or(AccumulatorError::MissingChecksum(slice))?
            };
            self.accumulators[index].set_value(value);
        }
        Ok(())
    }

    /// Restore the set from an embedded bootstrap table entry
    pub fn load_bootstrap(&mut self, entry: &BootstrapCheckpoint) {
        debug!(height = entry.height, "seeding accumulator set from bootstrap table");
        for (accumulator, value) in self.accumulators.iter_mut().zip(entry.values.iter()) {
            accumulator.set_value(value.clone());
        }
    }

    /// Fold a coin in after full commitment validation
    pub fn accumulate_validated(&mut self, coin: &PublicCoin) -> AccumulatorResult<()> {
        let index = self.slot_index(coin.denomination())?;
        self.accumulators[index].accumulate(coin)?;
        Ok(())
    }

    /// Fold a coin in without revalidation. Only for coins consensus already
    /// accepted once.
    pub fn accumulate_trusted(&mut self, coin: &PublicCoin) -> AccumulatorResult<()> {
        let index = self.slot_index(coin.denomination())?;
        self.accumulators[index].increment(coin.value());
        Ok(())
    }

    /// Current value for one denomination
    pub fn value(&self, denomination: Denomination) -> AccumulatorResult<&BigUint> {
        let index = self.slot_index(denomination)?;
        Ok(self.accumulators[index].value())
    }

    /// Digest every denomination's value and pack the checkpoint
    pub fn checkpoint(&self) -> Checkpoint {
        let mut slots = [0 as Checksum; CHECKPOINT_SLOTS];
        for (slot, accumulator) in slots.iter_mut().zip(self.accumulators.iter()) {
            *slot = checksum(accumulator.value());
        }
        Checkpoint::pack(slots)
    }

    fn slot_index(&self, denomination: Denomination) -> AccumulatorResult<usize> {
        denomination
            .index()
            .ok_or_else(|| ZerocoinError::ReservedDenomination("accumulator set").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prime_coin(value: u32, denom: Denomination) -> PublicCoin {
        PublicCoin::new(BigUint::from(value), denom)
    }

    #[test]
    fn test_reset_returns_all_to_base() {
        let params = ZerocoinParams::testing();
        let mut set = AccumulatorSet::new(params.clone());
        set.accumulate_validated(&prime_coin(104_729, Denomination::Ten))
            .unwrap();
        assert_ne!(set.value(Denomination::Ten).unwrap(), &params.accumulator_base);

        set.reset();
        for denom in DENOMINATIONS {
            assert_eq!(set.value(denom).unwrap(), &params.accumulator_base);
        }
    }

    #[test]
    fn test_one_coin_moves_only_its_slice() {
        let params = ZerocoinParams::testing();
        let mut set = AccumulatorSet::new(params.clone());
        let before = set.checkpoint();

        set.accumulate_validated(&prime_coin(104_729, Denomination::Ten))
            .unwrap();
        let after = set.checkpoint();

        for denom in DENOMINATIONS {
            let moved = after.slice(denom).unwrap() != before.slice(denom).unwrap();
            assert_eq!(moved, denom == Denomination::Ten);
            let at_base = set.value(denom).unwrap() == &params.accumulator_base;
            assert_eq!(at_base, denom != Denomination::Ten);
        }
    }

    #[test]
    fn test_rejects_reserved_denomination() {
        let params = ZerocoinParams::testing();
        let mut set = AccumulatorSet::new(params);
        let coin = prime_coin(104_729, Denomination::Error);
        assert!(set.accumulate_trusted(&coin).is_err());
        assert!(set.value(Denomination::Error).is_err());
    }

    #[test]
    fn test_validated_rejects_composite() {
        let params = ZerocoinParams::testing();
        let mut set = AccumulatorSet::new(params);
        assert!(set
            .accumulate_validated(&prime_coin(104_730, Denomination::Ten))
            .is_err());
    }
}
