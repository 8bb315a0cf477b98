//! Spend-time witness construction
//!
//! Builds a membership witness for a previously minted coin without
//! revealing which coin it is. The depth of the walk (how many checkpoint
//! boundaries of decoys the witness folds in) is the caller's security
//! level plus a small random jitter, bounded by a safety floor two full
//! intervals behind the tip.
//!
//! The walk is two-phase: first a scan picks the stopping boundary by
//! counting crossed checkpoint boundaries, then a fold pass accumulates
//! every same-denomination mint in the exact window the stopping
//! checkpoint covers, skipping the target coin itself. The final
//! accumulator is always re-fetched from the checksum store at the
//! stopping checkpoint, never taken from the local fold, so the witness
//! verifies against the same value every other node derives.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};
use umbra_chain::{read_retry, SharedChain, ShutdownSignal};
use umbra_zerocoin::{Accumulator, AccumulatorWitness, PublicCoin, ZerocoinParams};

use crate::engine::CheckpointParams;
use crate::errors::{AccumulatorError, AccumulatorResult};
use crate::store::ChecksumStore;

/// Sentinel security level: use everything accumulated up to the floor
pub const SECURITY_LEVEL_MAX: u8 = 100;

/// Largest jitter added to a requested security level
const SECURITY_JITTER: u8 = 7;

/// A successfully built witness with its context
pub struct WitnessJob {
    /// The membership witness for the target coin
    pub witness: AccumulatorWitness,
    /// The authoritative accumulator the witness verifies against
    pub accumulator: Accumulator,
    /// Decoy mints folded into the witness (target excluded)
    pub mints_added: usize,
}

/// Builds spend witnesses against the live chain
pub struct WitnessBuilder {
    params: Arc<ZerocoinParams>,
    config: CheckpointParams,
    store: Arc<ChecksumStore>,
    shutdown: ShutdownSignal,
}

impl WitnessBuilder {
    pub fn new(
        params: Arc<ZerocoinParams>,
        config: CheckpointParams,
        store: Arc<ChecksumStore>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            params,
            config,
            store,
            shutdown,
        }
    }

    /// Build a witness for `coin`.
    ///
    /// `security_level` is 0-99, or [`SECURITY_LEVEL_MAX`] to walk all the
    /// way to the safety floor. `target_height`, when given, overrides the
    /// randomized stopping point with a fixed checkpoint boundary.
    pub fn build_witness(
        &self,
        chain: &SharedChain,
        coin: &PublicCoin,
        security_level: u8,
        target_height: Option<u64>,
    ) -> AccumulatorResult<WitnessJob> {
        let interval = self.config.interval;
        let guard = read_retry(
            chain,
            self.config.lock_attempts,
            self.config.lock_wait,
            &self.shutdown,
        )?;

        let location = guard
            .find_mint(&coin.hash())
            .filter(|loc| loc.denomination == coin.denomination())
            .ok_or(AccumulatorError::UnknownMint)?;
        let tip = guard
            .tip_height()
            .ok_or(AccumulatorError::UnknownMint)?;

        let mint_height = location.height;
        let bucket_start = mint_height - mint_height % interval + interval;
        // the first boundary whose checkpoint already covers the mint
        let min_stop = bucket_start + interval;
        let safety = tip.saturating_sub(2 * interval);
        let safety_boundary = safety - safety % interval;
        if min_stop > safety_boundary {
            debug!(
                mint_height,
                tip, "mint still inside the two-interval safety floor"
            );
            return Err(AccumulatorError::ImmatureMint);
        }

        let randomized = randomize_security_level(security_level);
        let stop = match target_height {
            Some(height) => {
                let boundary = height - height % interval;
                if boundary < min_stop || boundary > safety_boundary {
                    return Err(AccumulatorError::ImmatureMint);
                }
                boundary
            }
            None => self.pick_stop_boundary(&guard, min_stop, safety_boundary, randomized)?,
        };

        // base state: the checkpoint at the mint's bucket boundary, which
        // covers everything before the fold window
        let base_slice = guard
            .checkpoint_at(bucket_start)?
            .slice(coin.denomination())?;
        let base_value = if base_slice == 0 {
            self.params.accumulator_base.clone()
        } else {
            self.store
                .get(base_slice, false)?
                .ok_or(AccumulatorError::MissingChecksum(base_slice))?
        };

        let mut witness = AccumulatorWitness::new(
            Accumulator::with_value(self.params.clone(), coin.denomination(), base_value),
            coin.clone(),
        );

        // fold [bucket_start - interval, stop - interval - 1], the exact
        // window between the base checkpoint and the stopping checkpoint
        let mut mints_added = 0usize;
        for height in (bucket_start - interval)..(stop - interval) {
            if self.shutdown.requested() {
                return Err(AccumulatorError::Interrupted);
            }
            let block = guard.block_at(height)?;
            for mint in block.mints_of(coin.denomination()) {
                if witness.add_element(mint) {
                    mints_added += 1;
                }
            }
        }

        if mints_added < self.config.required_accumulation {
            return Err(AccumulatorError::InsufficientAccumulation {
                required: self.config.required_accumulation,
                added: mints_added,
            });
        }

        // authoritative final value: re-fetched from the store, never the
        // local fold
        let final_slice = guard.checkpoint_at(stop)?.slice(coin.denomination())?;
        let final_value = self
            .store
            .get(final_slice, false)?
            .ok_or(AccumulatorError::MissingChecksum(final_slice))?;
        let accumulator =
            Accumulator::with_value(self.params.clone(), coin.denomination(), final_value);

        if !witness.verify(&accumulator, coin) {
            return Err(AccumulatorError::WitnessVerification);
        }

        info!(
            mint_height,
            stop, mints_added, "built and verified spend witness"
        );
        Ok(WitnessJob {
            witness,
            accumulator,
            mints_added,
        })
    }

    /// Scan forward counting crossed checkpoint boundaries until the
    /// randomized security level is met, capped at the safety floor.
    fn pick_stop_boundary(
        &self,
        chain: &umbra_chain::ChainIndex,
        min_stop: u64,
        safety_boundary: u64,
        randomized: u8,
    ) -> AccumulatorResult<u64> {
        if randomized >= SECURITY_LEVEL_MAX {
            return Ok(safety_boundary);
        }
        let needed = u32::from(randomized.max(1));

        let mut crossed = 0u32;
        let scan_start = min_stop.saturating_sub(2 * self.config.interval).max(1);
        for height in scan_start..=safety_boundary {
            if self.shutdown.requested() {
                return Err(AccumulatorError::Interrupted);
            }
            if chain.checkpoint_at(height)? != chain.checkpoint_at(height - 1)? {
                crossed += 1;
                if crossed >= needed && height >= min_stop {
                    return Ok(height - height % self.config.interval);
                }
            }
        }
        Ok(safety_boundary)
    }
}

/// Add the anonymity jitter: a small non-negative offset, clamped below the
/// "use everything" sentinel unless that sentinel was explicitly requested.
fn randomize_security_level(requested: u8) -> u8 {
    if requested >= SECURITY_LEVEL_MAX {
        return SECURITY_LEVEL_MAX;
    }
    let jitter: u8 = rand::thread_rng().gen_range(0..=SECURITY_JITTER);
    requested.saturating_add(jitter).min(SECURITY_LEVEL_MAX - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_never_reaches_sentinel() {
        for _ in 0..200 {
            let level = randomize_security_level(97);
            assert!(level < SECURITY_LEVEL_MAX);
        }
    }

    #[test]
    fn test_sentinel_passes_through() {
        assert_eq!(randomize_security_level(100), SECURITY_LEVEL_MAX);
        assert_eq!(randomize_security_level(255), SECURITY_LEVEL_MAX);
    }

    #[test]
    fn test_jitter_is_bounded() {
        for _ in 0..200 {
            let level = randomize_security_level(10);
            assert!((10..=10 + SECURITY_JITTER).contains(&level));
        }
    }
}
