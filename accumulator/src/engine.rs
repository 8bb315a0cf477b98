//! Checkpoint recompute and validation
//!
//! Every `interval` blocks the accumulator state is recomputed and frozen
//! into the header checkpoint. The recompute at boundary `B` seeds a scratch
//! set from the previous live checkpoint (the state as of `B - 2*interval`)
//! and folds every mint in blocks `[B - 2*interval, B - interval - 1]`, so a
//! mint becomes accumulated one full interval after its block. Off-boundary
//! heights inherit the parent checkpoint verbatim, and a boundary whose
//! window held no mints keeps the parent checkpoint unchanged.
//!
//! `validate` recomputes the expected checkpoint for a candidate header and
//! requires bit-exact equality; any mismatch rejects the block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use umbra_chain::{BlockHeader, ChainIndex, ShutdownSignal};
use umbra_zerocoin::checkpoint::checksum;
use umbra_zerocoin::{Checkpoint, ZerocoinParams, DENOMINATIONS};

use crate::bootstrap::BootstrapTable;
use crate::errors::{AccumulatorError, AccumulatorResult};
use crate::map::AccumulatorSet;
use crate::store::ChecksumStore;

/// Consensus and operational parameters for the checkpoint subsystem
#[derive(Clone, Debug)]
pub struct CheckpointParams {
    /// First height at which the privacy feature is active
    pub activation_height: u64,
    /// Blocks between checkpoint recomputes
    pub interval: u64,
    /// Heights below this keep their digests memory-only
    pub legacy_cutover_height: u64,
    /// Minimum decoy mints a witness must fold in
    pub required_accumulation: usize,
    /// Chain read-lock retry budget on the spend path
    pub lock_attempts: u32,
    /// Wait per lock attempt
    pub lock_wait: Duration,
}

impl Default for CheckpointParams {
    fn default() -> Self {
        Self {
            activation_height: 20,
            interval: 10,
            legacy_cutover_height: 0,
            required_accumulation: 1,
            lock_attempts: 100,
            lock_wait: Duration::from_millis(10),
        }
    }
}

/// Periodic checkpoint recompute plus block-acceptance validation
pub struct CheckpointEngine {
    params: Arc<ZerocoinParams>,
    config: CheckpointParams,
    store: Arc<ChecksumStore>,
    bootstrap: BootstrapTable,
    reindexing: Arc<AtomicBool>,
    shutdown: ShutdownSignal,
}

impl CheckpointEngine {
    pub fn new(
        params: Arc<ZerocoinParams>,
        config: CheckpointParams,
        store: Arc<ChecksumStore>,
        bootstrap: BootstrapTable,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            params,
            config,
            store,
            bootstrap,
            reindexing: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    pub fn config(&self) -> &CheckpointParams {
        &self.config
    }

    pub fn store(&self) -> &Arc<ChecksumStore> {
        &self.store
    }

    /// Flag shared with the historical-replay driver. While set, `validate`
    /// is suppressed for replayed blocks only.
    pub fn reindex_flag(&self) -> Arc<AtomicBool> {
        self.reindexing.clone()
    }

    /// Compute the checkpoint that belongs in the header at `height`.
    ///
    /// The chain is expected to hold every block below `height`; the block
    /// at `height` itself need not exist yet.
    pub fn compute_checkpoint(
        &self,
        chain: &ChainIndex,
        height: u64,
    ) -> AccumulatorResult<Checkpoint> {
        let interval = self.config.interval;

        if height == 0 || height < self.config.activation_height {
            return Ok(Checkpoint::zero());
        }
        if height % interval != 0 {
            return Ok(chain.checkpoint_at(height - 1)?);
        }

        let parent_checkpoint = chain.checkpoint_at(height - 1)?;
        let seed_height = height.saturating_sub(2 * interval);

        let mut scratch = AccumulatorSet::new(self.params.clone());
        if let Some(entry) = self.bootstrap.exact(seed_height) {
            scratch.load_bootstrap(entry);
        } else {
            match scratch.load_checkpoint(&parent_checkpoint, &self.store) {
                Ok(()) => {}
                Err(AccumulatorError::MissingChecksum(missing)) => {
                    // store lost the seed digests; reseed from the nearest
                    // known-good table entry below the seed height
                    let entry = self
                        .bootstrap
                        .closest_below(seed_height)
                        .ok_or(AccumulatorError::MissingChecksum(missing))?;
                    warn!(
                        height,
                        missing,
                        fallback = entry.height,
                        "seed checkpoint unresolvable, reseeding from bootstrap table"
                    );
                    scratch.load_bootstrap(entry);
                }
                Err(err) => return Err(err),
            }
        }

        // fold mints in [height - 2*interval, height - interval - 1]
        let window_end = height - interval;
        let mut added = 0usize;
        for h in seed_height..window_end {
            if self.shutdown.requested() {
                return Err(AccumulatorError::Interrupted);
            }
            let block = chain.block_at(h)?;
            for tx in &block.transactions {
                for coin in tx.mint_coins() {
                    scratch.accumulate_trusted(coin)?;
                    added += 1;
                }
            }
        }

        if added == 0 {
            debug!(height, "quiet checkpoint window, inheriting parent checkpoint");
            return Ok(parent_checkpoint);
        }

        for denom in DENOMINATIONS {
            let value = scratch.value(denom)?;
            self.store.put(checksum(value), value, height)?;
        }

        let checkpoint = scratch.checkpoint();
        info!(height, mints = added, %checkpoint, "recomputed accumulator checkpoint");
        Ok(checkpoint)
    }

    /// Validate a candidate header's claimed checkpoint against a full
    /// recompute. `is_new_block` must be true for anything received from the
    /// network; the reindex flag only suppresses the check for replayed
    /// history.
    pub fn validate(
        &self,
        chain: &ChainIndex,
        header: &BlockHeader,
        is_new_block: bool,
    ) -> AccumulatorResult<()> {
        if !is_new_block && self.reindexing.load(Ordering::SeqCst) {
            debug!(height = header.height, "checkpoint validation skipped during reindex");
            return Ok(());
        }

        let expected = self.compute_checkpoint(chain, header.height)?;
        if expected != header.accumulator_checkpoint {
            warn!(
                height = header.height,
                %expected,
                claimed = %header.accumulator_checkpoint,
                "rejecting block with bad accumulator checkpoint"
            );
            return Err(AccumulatorError::CheckpointMismatch {
                height: header.height,
                expected,
                found: header.accumulator_checkpoint,
            });
        }
        Ok(())
    }
}
