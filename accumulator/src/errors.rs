//! Accumulator subsystem errors
//!
//! Variants follow the taxonomy the callers care about: consensus failures
//! (`CheckpointMismatch`, invalid coins) reject the block and are never
//! retried; liveness failures (`MissingChecksum`, lock/interruption errors
//! surfaced through `Chain`) are retryable later; policy failures
//! (`InsufficientAccumulation`, `ImmatureMint`) name the exact shortfall for
//! the spender.

use thiserror::Error;
use umbra_zerocoin::Checkpoint;

/// Accumulator result type
pub type AccumulatorResult<T> = Result<T, AccumulatorError>;

/// Accumulator subsystem errors
#[derive(Error, Debug)]
pub enum AccumulatorError {
    /// A block's claimed checkpoint does not match the recomputed one
    #[error("checkpoint mismatch at height {height}: expected {expected}, block claims {found}")]
    CheckpointMismatch {
        height: u64,
        expected: Checkpoint,
        found: Checkpoint,
    },

    /// Coin or codec error
    #[error("coin error: {0}")]
    Coin(#[from] umbra_zerocoin::ZerocoinError),

    /// Chain access error (unknown height, lock timeout, interruption)
    #[error("chain error: {0}")]
    Chain(#[from] umbra_chain::ChainError),

    /// Durable tier error
    #[error("storage error: {0}")]
    Storage(#[from] umbra_storage::StorageError),

    /// No accumulator value recorded for a checksum the caller needs
    #[error("no accumulator value stored for checksum {0:#010x}")]
    MissingChecksum(u32),

    /// The target coin is not in the mint index
    #[error("mint not found in the chain's mint index")]
    UnknownMint,

    /// The mint is too recent for the two-interval safety floor
    #[error("mint too recent: must be at least two checkpoint intervals behind the tip")]
    ImmatureMint,

    /// Fewer decoys than the protocol minimum were available
    #[error("insufficient accumulation: {required} mints required, {added} accumulated")]
    InsufficientAccumulation { required: usize, added: usize },

    /// Shutdown was requested mid-scan
    #[error("interrupted by shutdown request")]
    Interrupted,

    /// Malformed embedded bootstrap checkpoint table
    #[error("bootstrap checkpoint table: {0}")]
    Bootstrap(String),

    /// A freshly built witness failed its own verification
    #[error("witness failed self-verification against the final accumulator")]
    WitnessVerification,
}
