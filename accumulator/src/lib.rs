//! UMBRA Accumulator Subsystem
//!
//! The consensus-critical half of the privacy feature:
//! - [`AccumulatorSet`]: one scratch accumulator per denomination
//! - [`ChecksumStore`]: hot + durable reverse index from checksum to value
//! - [`CheckpointEngine`]: periodic recompute and block-acceptance validation
//! - [`WitnessBuilder`]: the spend-path walk that produces verified
//!   membership witnesses
//! - [`BootstrapTable`]: embedded known-good checkpoints per network

pub mod bootstrap;
pub mod engine;
pub mod errors;
pub mod map;
pub mod store;
pub mod witness;

pub use bootstrap::{BootstrapCheckpoint, BootstrapTable, Network};
pub use engine::{CheckpointEngine, CheckpointParams};
pub use errors::{AccumulatorError, AccumulatorResult};
pub use map::AccumulatorSet;
pub use store::ChecksumStore;
pub use witness::{WitnessBuilder, WitnessJob, SECURITY_LEVEL_MAX};
