//! UMBRA Zerocoin Primitives
//!
//! The opaque cryptographic layer consumed by the accumulator subsystem:
//! - Coin denominations and the canonical denomination table
//! - Pedersen-style coin commitments with range + primality validation
//! - One-way accumulators ("fold a value in") and membership witnesses
//! - The 32-bit checksum / packed checkpoint codec
//! - Deterministic-mint and mint-pool record types
//!
//! Group arithmetic is plain modular exponentiation over `num_bigint`
//! integers. Parameter sets are fixed constants; see [`params`].

pub mod accumulator;
pub mod arith;
pub mod checkpoint;
pub mod coin;
pub mod denominations;
pub mod errors;
pub mod mint;
pub mod params;

pub use accumulator::{Accumulator, AccumulatorWitness};
pub use checkpoint::{checksum, Checkpoint, Checksum, CHECKPOINT_SLOTS};
pub use coin::{pubcoin_hash, serial_hash, stake_hash, CoinKeypair, PrivateCoin, PublicCoin};
pub use denominations::{Denomination, DENOMINATIONS};
pub use errors::{ZerocoinError, ZerocoinResult};
pub use mint::{DeterministicMint, MintPoolEntry};
pub use params::ZerocoinParams;
