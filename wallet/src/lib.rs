//! UMBRA Wallet
//!
//! Seed-deterministic zerocoin minting: every coin is reproducible from the
//! master seed and a counter, a lookahead pool lets chain sync recognize
//! owned coins without secrets in memory, and `sync_with_chain` rebuilds the
//! whole wallet from the seed plus chain data.

pub mod errors;
pub mod generator;
pub mod pool;

pub use errors::{WalletError, WalletResult};
pub use generator::{seed_to_coin, CommitmentCandidates, ZerocoinWallet, DEFAULT_POOL_BATCH};
pub use pool::MintPool;
