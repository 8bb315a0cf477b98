//! UMBRA Chain
//!
//! Block and transaction types, the in-memory chain index with mint/spend
//! lookup tables, and the cooperative shutdown signal shared by long-running
//! chain walkers.

pub mod block;
pub mod errors;
pub mod index;
pub mod shutdown;

pub use block::{Block, BlockHeader, Transaction, TxOut};
pub use errors::{ChainError, ChainResult};
pub use index::{read_retry, shared, ChainIndex, MintLocation, SharedChain, SpendLocation};
pub use shutdown::ShutdownSignal;
