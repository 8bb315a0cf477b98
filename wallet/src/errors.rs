//! Wallet errors

use thiserror::Error;

/// Wallet result type
pub type WalletResult<T> = Result<T, WalletError>;

/// Wallet errors
#[derive(Error, Debug)]
pub enum WalletError {
    /// The master seed is not loaded
    #[error("wallet is locked: master seed not loaded")]
    Locked,

    /// Storage error
    #[error("storage error: {0}")]
    Storage(#[from] umbra_storage::StorageError),

    /// Chain error
    #[error("chain error: {0}")]
    Chain(#[from] umbra_chain::ChainError),

    /// Coin error
    #[error("coin error: {0}")]
    Coin(#[from] umbra_zerocoin::ZerocoinError),

    /// The bounded derivation retry budget was exhausted
    #[error("coin derivation exhausted {0} attempts")]
    DerivationExhausted(u32),

    /// A regenerated coin disagrees with its stored record
    #[error("regenerated mint does not match stored record: {0}")]
    RecordMismatch(&'static str),

    /// Records in storage derive from a different master seed
    #[error("stored mints belong to a different master seed")]
    SeedMismatch,

    /// No stored record for the requested mint
    #[error("no stored mint record for pubcoin hash {0}")]
    UnknownMintRecord(String),
}
