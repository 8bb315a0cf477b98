//! Chain errors

use thiserror::Error;

/// Chain result type
pub type ChainResult<T> = Result<T, ChainError>;

/// Chain errors
#[derive(Error, Debug)]
pub enum ChainError {
    /// No block at the requested height
    #[error("no block at height {0}")]
    UnknownHeight(u64),

    /// Chain read lock could not be taken within the retry budget
    #[error("chain lock unavailable after {attempts} attempts")]
    LockTimeout { attempts: u32 },

    /// Shutdown was requested while waiting on the chain
    #[error("interrupted by shutdown request")]
    Interrupted,

    /// Block failed structural validation on connect
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}
