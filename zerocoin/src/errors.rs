//! Zerocoin primitive errors

use thiserror::Error;

use crate::denominations::Denomination;

/// Zerocoin result type
pub type ZerocoinResult<T> = Result<T, ZerocoinError>;

/// Zerocoin primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZerocoinError {
    /// Coin denomination does not match the accumulator's
    #[error("Wrong denomination: expected {expected:?}, got {got:?}")]
    WrongDenomination {
        expected: Denomination,
        got: Denomination,
    },

    /// The reserved error denomination was used where a real one is required
    #[error("Reserved denomination slot used in {0}")]
    ReservedDenomination(&'static str),

    /// Commitment failed range or primality validation
    #[error("Invalid coin commitment: {0}")]
    InvalidCoin(String),

    /// Unknown face value
    #[error("No denomination with face value {0}")]
    UnknownDenomination(u64),

    /// Checkpoint byte slice had the wrong length
    #[error("Invalid checkpoint encoding: expected {expected} bytes, got {got}")]
    InvalidCheckpointBytes { expected: usize, got: usize },
}
