//! Coin denominations
//!
//! A small closed set of face values, totally ordered by value. The
//! `Error` slot is reserved: it never enters an accumulator and exists so
//! that malformed on-chain data has somewhere explicit to land.

use serde::{Deserialize, Serialize};

use crate::errors::{ZerocoinError, ZerocoinResult};

/// Supported coin denominations
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Denomination {
    /// Reserved slot for malformed or unrecognized values
    Error = 0,
    One = 1,
    Ten = 10,
    TwentyFive = 25,
    Fifty = 50,
    OneHundred = 100,
}

/// Canonical denomination order: ascending by face value.
///
/// Index in this table is the checkpoint slot index (slot 0 packs into the
/// most significant 32 bits).
pub const DENOMINATIONS: [Denomination; 5] = [
    Denomination::One,
    Denomination::Ten,
    Denomination::TwentyFive,
    Denomination::Fifty,
    Denomination::OneHundred,
];

impl Denomination {
    /// Face value in base units
    pub fn value(self) -> u64 {
        self as u64
    }

    /// Denomination for an exact face value
    pub fn from_value(value: u64) -> ZerocoinResult<Self> {
        DENOMINATIONS
            .iter()
            .copied()
            .find(|d| d.value() == value)
            .ok_or(ZerocoinError::UnknownDenomination(value))
    }

    /// Position in the canonical table, `None` for the reserved slot
    pub fn index(self) -> Option<usize> {
        DENOMINATIONS.iter().position(|d| *d == self)
    }

    /// Denomination at a canonical table position
    pub fn from_index(index: usize) -> Option<Self> {
        DENOMINATIONS.get(index).copied()
    }

    /// True for every denomination except the reserved slot
    pub fn is_spendable(self) -> bool {
        self != Denomination::Error
    }
}

impl std::fmt::Display for Denomination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
