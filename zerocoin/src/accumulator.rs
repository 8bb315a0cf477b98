//! One-way accumulators and membership witnesses
//!
//! The accumulator is `base^(c1 * c2 * ... * cn) mod N` for the coin
//! commitments folded so far. Folding is one-directional: there is no
//! removal, and the fold is commutative, so the final value depends only on
//! the set of coins.
//!
//! A witness for coin `c` is the accumulator of every member except `c`;
//! verification folds `c` into the witness and compares against the full
//! accumulator.

use std::sync::Arc;

use num_bigint::BigUint;

use crate::coin::PublicCoin;
use crate::denominations::Denomination;
use crate::errors::{ZerocoinError, ZerocoinResult};
use crate::params::ZerocoinParams;

/// Accumulator for a single denomination
#[derive(Clone, Debug)]
pub struct Accumulator {
    params: Arc<ZerocoinParams>,
    denomination: Denomination,
    value: BigUint,
}

impl Accumulator {
    /// Fresh accumulator at the group identity (the accumulator base)
    pub fn new(params: Arc<ZerocoinParams>, denomination: Denomination) -> Self {
        let value = params.accumulator_base.clone();
        Self { params, denomination, value }
    }

    /// Accumulator restored from a known value (e.g. a checkpoint)
    pub fn with_value(params: Arc<ZerocoinParams>, denomination: Denomination, value: BigUint) -> Self {
        Self { params, denomination, value }
    }

    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// True when no coin has been folded in yet
    pub fn is_identity(&self) -> bool {
        self.value == self.params.accumulator_base
    }

    /// Overwrite the value (checkpoint restore)
    pub fn set_value(&mut self, value: BigUint) {
        self.value = value;
    }

    /// Validated fold: rejects wrong denominations and malformed
    /// commitments before touching the value.
    pub fn accumulate(&mut self, coin: &PublicCoin) -> ZerocoinResult<()> {
        if coin.denomination() != self.denomination {
            return Err(ZerocoinError::WrongDenomination {
                expected: self.denomination,
                got: coin.denomination(),
            });
        }
        if !coin.validate(&self.params) {
            return Err(ZerocoinError::InvalidCoin(format!(
                "commitment failed range/primality check for denomination {}",
                coin.denomination()
            )));
        }
        self.increment(coin.value());
        Ok(())
    }

    /// Trusted fold: the algebraic operation only. Callers assert the value
    /// was validated when first accepted into consensus.
    pub fn increment(&mut self, coin_value: &BigUint) {
        self.value = self.value.modpow(coin_value, &self.params.accumulator_modulus);
    }
}

impl PartialEq for Accumulator {
    fn eq(&self, other: &Self) -> bool {
        self.denomination == other.denomination && self.value == other.value
    }
}

impl Eq for Accumulator {}

/// Membership witness for a single coin
#[derive(Clone, Debug)]
pub struct AccumulatorWitness {
    witness: Accumulator,
    element: PublicCoin,
}

impl AccumulatorWitness {
    /// Start a witness from the accumulator state that precedes the
    /// element's own inclusion.
    pub fn new(checkpoint: Accumulator, element: PublicCoin) -> Self {
        Self { witness: checkpoint, element }
    }

    /// Fold another member in, skipping the element itself. Returns true
    /// when the coin was actually folded.
    pub fn add_element(&mut self, coin: &PublicCoin) -> bool {
        if coin == &self.element {
            return false;
        }
        self.witness.increment(coin.value());
        true
    }

    pub fn value(&self) -> &BigUint {
        self.witness.value()
    }

    pub fn element(&self) -> &PublicCoin {
        &self.element
    }

    /// Verify against the full accumulator: witness + element must land
    /// exactly on `accumulator`, and the element must be the claimed coin.
    pub fn verify(&self, accumulator: &Accumulator, coin: &PublicCoin) -> bool {
        if &self.element != coin {
            return false;
        }
        let mut folded = self.witness.clone();
        folded.increment(self.element.value());
        folded == *accumulator
    }
}
