//! Coin commitments
//!
//! A public coin is a Pedersen-style commitment `g^serial * h^randomness
//! mod p` tagged with its denomination. A commitment is valid when it lands
//! in the configured numeric range and is prime (the primality requirement
//! is what lets the accumulator treat coins as exponents).

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::arith::{is_prime, to_be_bytes};
use crate::denominations::Denomination;
use crate::params::ZerocoinParams;

/// Public coin: the on-chain commitment plus its denomination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicCoin {
    value: BigUint,
    denomination: Denomination,
}

impl PublicCoin {
    pub fn new(value: BigUint, denomination: Denomination) -> Self {
        Self { value, denomination }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn denomination(&self) -> Denomination {
        self.denomination
    }

    /// Full commitment validation: real denomination, range, primality
    pub fn validate(&self, params: &ZerocoinParams) -> bool {
        self.denomination.is_spendable() && is_valid_coin_value(params, &self.value)
    }

    /// Hash handle used by the mint index and the mint pool
    pub fn hash(&self) -> [u8; 32] {
        pubcoin_hash(&self.value)
    }
}

/// Range + primality predicate on a commitment value
pub fn is_valid_coin_value(params: &ZerocoinParams, value: &BigUint) -> bool {
    value >= &params.min_coin_value && value <= &params.max_coin_value && is_prime(value)
}

/// Pedersen commitment to a serial number
pub fn commit(params: &ZerocoinParams, serial: &BigUint, randomness: &BigUint) -> BigUint {
    let group = &params.coin_commitment_group;
    let gs = group.g.modpow(serial, &group.modulus);
    let hr = group.h.modpow(randomness, &group.modulus);
    (gs * hr) % &group.modulus
}

/// Coin-bound keypair. The secret half signs spends; only structural
/// validity matters here (a nonzero scalar below the group order).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinKeypair {
    secret: [u8; 32],
    public: [u8; 32],
}

impl CoinKeypair {
    /// Build a keypair from a secret scalar seed. Returns `None` when the
    /// seed is not a valid scalar, so callers can re-hash and retry.
    pub fn from_secret(params: &ZerocoinParams, secret: [u8; 32]) -> Option<Self> {
        let scalar = BigUint::from_bytes_be(&secret);
        if scalar == BigUint::from(0u8) || scalar >= params.coin_commitment_group.order {
            return None;
        }
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"umbra.coin.pubkey");
        hasher.update(&secret);
        let public = *hasher.finalize().as_bytes();
        Some(Self { secret, public })
    }

    pub fn public(&self) -> &[u8; 32] {
        &self.public
    }

    pub fn secret(&self) -> &[u8; 32] {
        &self.secret
    }
}

/// Private coin: everything needed to spend (serial, randomness, key)
#[derive(Clone, Debug)]
pub struct PrivateCoin {
    public_coin: PublicCoin,
    serial: BigUint,
    randomness: BigUint,
    keypair: CoinKeypair,
    version: u8,
}

/// Current private coin serialization version
pub const COIN_VERSION: u8 = 2;

impl PrivateCoin {
    pub fn new(
        public_coin: PublicCoin,
        serial: BigUint,
        randomness: BigUint,
        keypair: CoinKeypair,
    ) -> Self {
        Self {
            public_coin,
            serial,
            randomness,
            keypair,
            version: COIN_VERSION,
        }
    }

    pub fn public_coin(&self) -> &PublicCoin {
        &self.public_coin
    }

    pub fn serial(&self) -> &BigUint {
        &self.serial
    }

    pub fn randomness(&self) -> &BigUint {
        &self.randomness
    }

    pub fn keypair(&self) -> &CoinKeypair {
        &self.keypair
    }

    pub fn version(&self) -> u8 {
        self.version
    }
}

/// Hash of a public coin value. Commitments are large; lists and indexes
/// key on this instead.
pub fn pubcoin_hash(value: &BigUint) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.pubcoin");
    hasher.update(&to_be_bytes(value));
    *hasher.finalize().as_bytes()
}

/// Hash of a serial number, stored in place of the serial itself
pub fn serial_hash(serial: &BigUint) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.serial");
    hasher.update(&to_be_bytes(serial));
    *hasher.finalize().as_bytes()
}

/// Second-order hash of a serial, used as the staking handle
pub fn stake_hash(serial: &BigUint) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.stake");
    hasher.update(&serial_hash(serial));
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ZerocoinParams;
    use num_traits::One;

    #[test]
    fn test_commitment_is_deterministic() {
        let params = ZerocoinParams::testing();
        let s = BigUint::from(1234u32);
        let r = BigUint::from(5678u32);
        assert_eq!(commit(&params, &s, &r), commit(&params, &s, &r));
        assert_ne!(commit(&params, &s, &r), commit(&params, &s, &(r + BigUint::one())));
    }

    #[test]
    fn test_validate_rejects_reserved_denomination() {
        let params = ZerocoinParams::testing();
        // 104729 is prime and in range for the testing params
        let coin = PublicCoin::new(BigUint::from(104_729u32), Denomination::Error);
        assert!(!coin.validate(&params));
    }

    #[test]
    fn test_validate_rejects_composite() {
        let params = ZerocoinParams::testing();
        let coin = PublicCoin::new(BigUint::from(104_730u32), Denomination::Ten);
        assert!(!coin.validate(&params));
        let coin = PublicCoin::new(BigUint::from(104_729u32), Denomination::Ten);
        assert!(coin.validate(&params));
    }

    #[test]
    fn test_keypair_rejects_out_of_range_scalar() {
        let params = ZerocoinParams::testing();
        // all-0xff is far above the 128-bit testing group order
        assert!(CoinKeypair::from_secret(&params, [0xff; 32]).is_none());
        assert!(CoinKeypair::from_secret(&params, [0u8; 32]).is_none());
        let mut small = [0u8; 32];
        small[31] = 7;
        assert!(CoinKeypair::from_secret(&params, small).is_some());
    }

    #[test]
    fn test_hashes_are_domain_separated() {
        let v = BigUint::from(99991u32);
        assert_ne!(pubcoin_hash(&v), serial_hash(&v));
        assert_ne!(serial_hash(&v), stake_hash(&v));
    }
}
