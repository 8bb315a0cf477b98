//! Big-integer helpers
//!
//! Miller-Rabin primality testing over `BigUint` plus byte codecs shared by
//! the coin and accumulator modules.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Fixed witness bases. Deterministic for all 64-bit integers and a strong
/// probabilistic test far beyond that; the commitment search only needs to
/// reject composites quickly.
const MILLER_RABIN_BASES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Miller-Rabin primality test
pub fn is_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for base in MILLER_RABIN_BASES {
        let b = BigUint::from(base);
        if n == &b {
            return true;
        }
        if n.is_multiple_of(&b) {
            return false;
        }
    }

    // n - 1 = d * 2^r with d odd
    let n_minus_one = n - BigUint::one();
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    'witness: for base in MILLER_RABIN_BASES {
        let mut x = BigUint::from(base).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Big-endian bytes of a value, at least one byte long
pub fn to_be_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        vec![0]
    } else {
        value.to_bytes_be()
    }
}

/// Value from big-endian bytes
pub fn from_be_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}
