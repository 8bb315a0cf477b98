//! Checksum and checkpoint codec
//!
//! Each denomination's accumulator value is digested to a 32-bit checksum;
//! the per-denomination checksums are packed into one fixed-width checkpoint
//! embedded in block headers, most significant slot first in canonical
//! denomination order.
//!
//! The 32-bit width is a deliberate block-space/uniqueness tradeoff and a
//! consensus constant: widening it changes every embedded checkpoint. The
//! off-chain checksum store exists precisely because this digest is lossy.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::arith::to_be_bytes;
use crate::denominations::{Denomination, DENOMINATIONS};
use crate::errors::{ZerocoinError, ZerocoinResult};

/// 32-bit digest of one accumulator value
pub type Checksum = u32;

/// Number of checksum slots in a checkpoint
pub const CHECKPOINT_SLOTS: usize = DENOMINATIONS.len();

/// Byte width of an encoded checkpoint
pub const CHECKPOINT_BYTES: usize = CHECKPOINT_SLOTS * 4;

/// Digest an accumulator value down to its 32-bit checksum
pub fn checksum(value: &BigUint) -> Checksum {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.checksum");
    hasher.update(&to_be_bytes(value));
    let digest = hasher.finalize();
    let bytes: [u8; 4] = digest.as_bytes()[..4]
        .try_into()
        .unwrap_or([0u8; 4]);
    u32::from_be_bytes(bytes)
}

/// Packed per-denomination checksums, one slot per denomination.
///
/// Slot 0 (the first denomination in canonical order) occupies the most
/// significant position of the encoded form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint([Checksum; CHECKPOINT_SLOTS]);

impl Checkpoint {
    /// The all-zero checkpoint used before the privacy feature activates
    pub fn zero() -> Self {
        Self([0; CHECKPOINT_SLOTS])
    }

    /// Pack checksums given in canonical denomination order
    pub fn pack(slots: [Checksum; CHECKPOINT_SLOTS]) -> Self {
        Self(slots)
    }

    /// Checksum slice for a denomination
    pub fn slice(&self, denomination: Denomination) -> ZerocoinResult<Checksum> {
        let index = denomination
            .index()
            .ok_or(ZerocoinError::ReservedDenomination("checkpoint slice"))?;
        debug_assert!(index < CHECKPOINT_SLOTS);
        Ok(self.0[index])
    }

    /// All slots in canonical order
    pub fn slots(&self) -> [Checksum; CHECKPOINT_SLOTS] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| *c == 0)
    }

    /// Fixed-width big-endian encoding, most significant slot first
    pub fn to_bytes(self) -> [u8; CHECKPOINT_BYTES] {
        let mut out = [0u8; CHECKPOINT_BYTES];
        for (i, slot) in self.0.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&slot.to_be_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> ZerocoinResult<Self> {
        if bytes.len() != CHECKPOINT_BYTES {
            return Err(ZerocoinError::InvalidCheckpointBytes {
                expected: CHECKPOINT_BYTES,
                got: bytes.len(),
            });
        }
        let mut slots = [0u32; CHECKPOINT_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            let word: [u8; 4] = bytes[i * 4..i * 4 + 4]
                .try_into()
                .unwrap_or([0u8; 4]);
            *slot = u32::from_be_bytes(word);
        }
        Ok(Self(slots))
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}
