// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Fixed-length bit keys addressing prefix-tree nodes.

use crate::errors::{BitstringError, BitstringResult};
use std::fmt;

/// Largest supported number of bits consumed per tree level.
pub const MAX_BIT_QUANTUM: u32 = 16;

/// An explicit-length sequence of bits.
///
/// Bit `i` lives in byte `i / 8`, counted from the most significant bit. Bits
/// past `bit_len` in the final byte are always zero, so two keys with the same
/// length and bits are equal and hash identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitstring {
    bits: usize,
    buf: Vec<u8>,
}

impl Bitstring {
    /// Creates an all-zero key of `bits` bits.
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            buf: vec![0u8; bits.div_ceil(8)],
        }
    }

    /// Creates a key of `bits` bits filled from `bytes`. See [`Bitstring::set_bytes`].
    pub fn from_bytes(bits: usize, bytes: &[u8]) -> Self {
        let mut key = Self::new(bits);
        key.set_bytes(bytes);
        key
    }

    pub fn bit_len(&self) -> usize {
        self.bits
    }

    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Copies bits from `bytes` left to right, stopping at `bit_len` or at the end
    /// of `bytes`. Any bits not covered by `bytes` are cleared.
    pub fn set_bytes(&mut self, bytes: &[u8]) {
        for (i, byte) in self.buf.iter_mut().enumerate() {
            *byte = bytes.get(i).copied().unwrap_or(0);
        }
        let rem = self.bits % 8;
        if rem != 0 {
            if let Some(last) = self.buf.last_mut() {
                *last &= !(0xffu8 >> rem);
            }
        }
    }

    pub fn get(&self, index: usize) -> BitstringResult<bool> {
        self.check(index)?;
        Ok(self.buf[index / 8] & Self::mask(index) != 0)
    }

    pub fn set(&mut self, index: usize) -> BitstringResult<()> {
        self.check(index)?;
        self.buf[index / 8] |= Self::mask(index);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> BitstringResult<()> {
        self.check(index)?;
        self.buf[index / 8] &= !Self::mask(index);
        Ok(())
    }

    /// Returns a child key `extra_bits` longer than `self`.
    ///
    /// The leading bits are copied from `self`; bit `j` of `suffix` is written
    /// at position `bit_len + j`, so the least significant suffix bit comes
    /// first. Suffix bits at or beyond position 64 read as zero.
    pub fn extend(&self, extra_bits: usize, suffix: u64) -> Bitstring {
        let mut child = Bitstring::from_bytes(self.bits + extra_bits, &self.buf);
        for j in 0..extra_bits {
            if j < 64 && (suffix >> j) & 1 == 1 {
                let index = self.bits + j;
                child.buf[index / 8] |= Self::mask(index);
            }
        }
        child
    }

    /// All `2^bit_quantum` children of this key, in ascending suffix order.
    ///
    /// # Errors
    ///
    /// Returns [`BitstringError::QuantumTooLarge`] if `bit_quantum` exceeds
    /// [`MAX_BIT_QUANTUM`].
    pub fn children(&self, bit_quantum: u32) -> BitstringResult<Vec<Bitstring>> {
        if bit_quantum > MAX_BIT_QUANTUM {
            return Err(BitstringError::QuantumTooLarge {
                bit_quantum,
                max: MAX_BIT_QUANTUM,
            });
        }
        Ok((0..1u64 << bit_quantum)
            .map(|suffix| self.extend(bit_quantum as usize, suffix))
            .collect())
    }

    fn check(&self, index: usize) -> BitstringResult<()> {
        if index >= self.bits {
            return Err(BitstringError::OutOfRange {
                index,
                bit_len: self.bits,
            });
        }
        Ok(())
    }

    fn mask(index: usize) -> u8 {
        0x80 >> (index % 8)
    }
}

/// Renders one `0`/`1` character per bit; the empty key renders as an empty string.
impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.bits {
            let bit = self.buf[i / 8] & Self::mask(i) != 0;
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
