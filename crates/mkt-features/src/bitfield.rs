//! Fixed-size bitfield backed by bytes
//!
//! Provides [`FeaturesBitField`], the packed form of a feature profile.
//!
//! Bit `i` lives in byte `i / 8` at mask `1 << (i % 8)`: little-endian within
//! each byte, bytes in ascending order. Signatures already issued depend on
//! this layout, so it must never change.

use std::fmt::{self, Display, Formatter};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::BitFieldError;

/// Number of bytes needed to hold `size` bits
#[inline]
#[must_use]
pub const fn byte_len(size: usize) -> usize {
    size.div_ceil(8)
}

/// A fixed number of boolean flags packed eight to a byte
///
/// Bits at or beyond `size` in the last byte are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeaturesBitField {
    size: usize,
    bytes: Vec<u8>,
}

impl FeaturesBitField {
    /// Create an all-false bitfield of `size` bits
    #[inline]
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            bytes: vec![0; byte_len(size)],
        }
    }

    /// Create a bitfield of `size` bits over pre-populated bytes
    ///
    /// Surplus bytes are dropped, as are bits past `size` in the last byte.
    ///
    /// # Errors
    /// Returns error if `bytes` is shorter than `ceil(size / 8)`
    pub fn from_bytes(size: usize, bytes: &[u8]) -> Result<Self, BitFieldError> {
        let expected = byte_len(size);
        if bytes.len() < expected {
            return Err(BitFieldError::Truncated {
                size,
                expected,
                actual: bytes.len(),
            });
        }
        let mut field = Self {
            size,
            bytes: bytes[..expected].to_vec(),
        };
        field.clear_padding();
        Ok(field)
    }

    /// Build a bitfield with one bit per value, in order
    #[must_use]
    pub fn from_list(values: &[bool]) -> Self {
        let mut field = Self::new(values.len());
        for (i, &value) in values.iter().enumerate() {
            field.set(i, value);
        }
        field
    }

    /// Number of addressable bits
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw backing bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read bit `i`
    ///
    /// # Panics
    /// Panics if `i` is past the backing bytes. Debug builds also reject `i >= size`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.size, "bit {i} out of range for size {}", self.size);
        self.bytes[i / 8] & (1 << (i % 8)) != 0
    }

    /// Set or clear bit `i`
    ///
    /// # Panics
    /// Same preconditions as [`get`](Self::get).
    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        debug_assert!(i < self.size, "bit {i} out of range for size {}", self.size);
        let mask = 1u8 << (i % 8);
        if value {
            self.bytes[i / 8] |= mask;
        } else {
            self.bytes[i / 8] &= !mask;
        }
    }

    /// All bits in order
    #[must_use]
    pub fn to_list(&self) -> Vec<bool> {
        (0..self.size).map(|i| self.get(i)).collect()
    }

    /// Iterate over the indices of set bits
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(|&i| self.get(i))
    }

    /// Standard (RFC 4648, padded) base64 of the backing bytes
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Decode a bitfield of `size` bits from base64 text
    ///
    /// # Errors
    /// Returns error if the text is not valid base64 or decodes to fewer
    /// than `ceil(size / 8)` bytes
    pub fn from_base64(text: &str, size: usize) -> Result<Self, BitFieldError> {
        let bytes = STANDARD.decode(text)?;
        if bytes.len() > byte_len(size) {
            tracing::warn!(
                size,
                decoded = bytes.len(),
                "base64 payload longer than bitfield, dropping surplus bytes"
            );
        }
        Self::from_bytes(size, &bytes)
    }

    /// Lower-case hex of the bitfield read as an integer
    ///
    /// Bit `i` has weight `2^i`. No prefix, no leading zeros; the zero
    /// value renders as `"0"`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut nibbles: Vec<u8> = self
            .bytes
            .iter()
            .flat_map(|&b| [b & 0x0f, b >> 4])
            .collect();
        while nibbles.last() == Some(&0) {
            nibbles.pop();
        }
        if nibbles.is_empty() {
            return "0".to_string();
        }
        nibbles
            .iter()
            .rev()
            .filter_map(|&n| char::from_digit(u32::from(n), 16))
            .collect()
    }

    /// Parse a hex integer into a bitfield of `4 * digits` bits
    ///
    /// Digits may be upper- or lower-case.
    ///
    /// # Errors
    /// Returns error if the text is empty or holds a non-hex character
    pub fn from_hex(text: &str) -> Result<Self, BitFieldError> {
        if text.is_empty() {
            return Err(BitFieldError::InvalidHex(text.to_string()));
        }
        let mut field = Self::new(text.len() * 4);
        for (j, c) in text.chars().rev().enumerate() {
            let digit = c
                .to_digit(16)
                .ok_or_else(|| BitFieldError::InvalidHex(text.to_string()))?;
            for k in 0..4 {
                if digit & (1 << k) != 0 {
                    field.set(j * 4 + k, true);
                }
            }
        }
        Ok(field)
    }

    /// 128-bit integer view
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self {
            size: 128,
            bytes: value.to_le_bytes().to_vec(),
        }
    }

    /// Integer value if it fits in 128 bits
    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        if self.bytes.iter().skip(16).any(|&b| b != 0) {
            return None;
        }
        let mut buf = [0u8; 16];
        let n = self.bytes.len().min(16);
        buf[..n].copy_from_slice(&self.bytes[..n]);
        Some(u128::from_le_bytes(buf))
    }

    fn clear_padding(&mut self) {
        let used = self.size % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}

impl Display for FeaturesBitField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for i in 0..self.size {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<&[bool]> for FeaturesBitField {
    fn from(values: &[bool]) -> Self {
        Self::from_list(values)
    }
}
