// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::{WireError, WireResult};

/// Cursor over a byte slice; every read names the field it is decoding so a
/// short buffer reports exactly what was missing.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    /// Reads exactly `len` bytes.
    pub fn read_exact(&mut self, len: usize, field: &'static str) -> WireResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(WireError::UnexpectedEnd { field });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> WireResult<[u8; N]> {
        let bytes = self.read_exact(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> WireResult<u8> {
        let [b] = self.read_array::<1>(field)?;
        Ok(b)
    }
}

impl<'a> From<&'a [u8]> for ByteReader<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ByteReader::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance() {
        let data = [1u8, 2, 3, 4, 5];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8("a").unwrap(), 1);
        assert_eq!(r.read_exact(2, "b").unwrap(), &[2, 3]);
        assert_eq!(r.position(), 3);
        assert_eq!(r.remaining(), 2);
        assert_eq!(r.read_array::<2>("c").unwrap(), [4, 5]);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_short_read_names_field() {
        let data = [1u8, 2];
        let mut r = ByteReader::new(&data);
        assert_eq!(
            r.read_exact(3, "key bytes"),
            Err(WireError::UnexpectedEnd { field: "key bytes" })
        );
        // failed reads do not consume input
        assert_eq!(r.position(), 0);
    }
}
