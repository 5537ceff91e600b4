// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Integer primitives used for counts and lengths in node records.

use super::cursor::ByteReader;
use crate::errors::{WireError, WireResult};

/// Reads and writes the protocol's integer encoding.
///
/// Values are signed so a peer's negative length can be detected and rejected
/// rather than reinterpreted.
pub trait IntCodec {
    fn read_int(&self, r: &mut ByteReader<'_>, field: &'static str) -> WireResult<i64>;

    fn write_int(&self, out: &mut Vec<u8>, value: i64, field: &'static str) -> WireResult<()>;
}

/// SKS integers: 4 bytes, big-endian, two's complement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Be32;

impl IntCodec for Be32 {
    fn read_int(&self, r: &mut ByteReader<'_>, field: &'static str) -> WireResult<i64> {
        Ok(i32::from_be_bytes(r.read_array::<4>(field)?) as i64)
    }

    fn write_int(&self, out: &mut Vec<u8>, value: i64, field: &'static str) -> WireResult<()> {
        let value = i32::try_from(value).map_err(|_| WireError::InvalidLength { field, value })?;
        out.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_be32_layout() {
        let mut out = Vec::new();
        Be32.write_int(&mut out, 258, "n").unwrap();
        Be32.write_int(&mut out, -1, "n").unwrap();
        assert_eq!(out, vec![0, 0, 1, 2, 0xff, 0xff, 0xff, 0xff]);

        let mut r = ByteReader::new(&out);
        assert_eq!(Be32.read_int(&mut r, "n").unwrap(), 258);
        assert_eq!(Be32.read_int(&mut r, "n").unwrap(), -1);
        assert!(matches!(
            Be32.read_int(&mut r, "n"),
            Err(WireError::UnexpectedEnd { field: "n" })
        ));
    }

    #[test]
    fn test_be32_rejects_values_out_of_range() {
        let mut out = Vec::new();
        assert_eq!(
            Be32.write_int(&mut out, i64::from(i32::MAX) + 1, "count"),
            Err(WireError::InvalidLength {
                field: "count",
                value: i64::from(i32::MAX) + 1
            })
        );
        assert!(out.is_empty());
    }
}
