// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Byte layout of prefix-tree node records.
//!
//! ```text
//! int        num_elements
//! int        key_bits
//! [u8]       key bytes, ceil(key_bits / 8)
//! [Zp]       num_samples sample values, byte_len(P) bytes each, big-endian
//! u8         leaf flag (0 = internal, 1 = leaf)
//! leaf only:
//!   int      fingerprint count
//!   [[u8]]   fingerprints, fingerprint_len bytes each
//! ```
//!
//! Internal nodes store nothing after the flag; their children's keys are derived
//! from the node key. Integers use the caller's [`IntCodec`].

pub mod cursor;
pub mod int;
pub mod node;

pub use cursor::ByteReader;
pub use int::{Be32, IntCodec};
pub use node::{Fingerprint, NodeCodec, NodeKind, PrefixNode, WireParams};
