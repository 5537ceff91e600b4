// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::cursor::ByteReader;
use super::int::{Be32, IntCodec};
use crate::bitstring::{Bitstring, MAX_BIT_QUANTUM};
use crate::errors::{BitstringResult, WireError, WireResult};
use crate::zp::{Modulus, Zp};
use std::fmt;
use tracing::{debug, trace};

const INTERNAL_FLAG: u8 = 0;
const LEAF_FLAG: u8 = 1;

/// Protocol parameters shared by both peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParams {
    /// Bits consumed per tree level; internal nodes have `2^bit_quantum` children.
    pub bit_quantum: u32,
    /// Sample values carried by every node.
    pub num_samples: usize,
    /// Width in bytes of every leaf fingerprint.
    pub fingerprint_len: usize,
    /// Field the sample values live in.
    pub modulus: Modulus,
}

/// A fixed-width identifier held by a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf { fingerprints: Vec<Fingerprint> },
    /// Child keys in ascending suffix order, derived from the node key.
    Internal { children: Vec<Bitstring> },
}

/// One prefix-tree node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixNode {
    pub num_elements: usize,
    pub key: Bitstring,
    pub sample_values: Vec<Zp>,
    pub kind: NodeKind,
}

impl PrefixNode {
    pub fn leaf(
        num_elements: usize,
        key: Bitstring,
        sample_values: Vec<Zp>,
        fingerprints: Vec<Fingerprint>,
    ) -> Self {
        Self {
            num_elements,
            key,
            sample_values,
            kind: NodeKind::Leaf { fingerprints },
        }
    }

    /// Builds an internal node, deriving its `2^bit_quantum` child keys.
    pub fn internal(
        num_elements: usize,
        key: Bitstring,
        sample_values: Vec<Zp>,
        bit_quantum: u32,
    ) -> BitstringResult<Self> {
        let children = key.children(bit_quantum)?;
        Ok(Self {
            num_elements,
            key,
            sample_values,
            kind: NodeKind::Internal { children },
        })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn fingerprints(&self) -> Option<&[Fingerprint]> {
        match &self.kind {
            NodeKind::Leaf { fingerprints } => Some(fingerprints),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&[Bitstring]> {
        match &self.kind {
            NodeKind::Internal { children } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// Encodes and decodes [`PrefixNode`] records for one set of [`WireParams`].
#[derive(Debug, Clone)]
pub struct NodeCodec<C: IntCodec = Be32> {
    params: WireParams,
    ints: C,
}

impl NodeCodec<Be32> {
    /// Codec using SKS 32-bit integers.
    pub fn new(params: WireParams) -> WireResult<Self> {
        Self::with_int_codec(params, Be32)
    }
}

impl<C: IntCodec> NodeCodec<C> {
    /// # Errors
    ///
    /// Returns [`WireError::InvalidBitQuantum`] unless `params.bit_quantum` is
    /// in `1..=MAX_BIT_QUANTUM`.
    pub fn with_int_codec(params: WireParams, ints: C) -> WireResult<Self> {
        if !(1..=MAX_BIT_QUANTUM).contains(&params.bit_quantum) {
            return Err(WireError::InvalidBitQuantum(params.bit_quantum));
        }
        Ok(Self { params, ints })
    }

    pub fn params(&self) -> &WireParams {
        &self.params
    }

    /// Decodes exactly one record occupying all of `bytes`.
    ///
    /// # Errors
    ///
    /// Fails on truncated or malformed input, and on bytes left over after the
    /// record.
    pub fn decode(&self, bytes: &[u8]) -> WireResult<PrefixNode> {
        let mut r = ByteReader::new(bytes);
        let node = self
            .read(&mut r)
            .and_then(|node| match r.remaining() {
                0 => Ok(node),
                n => Err(WireError::TrailingBytes(n)),
            })
            .inspect_err(|err| debug!(%err, len = bytes.len(), "rejected node record"))?;
        trace!(
            key = %node.key,
            num_elements = node.num_elements,
            leaf = node.is_leaf(),
            "decoded node record"
        );
        Ok(node)
    }

    /// Reads one record from the cursor. Nothing is returned unless the whole
    /// record parsed.
    pub fn read(&self, r: &mut ByteReader<'_>) -> WireResult<PrefixNode> {
        let num_elements = self.read_len(r, "num_elements")?;
        let key_bits = self.read_len(r, "key_bits")?;
        let key_bytes = r.read_exact(key_bits.div_ceil(8), "key bytes")?;
        let key = Bitstring::from_bytes(key_bits, key_bytes);

        let width = self.params.modulus.byte_len();
        let sample_values = (0..self.params.num_samples)
            .map(|_| {
                let bytes = r.read_exact(width, "sample values")?;
                Zp::from_bytes(bytes, &self.params.modulus).map_err(|source| WireError::Field {
                    field: "sample values",
                    source,
                })
            })
            .collect::<WireResult<Vec<_>>>()?;

        match r.read_u8("leaf flag")? {
            LEAF_FLAG => {
                let count = self.read_len(r, "fingerprint count")?;
                let fp_len = self.params.fingerprint_len;
                if count.saturating_mul(fp_len) > r.remaining() {
                    return Err(WireError::UnexpectedEnd {
                        field: "fingerprints",
                    });
                }
                let fingerprints = (0..count)
                    .map(|_| r.read_exact(fp_len, "fingerprints").map(Fingerprint::from))
                    .collect::<WireResult<Vec<_>>>()?;
                Ok(PrefixNode::leaf(num_elements, key, sample_values, fingerprints))
            }
            INTERNAL_FLAG => PrefixNode::internal(
                num_elements,
                key,
                sample_values,
                self.params.bit_quantum,
            )
            .map_err(WireError::from),
            flag => Err(WireError::InvalidFlag(flag)),
        }
    }

    pub fn encode(&self, node: &PrefixNode) -> WireResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(node, &mut out)?;
        Ok(out)
    }

    /// Appends the encoding of `node` to `out`. On error `out` is unchanged.
    ///
    /// Child keys of internal nodes are not written; the decoder derives them,
    /// so they must be exactly the keys derived under this codec's bit quantum.
    pub fn write(&self, node: &PrefixNode, out: &mut Vec<u8>) -> WireResult<()> {
        if node.sample_values.len() != self.params.num_samples {
            return Err(WireError::SampleCount {
                expected: self.params.num_samples,
                actual: node.sample_values.len(),
            });
        }

        let mut buf = Vec::new();
        self.write_len(&mut buf, node.num_elements, "num_elements")?;
        self.write_len(&mut buf, node.key.bit_len(), "key_bits")?;
        buf.extend_from_slice(node.key.bytes());
        for value in &node.sample_values {
            if value.modulus() != &self.params.modulus {
                return Err(WireError::ModulusMismatch);
            }
            buf.extend_from_slice(&value.to_bytes());
        }

        match &node.kind {
            NodeKind::Leaf { fingerprints } => {
                buf.push(LEAF_FLAG);
                self.write_len(&mut buf, fingerprints.len(), "fingerprint count")?;
                for fp in fingerprints {
                    if fp.as_bytes().len() != self.params.fingerprint_len {
                        return Err(WireError::InvalidLength {
                            field: "fingerprints",
                            value: fp.as_bytes().len() as i64,
                        });
                    }
                    buf.extend_from_slice(fp.as_bytes());
                }
            }
            NodeKind::Internal { children } => {
                let expected = node.key.children(self.params.bit_quantum)?;
                if children.len() != expected.len() {
                    return Err(WireError::ChildCount {
                        expected: expected.len(),
                        actual: children.len(),
                    });
                }
                if *children != expected {
                    return Err(WireError::ChildKeys {
                        key: node.key.to_string(),
                    });
                }
                buf.push(INTERNAL_FLAG);
            }
        }

        out.extend_from_slice(&buf);
        Ok(())
    }

    fn read_len(&self, r: &mut ByteReader<'_>, field: &'static str) -> WireResult<usize> {
        let value = self.ints.read_int(r, field)?;
        usize::try_from(value).map_err(|_| WireError::InvalidLength { field, value })
    }

    fn write_len(&self, out: &mut Vec<u8>, n: usize, field: &'static str) -> WireResult<()> {
        self.ints
            .write_int(out, i64::try_from(n).unwrap_or(i64::MAX), field)
    }
}
