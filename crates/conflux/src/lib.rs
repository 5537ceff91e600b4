// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Algebraic substrate for set reconciliation.
//!
//! Two peers holding large sets of fixed-width identifiers discover their symmetric
//! difference by exchanging data proportional to the difference, not the set size
//! (Minsky, Trachtenberg and Zippel, "Set Reconciliation with Nearly Optimal
//! Communication Complexity", 2004).
//!
//! ## Mathematical Background
//!
//! Each set `S` is encoded as its characteristic polynomial `χ_S(x) = ∏ (x - s)`
//! over a prime field `Z_p`, evaluated at a fixed list of sample points. Dividing
//! one peer's samples by the other's yields samples of the rational function
//! `χ_A / χ_B`, in which the shared elements cancel. Its coefficients are
//! recovered by solving a linear system over `Z_p`, and the roots of the numerator
//! and denominator are the elements missing on each side.
//!
//! ## Components
//!
//! - [`zp`]: integers modulo a prime, carrying their modulus.
//! - [`bitstring`]: explicit-length bit keys addressing prefix-tree nodes.
//! - [`matrix`]: dense Gaussian elimination with back substitution.
//! - [`samples`]: sample points and characteristic-polynomial evaluations.
//! - [`wire`]: the byte layout of prefix-tree node records.
//! - [`primes`] and [`config`]: supported moduli and protocol parameters.

pub mod bitstring;
pub mod config;
pub mod errors;
pub mod matrix;
pub mod primes;
pub mod samples;
pub mod wire;
pub mod zp;

pub use bitstring::Bitstring;
pub use config::{load_config, ReconConfig};
pub use errors::{
    BitstringError, ConfigError, ConfluxError, ConfluxResult, FieldError, MatrixError, WireError,
};
pub use matrix::Matrix;
pub use primes::FieldSize;
pub use samples::{sample_points, SampleValues};
pub use wire::{Fingerprint, NodeCodec, NodeKind, PrefixNode, WireParams};
pub use zp::{Modulus, Zp};
