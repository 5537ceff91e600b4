// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Supported field moduli and probable-prime generation.
//!
//! The constants were produced offline with [`generate_prime`] (see the
//! `conflux primegen` command) and are stored big-endian.

use crate::errors::{ConfigError, FieldError, FieldResult};
use crate::zp::Modulus;
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The SKS keyserver prime, 530512889551602322505127520352579437339.
pub const P_SKS: &[u8] = &[
    0x01, 0x8f, 0x1d, 0x10, 0xe4, 0x87, 0x8b, 0x1f, 0xdf, 0xc9, 0x1f, 0x85, 0xd9, 0x30, 0xa5, 0x43,
    0x1b,
];

pub const P_128: &[u8] = &[
    0xfd, 0x42, 0x29, 0x24, 0x62, 0xd3, 0x85, 0xb7, 0x3c, 0xe9, 0x54, 0x08, 0x68, 0x66, 0x9b, 0xe5,
];

pub const P_160: &[u8] = &[
    0xcd, 0x51, 0xf5, 0xc4, 0xb4, 0x12, 0xbb, 0xad, 0x26, 0x41, 0x64, 0xdb, 0xe1, 0xfa, 0xd7, 0x2a,
    0x89, 0x61, 0x73, 0xb5,
];

pub const P_256: &[u8] = &[
    0xd3, 0x66, 0xb9, 0xea, 0xb0, 0xcd, 0x95, 0x7a, 0x27, 0xef, 0xf5, 0xb8, 0xe3, 0x25, 0x8a, 0xc5,
    0x9f, 0xf2, 0x44, 0xb1, 0x95, 0x0a, 0xfc, 0xb2, 0x71, 0x14, 0x64, 0xb8, 0x2d, 0xa5, 0x48, 0xfd,
];

pub const P_512: &[u8] = &[
    0xde, 0xcd, 0x6a, 0xa2, 0x27, 0x72, 0x3e, 0xd2, 0xe6, 0x96, 0x4d, 0xa7, 0x8f, 0x13, 0xbc, 0x7d,
    0x1d, 0x12, 0x0e, 0x71, 0x84, 0x1e, 0xe4, 0xc1, 0xec, 0x9a, 0x91, 0xe8, 0x76, 0xd6, 0x60, 0x1d,
    0xcc, 0x90, 0xba, 0x42, 0x1d, 0xe1, 0x78, 0xd4, 0x82, 0xb6, 0xaa, 0xe9, 0x29, 0x2b, 0x54, 0x77,
    0x39, 0x6f, 0xaf, 0xab, 0x2e, 0x31, 0x92, 0x90, 0xd6, 0xa3, 0xe8, 0x34, 0xa0, 0x23, 0x75, 0xdb,
];

fn compiled_modulus(bytes: &'static [u8]) -> Modulus {
    Modulus::from_bytes_be(bytes).expect("compiled-in primes are larger than 2")
}

static SKS: Lazy<Modulus> = Lazy::new(|| compiled_modulus(P_SKS));
static M128: Lazy<Modulus> = Lazy::new(|| compiled_modulus(P_128));
static M160: Lazy<Modulus> = Lazy::new(|| compiled_modulus(P_160));
static M256: Lazy<Modulus> = Lazy::new(|| compiled_modulus(P_256));
static M512: Lazy<Modulus> = Lazy::new(|| compiled_modulus(P_512));

/// Selects one of the compiled-in moduli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSize {
    /// 129-bit prime used by SKS keyservers
    #[default]
    Sks,
    P128,
    P160,
    P256,
    P512,
}

impl FieldSize {
    pub const ALL: [FieldSize; 5] = [
        FieldSize::Sks,
        FieldSize::P128,
        FieldSize::P160,
        FieldSize::P256,
        FieldSize::P512,
    ];

    /// The shared modulus for this size. Every call returns a clone of the same
    /// instance.
    pub fn modulus(self) -> Modulus {
        match self {
            FieldSize::Sks => SKS.clone(),
            FieldSize::P128 => M128.clone(),
            FieldSize::P160 => M160.clone(),
            FieldSize::P256 => M256.clone(),
            FieldSize::P512 => M512.clone(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldSize::Sks => "sks",
            FieldSize::P128 => "p128",
            FieldSize::P160 => "p160",
            FieldSize::P256 => "p256",
            FieldSize::P512 => "p512",
        }
    }
}

impl fmt::Display for FieldSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldSize::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownFieldSize(s.to_string()))
    }
}

const SMALL_PRIMES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Miller-Rabin probabilistic primality test with `rounds` random witnesses.
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    for small in SMALL_PRIMES {
        let small = BigUint::from(small);
        if n == &small {
            return true;
        }
        if (n % &small).is_zero() {
            return false;
        }
    }
    if n < &BigUint::from(2u32) {
        return false;
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generates a random probable prime of exactly `bits` bits.
///
/// The two most significant bits are forced high so the product of two such
/// primes has `2 * bits` bits, and the low bit is forced so candidates are odd.
pub fn generate_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> FieldResult<BigUint> {
    if bits < 3 {
        return Err(FieldError::InvalidModulus {
            modulus: format!("{bits}-bit"),
            reason: "prime bit length must be at least 3".to_string(),
        });
    }
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(bits - 2, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, 64, rng) {
            return Ok(candidate);
        }
    }
}
