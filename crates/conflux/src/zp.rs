// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Integers modulo a prime.
//!
//! Every [`Zp`] carries the [`Modulus`] it was created with. Combining two values
//! from different fields is a programming error and panics, so a mismatch can
//! never silently produce a wrong answer.
//!
//! Values are immutable: arithmetic returns a fresh value and containers store
//! their own clone, so updating one slot can never change another.

use crate::errors::{FieldError, FieldResult};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

#[derive(Debug)]
struct ModulusInner {
    p: BigUint,
    byte_len: usize,
}

/// A prime modulus shared by every element of one field.
///
/// Cloning is cheap; clones compare equal by pointer before falling back to the
/// numeric value.
#[derive(Clone, Debug)]
pub struct Modulus(Arc<ModulusInner>);

impl Modulus {
    /// Wraps `p` as a modulus.
    ///
    /// Primality is not checked here; the supported moduli in [`crate::primes`]
    /// are known primes.
    ///
    /// # Errors
    ///
    /// Returns an error if `p < 2`.
    pub fn new(p: BigUint) -> FieldResult<Self> {
        if p < BigUint::from(2u32) {
            return Err(FieldError::InvalidModulus {
                modulus: p.to_string(),
                reason: "modulus must be at least 2".to_string(),
            });
        }
        let byte_len = p.bits().div_ceil(8) as usize;
        Ok(Self(Arc::new(ModulusInner { p, byte_len })))
    }

    /// Builds a modulus from its big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> FieldResult<Self> {
        Self::new(BigUint::from_bytes_be(bytes))
    }

    pub fn value(&self) -> &BigUint {
        &self.0.p
    }

    /// Width in bytes of every element encoding in this field.
    pub fn byte_len(&self) -> usize {
        self.0.byte_len
    }

    pub fn bits(&self) -> u64 {
        self.0.p.bits()
    }
}

impl PartialEq for Modulus {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.p == other.0.p
    }
}

impl Eq for Modulus {}

impl Hash for Modulus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.p.hash(state);
    }
}

impl fmt::Display for Modulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.p)
    }
}

/// An element of the prime field defined by its [`Modulus`].
///
/// The stored value is always in `[0, P)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Zp {
    v: BigUint,
    p: Modulus,
}

impl Zp {
    /// Creates an element, reducing `v` modulo `p`.
    pub fn new(v: BigUint, p: &Modulus) -> Self {
        Self {
            v: v % p.value(),
            p: p.clone(),
        }
    }

    pub fn from_u64(v: u64, p: &Modulus) -> Self {
        Self::new(BigUint::from(v), p)
    }

    /// Creates an element from a signed value; negative `v` maps to `P - |v|`.
    pub fn from_i64(v: i64, p: &Modulus) -> Self {
        let magnitude = Self::from_u64(v.unsigned_abs(), p);
        if v < 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn zero(p: &Modulus) -> Self {
        Self {
            v: BigUint::zero(),
            p: p.clone(),
        }
    }

    pub fn one(p: &Modulus) -> Self {
        Self::new(BigUint::one(), p)
    }

    pub fn value(&self) -> &BigUint {
        &self.v
    }

    pub fn modulus(&self) -> &Modulus {
        &self.p
    }

    pub fn is_zero(&self) -> bool {
        self.v.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.v.is_one()
    }

    /// The value as a small integer, if it fits.
    ///
    /// Only meaningful for small canonical values such as pivot checks; large
    /// elements return `None`.
    pub fn to_i64(&self) -> Option<i64> {
        self.v.to_i64()
    }

    /// Raises the element to the power `exp`.
    pub fn pow(&self, exp: &BigUint) -> Self {
        Self {
            v: self.v.modpow(exp, self.p.value()),
            p: self.p.clone(),
        }
    }

    /// Multiplicative inverse.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DivisionByZero`] for the zero element.
    pub fn inverse(&self) -> FieldResult<Self> {
        if self.v.is_zero() {
            return Err(FieldError::DivisionByZero);
        }
        let v = self
            .v
            .modinv(self.p.value())
            .ok_or_else(|| FieldError::InvalidModulus {
                modulus: self.p.to_string(),
                reason: format!("{} has no inverse, modulus is not prime", self.v),
            })?;
        Ok(Self {
            v,
            p: self.p.clone(),
        })
    }

    /// Computes `self / rhs`.
    pub fn div(&self, rhs: &Zp) -> FieldResult<Self> {
        Ok(self * &rhs.inverse()?)
    }

    /// Big-endian encoding padded to exactly `byte_len(P)` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let width = self.p.byte_len();
        let raw = self.v.to_bytes_be();
        let mut out = vec![0u8; width];
        out[width - raw.len()..].copy_from_slice(&raw);
        out
    }

    /// Decodes a fixed-width big-endian encoding.
    ///
    /// # Errors
    ///
    /// Fails if `bytes` is not exactly `byte_len(P)` long or encodes a value `>= P`.
    pub fn from_bytes(bytes: &[u8], p: &Modulus) -> FieldResult<Self> {
        if bytes.len() != p.byte_len() {
            return Err(FieldError::InvalidWidth {
                expected: p.byte_len(),
                actual: bytes.len(),
            });
        }
        let v = BigUint::from_bytes_be(bytes);
        if &v >= p.value() {
            return Err(FieldError::Unreduced {
                modulus: p.to_string(),
            });
        }
        Ok(Self { v, p: p.clone() })
    }

    fn assert_same_field(&self, other: &Zp) {
        assert!(
            self.p == other.p,
            "field elements from different moduli: {} vs {}",
            self.p,
            other.p
        );
    }
}

impl fmt::Display for Zp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.v)
    }
}

impl<'a> Add<&'a Zp> for &'a Zp {
    type Output = Zp;

    fn add(self, rhs: &'a Zp) -> Zp {
        self.assert_same_field(rhs);
        let mut v = &self.v + &rhs.v;
        if &v >= self.p.value() {
            v -= self.p.value();
        }
        Zp {
            v,
            p: self.p.clone(),
        }
    }
}

impl<'a> Sub<&'a Zp> for &'a Zp {
    type Output = Zp;

    fn sub(self, rhs: &'a Zp) -> Zp {
        self.assert_same_field(rhs);
        let v = if self.v >= rhs.v {
            &self.v - &rhs.v
        } else {
            self.p.value() - &rhs.v + &self.v
        };
        Zp {
            v,
            p: self.p.clone(),
        }
    }
}

impl<'a> Mul<&'a Zp> for &'a Zp {
    type Output = Zp;

    fn mul(self, rhs: &'a Zp) -> Zp {
        self.assert_same_field(rhs);
        Zp {
            v: (&self.v * &rhs.v) % self.p.value(),
            p: self.p.clone(),
        }
    }
}

impl Neg for &Zp {
    type Output = Zp;

    fn neg(self) -> Zp {
        let v = if self.v.is_zero() {
            BigUint::zero()
        } else {
            self.p.value() - &self.v
        };
        Zp {
            v,
            p: self.p.clone(),
        }
    }
}

impl Add for Zp {
    type Output = Zp;

    fn add(self, rhs: Zp) -> Zp {
        &self + &rhs
    }
}

impl Sub for Zp {
    type Output = Zp;

    fn sub(self, rhs: Zp) -> Zp {
        &self - &rhs
    }
}

impl Mul for Zp {
    type Output = Zp;

    fn mul(self, rhs: Zp) -> Zp {
        &self * &rhs
    }
}

impl Neg for Zp {
    type Output = Zp;

    fn neg(self) -> Zp {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::FieldSize;
    use proptest::prelude::*;

    fn p17() -> Modulus {
        Modulus::new(BigUint::from(17u32)).unwrap()
    }

    #[test]
    fn test_small_field_arithmetic() {
        let p = p17();
        let a = Zp::from_u64(12, &p);
        let b = Zp::from_u64(9, &p);

        assert_eq!(&a + &b, Zp::from_u64(4, &p));
        assert_eq!(&b - &a, Zp::from_u64(14, &p));
        assert_eq!(&a * &b, Zp::from_u64(6, &p)); // 108 mod 17
        assert_eq!(-&a, Zp::from_u64(5, &p));
        assert_eq!(-Zp::zero(&p), Zp::zero(&p));
    }

    #[test]
    fn test_from_i64_negative() {
        let p = p17();
        assert_eq!(Zp::from_i64(-1, &p), Zp::from_u64(16, &p));
        assert_eq!(Zp::from_i64(-18, &p), Zp::from_u64(16, &p));
        assert_eq!(Zp::from_i64(-17, &p), Zp::zero(&p));
        assert_eq!(Zp::from_i64(i64::MIN, &p).modulus(), &p);
    }

    #[test]
    fn test_inverse() {
        let p = p17();
        for a in 1..17u64 {
            let a = Zp::from_u64(a, &p);
            let inv = a.inverse().expect("every non-zero element is invertible");
            assert!((&a * &inv).is_one());
        }
        assert_eq!(Zp::from_u64(3, &p).inverse().unwrap().to_i64(), Some(6));
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        let p = p17();
        assert_eq!(Zp::zero(&p).inverse(), Err(FieldError::DivisionByZero));
        assert_eq!(
            Zp::one(&p).div(&Zp::from_u64(17, &p)),
            Err(FieldError::DivisionByZero)
        );
    }

    #[test]
    fn test_pow() {
        let p = p17();
        let three = Zp::from_u64(3, &p);
        assert_eq!(three.pow(&BigUint::from(4u32)).to_i64(), Some(13)); // 81 mod 17
        assert!(three.pow(&BigUint::from(16u32)).is_one());
    }

    #[test]
    fn test_to_bytes_is_fixed_width() {
        let p = FieldSize::Sks.modulus();
        assert_eq!(p.byte_len(), 17);
        let zero = Zp::zero(&p).to_bytes();
        assert_eq!(zero, vec![0u8; 17]);
        let one = Zp::one(&p).to_bytes();
        assert_eq!(one.len(), 17);
        assert_eq!(one[16], 1);
        assert!(one[..16].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_from_bytes_rejects_malformed() {
        let p = p17();
        assert_eq!(
            Zp::from_bytes(&[0, 1], &p),
            Err(FieldError::InvalidWidth {
                expected: 1,
                actual: 2
            })
        );
        assert!(matches!(
            Zp::from_bytes(&[17], &p),
            Err(FieldError::Unreduced { .. })
        ));
        assert_eq!(Zp::from_bytes(&[16], &p).unwrap().to_i64(), Some(16));
    }

    #[test]
    fn test_modulus_rejects_tiny_values() {
        assert!(Modulus::new(BigUint::one()).is_err());
        assert!(Modulus::new(BigUint::zero()).is_err());
    }

    #[test]
    fn test_modulus_equality_by_value() {
        let a = p17();
        let b = Modulus::from_bytes_be(&[17]).unwrap();
        assert_eq!(a, b);
        assert_eq!(Zp::from_u64(5, &a), Zp::from_u64(5, &b));
    }

    #[test]
    #[should_panic(expected = "different moduli")]
    fn test_mixed_moduli_panics() {
        let a = Zp::one(&p17());
        let b = Zp::one(&Modulus::new(BigUint::from(19u32)).unwrap());
        let _ = &a + &b;
    }

    #[test]
    fn test_clone_is_independent() {
        let p = p17();
        let a = Zp::from_u64(3, &p);
        let mut b = a.clone();
        b = &b * &Zp::from_u64(2, &p);
        assert_eq!(a.to_i64(), Some(3));
        assert_eq!(b.to_i64(), Some(6));
    }

    fn any_field() -> impl Strategy<Value = FieldSize> {
        prop_oneof![
            Just(FieldSize::Sks),
            Just(FieldSize::P128),
            Just(FieldSize::P160),
            Just(FieldSize::P256),
            Just(FieldSize::P512),
        ]
    }

    fn element(size: FieldSize, bytes: &[u8]) -> Zp {
        Zp::new(BigUint::from_bytes_be(bytes), &size.modulus())
    }

    proptest! {
        #[test]
        fn closure(
            size in any_field(),
            a in prop::collection::vec(any::<u8>(), 1..80),
            b in prop::collection::vec(any::<u8>(), 1..80),
        ) {
            let (a, b) = (element(size, &a), element(size, &b));
            let p = size.modulus();
            prop_assert!((&a + &b).value() < p.value());
            prop_assert!((&a - &b).value() < p.value());
            prop_assert!((&a * &b).value() < p.value());
            prop_assert_eq!(&(&a - &b) + &b, a.clone());
        }

        #[test]
        fn inverse_law(size in any_field(), a in prop::collection::vec(any::<u8>(), 1..80)) {
            let a = element(size, &a);
            prop_assume!(!a.is_zero());
            prop_assert!((&a * &a.inverse().unwrap()).is_one());
        }

        #[test]
        fn bytes_roundtrip(size in any_field(), a in prop::collection::vec(any::<u8>(), 1..80)) {
            let a = element(size, &a);
            let bytes = a.to_bytes();
            prop_assert_eq!(bytes.len(), size.modulus().byte_len());
            prop_assert_eq!(Zp::from_bytes(&bytes, &size.modulus()).unwrap(), a);
        }
    }
}
