// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Sample points and a node's characteristic-polynomial evaluations.
//!
//! A set `S` is represented by `χ_S(x) = ∏_{s ∈ S} (x - s)` evaluated at a fixed
//! list of points. Inserting or removing an element updates each evaluation with
//! one multiplication, and dividing two peers' evaluations point by point gives
//! samples of `χ_A / χ_B`, whose numerator and denominator roots are exactly the
//! elements missing on each side.

use crate::errors::{FieldError, FieldResult};
use crate::zp::{Modulus, Zp};

/// The fixed evaluation points `0, -1, 1, -2, 2, ...`.
pub fn sample_points(n: usize, p: &Modulus) -> Vec<Zp> {
    (0..n)
        .map(|i| {
            let v = i.div_ceil(2) as i64;
            if i % 2 == 0 {
                Zp::from_i64(v, p)
            } else {
                Zp::from_i64(-v, p)
            }
        })
        .collect()
}

/// Evaluations of a set's characteristic polynomial at [`sample_points`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleValues {
    points: Vec<Zp>,
    values: Vec<Zp>,
}

impl SampleValues {
    /// Sample values of the empty set (every evaluation is one).
    pub fn new(n: usize, p: &Modulus) -> Self {
        Self {
            points: sample_points(n, p),
            values: vec![Zp::one(p); n],
        }
    }

    /// Restores sample values read from a node record.
    pub fn from_values(values: Vec<Zp>, p: &Modulus) -> Self {
        Self {
            points: sample_points(values.len(), p),
            values,
        }
    }

    pub fn points(&self) -> &[Zp] {
        &self.points
    }

    pub fn values(&self) -> &[Zp] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Zp> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Adds `z` to the represented set.
    pub fn insert(&mut self, z: &Zp) {
        for (value, point) in self.values.iter_mut().zip(&self.points) {
            *value = &*value * &(point - z);
        }
    }

    /// Removes `z` from the represented set.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DivisionByZero`] if `z` equals a sample point; the
    /// values are left unchanged in that case.
    pub fn remove(&mut self, z: &Zp) -> FieldResult<()> {
        let factors = self
            .points
            .iter()
            .map(|point| (point - z).inverse())
            .collect::<FieldResult<Vec<_>>>()?;
        for (value, factor) in self.values.iter_mut().zip(&factors) {
            *value = &*value * factor;
        }
        Ok(())
    }

    /// Point-wise `self / other`.
    ///
    /// # Errors
    ///
    /// Fails if the two sides carry a different number of samples or `other`
    /// has a zero evaluation.
    pub fn ratios(&self, other: &SampleValues) -> FieldResult<Vec<Zp>> {
        if self.len() != other.len() {
            return Err(FieldError::InvalidWidth {
                expected: self.len(),
                actual: other.len(),
            });
        }
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a.div(b))
            .collect()
    }
}
