// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Dense linear systems over a prime field.
//!
//! A [`Matrix`] holds the augmented system built from both peers' sample values.
//! [`Matrix::reduce`] runs Gaussian elimination followed by back substitution in
//! place, after which the solution is read from the trailing column(s).

use crate::errors::{MatrixError, MatrixResult};
use crate::zp::{Modulus, Zp};
use std::fmt;
use tracing::{debug, trace};

/// A `columns × rows` grid of field elements.
///
/// Cells are addressed as `(column, row)`. Every cell owns its own value and all
/// cells share the matrix modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    columns: usize,
    rows: usize,
    cells: Vec<Zp>,
    modulus: Modulus,
}

impl Matrix {
    /// Creates a matrix with every cell set to a copy of `fill`.
    pub fn new(columns: usize, rows: usize, fill: &Zp) -> Self {
        Self {
            columns,
            rows,
            cells: vec![fill.clone(); columns * rows],
            modulus: fill.modulus().clone(),
        }
    }

    /// Creates a matrix from row-major data, validating dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is empty or rows have inconsistent lengths.
    pub fn from_rows(data: Vec<Vec<Zp>>) -> MatrixResult<Self> {
        let first = data
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| MatrixError::DimensionMismatch {
                expected: 1,
                actual: 0,
                context: "matrix rows".to_string(),
            })?;
        let modulus = first.modulus().clone();
        let columns = data[0].len();
        let rows = data.len();

        let mut cells = Vec::with_capacity(columns * rows);
        for (j, row) in data.into_iter().enumerate() {
            if row.len() != columns {
                return Err(MatrixError::DimensionMismatch {
                    expected: columns,
                    actual: row.len(),
                    context: format!("columns in row {j}"),
                });
            }
            for cell in row {
                assert!(
                    cell.modulus() == &modulus,
                    "matrix cell does not share the matrix modulus"
                );
                cells.push(cell);
            }
        }

        Ok(Self {
            columns,
            rows,
            cells,
            modulus,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn modulus(&self) -> &Modulus {
        &self.modulus
    }

    /// Gets a reference to the cell at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn get(&self, col: usize, row: usize) -> &Zp {
        &self.cells[self.index(col, row)]
    }

    /// Stores a copy of `value` at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds or `value` belongs to another field.
    pub fn set(&mut self, col: usize, row: usize, value: &Zp) {
        assert!(
            value.modulus() == &self.modulus,
            "matrix cell does not share the matrix modulus"
        );
        let index = self.index(col, row);
        self.cells[index] = value.clone();
    }

    /// Copies out column `col`, top to bottom.
    pub fn column(&self, col: usize) -> Vec<Zp> {
        (0..self.rows).map(|row| self.get(col, row).clone()).collect()
    }

    pub fn row(&self, row: usize) -> &[Zp] {
        let start = self.index(0, row);
        &self.cells[start..start + self.columns]
    }

    /// Reduces the system in place.
    ///
    /// Forward elimination normalises each pivot to one and clears the entries
    /// below it; back substitution then clears the entries above every unit
    /// pivot. A column with no non-zero pivot candidate is skipped, leaving a
    /// partial solution for rank-deficient systems.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::TooNarrow`] without touching any cell when
    /// `columns < rows`.
    pub fn reduce(&mut self) -> MatrixResult<()> {
        if self.columns < self.rows {
            return Err(MatrixError::TooNarrow {
                columns: self.columns,
                rows: self.rows,
            });
        }
        debug!(columns = self.columns, rows = self.rows, "reducing matrix");

        for j in 0..self.rows {
            self.process_row_forward(j)?;
        }
        for j in (1..self.rows).rev() {
            self.back_substitute(j);
        }
        Ok(())
    }

    fn process_row_forward(&mut self, j: usize) -> MatrixResult<()> {
        if self.get(j, j).is_zero() {
            match (j + 1..self.rows).find(|&jf| !self.get(j, jf).is_zero()) {
                Some(jswap) => {
                    trace!(pivot = j, with = jswap, "swapping rows");
                    self.swap_rows(j, jswap);
                }
                None => {
                    trace!(pivot = j, "no pivot candidate, skipping column");
                    return Ok(());
                }
            }
        }

        let pivot = self.get(j, j).clone();
        if !pivot.is_one() {
            let inv = pivot.inverse()?;
            self.scale_row(j, j, &inv);
        }
        for j2 in j + 1..self.rows {
            let factor = self.get(j, j2).clone();
            if !factor.is_zero() {
                self.row_sub(j, j, j2, &factor);
            }
        }
        Ok(())
    }

    fn back_substitute(&mut self, j: usize) {
        if !self.get(j, j).is_one() {
            return;
        }
        let zero = Zp::zero(&self.modulus);
        for j2 in (0..j).rev() {
            let factor = self.get(j, j2).clone();
            if factor.is_zero() {
                continue;
            }
            self.row_sub(j + 1, j, j2, &factor);
            self.set(j, j2, &zero);
        }
    }

    fn swap_rows(&mut self, j1: usize, j2: usize) {
        for i in 0..self.columns {
            let (a, b) = (self.index(i, j1), self.index(i, j2));
            self.cells.swap(a, b);
        }
    }

    /// Multiplies row `j` by `sc`, from column `scol` rightward.
    fn scale_row(&mut self, scol: usize, j: usize, sc: &Zp) {
        for i in scol..self.columns {
            let k = self.index(i, j);
            self.cells[k] = &self.cells[k] * sc;
        }
    }

    /// Subtracts `factor` times row `src` from row `dst`, from column `scol` rightward.
    fn row_sub(&mut self, scol: usize, src: usize, dst: usize, factor: &Zp) {
        for i in scol..self.columns {
            let s = &self.cells[self.index(i, src)];
            if s.is_zero() {
                continue;
            }
            let delta = if factor.is_one() {
                s.clone()
            } else {
                s * factor
            };
            let d = self.index(i, dst);
            self.cells[d] = &self.cells[d] - &delta;
        }
    }

    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.columns && row < self.rows,
            "cell ({col}, {row}) out of bounds for {}x{} matrix",
            self.columns,
            self.rows
        );
        col + row * self.columns
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            write!(f, "| ")?;
            for cell in self.row(row) {
                write!(f, "{cell} ")?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::FieldSize;
    use num_bigint::BigUint;

    fn p17() -> Modulus {
        Modulus::new(BigUint::from(17u32)).unwrap()
    }

    fn matrix(p: &Modulus, rows: &[&[i64]]) -> Matrix {
        Matrix::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|v| Zp::from_i64(*v, p)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn values(m: &Matrix) -> Vec<Vec<i64>> {
        (0..m.rows())
            .map(|j| m.row(j).iter().map(|c| c.to_i64().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_new_fills_independent_copies() {
        let p = p17();
        let mut m = Matrix::new(3, 2, &Zp::from_u64(4, &p));
        assert_eq!(m.columns(), 3);
        assert_eq!(m.rows(), 2);
        m.set(1, 1, &Zp::from_u64(9, &p));
        assert_eq!(m.get(1, 1).to_i64(), Some(9));
        assert_eq!(m.get(1, 0).to_i64(), Some(4));
        assert_eq!(m.get(0, 1).to_i64(), Some(4));
    }

    #[test]
    fn test_addressing_is_column_then_row() {
        let p = p17();
        let m = matrix(&p, &[&[1, 2, 3], &[4, 5, 6]]);
        assert_eq!(m.get(2, 0).to_i64(), Some(3));
        assert_eq!(m.get(0, 1).to_i64(), Some(4));
        assert_eq!(m.column(1), vec![Zp::from_u64(2, &p), Zp::from_u64(5, &p)]);
    }

    #[test]
    fn test_reduce_two_by_two() {
        // x + y = 5, 2x - y = 1  =>  x = 2, y = 3
        let p = p17();
        let mut m = matrix(&p, &[&[1, 1, 5], &[2, -1, 1]]);
        m.reduce().unwrap();
        assert_eq!(values(&m), vec![vec![1, 0, 2], vec![0, 1, 3]]);
        assert_eq!(m.column(2), vec![Zp::from_u64(2, &p), Zp::from_u64(3, &p)]);
    }

    #[test]
    fn test_reduce_requires_row_swap() {
        // y = 4, 3x + y = 10  =>  x = 2, y = 4
        let p = p17();
        let mut m = matrix(&p, &[&[0, 1, 4], &[3, 1, 10]]);
        m.reduce().unwrap();
        assert_eq!(values(&m), vec![vec![1, 0, 2], vec![0, 1, 4]]);
    }

    #[test]
    fn test_reduce_three_by_three() {
        // x=1, y=2, z=3 with:
        //  2x +  y -  z =  1
        //   x + 3y + 2z = 13
        //  -x +  y + 4z = 13
        let p = p17();
        let mut m = matrix(&p, &[&[2, 1, -1, 1], &[1, 3, 2, 13], &[-1, 1, 4, 13]]);
        m.reduce().unwrap();
        assert_eq!(
            values(&m),
            vec![vec![1, 0, 0, 1], vec![0, 1, 0, 2], vec![0, 0, 1, 3]]
        );
    }

    #[test]
    fn test_reduce_narrow_matrix_fails_without_mutation() {
        let p = p17();
        let mut m = matrix(&p, &[&[2, 1], &[1, 3], &[4, 4]]);
        let before = m.clone();
        assert_eq!(
            m.reduce(),
            Err(MatrixError::TooNarrow {
                columns: 2,
                rows: 3
            })
        );
        assert_eq!(m, before);
    }

    #[test]
    fn test_reduce_skips_missing_pivot() {
        // Column 0 is all zeros: no pivot, reduction continues.
        let p = p17();
        let mut m = matrix(&p, &[&[0, 2, 4], &[0, 0, 0]]);
        m.reduce().unwrap();
        assert_eq!(values(&m), vec![vec![0, 2, 4], vec![0, 0, 0]]);

        let mut m = matrix(&p, &[&[0, 2, 1, 4], &[0, 1, 3, 5], &[0, 0, 0, 0]]);
        m.reduce().unwrap();
        // Row 1 keeps its unit pivot and back substitution clears column 1 of
        // row 0: [0, 2, 1, 4] - 2 * [0, 1, 3, 5] = [0, 0, -5, -6].
        assert_eq!(
            values(&m),
            vec![vec![0, 0, 12, 11], vec![0, 1, 3, 5], vec![0, 0, 0, 0]]
        );
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let p = p17();
        let mut m = matrix(&p, &[&[3, 5, 7, 1], &[2, 11, 4, 9], &[6, 1, 1, 13]]);
        m.reduce().unwrap();
        let once = m.clone();
        m.reduce().unwrap();
        assert_eq!(m, once);
    }

    #[test]
    fn test_reduce_wide_system_keeps_extra_columns() {
        // Two right-hand sides solved at once.
        let p = p17();
        let mut m = matrix(&p, &[&[1, 1, 5, 3], &[2, -1, 1, 0]]);
        m.reduce().unwrap();
        assert_eq!(m.column(2), vec![Zp::from_u64(2, &p), Zp::from_u64(3, &p)]);
        // x + y = 3, 2x - y = 0  =>  x = 1, y = 2
        assert_eq!(m.column(3), vec![Zp::from_u64(1, &p), Zp::from_u64(2, &p)]);
    }

    #[test]
    fn test_reduce_large_field() {
        let p = FieldSize::P256.modulus();
        let x = Zp::new(BigUint::from(u128::MAX), &p);
        let y = Zp::from_i64(-42, &p);
        let a = [
            [Zp::from_u64(7, &p), Zp::from_u64(3, &p)],
            [Zp::from_u64(5, &p), Zp::from_i64(-9, &p)],
        ];
        let rhs: Vec<Zp> = a
            .iter()
            .map(|row| &(&row[0] * &x) + &(&row[1] * &y))
            .collect();
        let mut m = Matrix::from_rows(
            a.iter()
                .zip(rhs)
                .map(|(row, b)| vec![row[0].clone(), row[1].clone(), b])
                .collect(),
        )
        .unwrap();
        m.reduce().unwrap();
        assert_eq!(m.column(2), vec![x, y]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let p = p17();
        let rows = vec![vec![Zp::one(&p), Zp::one(&p)], vec![Zp::one(&p)]];
        assert!(matches!(
            Matrix::from_rows(rows),
            Err(MatrixError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert!(Matrix::from_rows(vec![]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let p = p17();
        let m = Matrix::new(2, 2, &Zp::zero(&p));
        let _ = m.get(2, 0);
    }

    #[test]
    fn test_display() {
        let p = p17();
        let m = matrix(&p, &[&[1, 2], &[3, 4]]);
        assert_eq!(m.to_string(), "| 1 2 |\n| 3 4 |\n");
    }
}
