//! Dense integer matrices.
//!
//! Entries are stored as `i64` in row-major order. Products and dot
//! products accumulate in `i128`, so nothing the crate builds can overflow
//! mid-computation; results are narrowed back with a check.
//!
//! # Example
//!
//! ```
//! use frodo_lwe::math::ZMatrix;
//!
//! let a = ZMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]);
//! let b = ZMatrix::identity(2);
//! assert_eq!(a.mul(&b), a);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::modular::ModQ;

/// Rectangular integer matrix
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl ZMatrix {
    /// All-zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Identity matrix of size n
    pub fn identity(n: usize) -> Self {
        Self::scaled_identity(n, 1)
    }

    /// `scale · I_n`
    pub fn scaled_identity(n: usize, scale: i64) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, scale);
        }
        m
    }

    /// Build from row-major data
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i64>) -> Self {
        assert_eq!(data.len(), rows * cols, "data length does not match shape");
        Self { rows, cols, data }
    }

    /// Build from a list of equally long rows
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            assert_eq!(row.len(), n_cols, "ragged rows");
            data.extend(row);
        }
        Self {
            rows: n_rows,
            cols: n_cols,
            data,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: i64) {
        self.data[i * self.cols + j] = value;
    }

    /// Row i as a slice
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Column j as an owned vector
    pub fn column(&self, j: usize) -> Vec<i64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Overwrite column j
    pub fn set_column(&mut self, j: usize, values: &[i64]) {
        assert_eq!(values.len(), self.rows);
        for (i, &v) in values.iter().enumerate() {
            self.set(i, j, v);
        }
    }

    /// Row-major entries
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Rows as owned vectors
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.data.chunks(self.cols.max(1)).take(self.rows).map(<[i64]>::to_vec).collect()
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    /// Matrix product over Z
    ///
    /// # Panics
    /// Panics on a shape mismatch or if an entry leaves the `i64` range.
    pub fn mul(&self, other: &ZMatrix) -> ZMatrix {
        assert_eq!(self.cols, other.rows, "shape mismatch in matrix product");
        let mut out = ZMatrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let lhs = self.row(i);
            for j in 0..other.cols {
                let acc: i128 = lhs
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| x as i128 * other.get(k, j) as i128)
                    .sum();
                assert!(
                    (i64::MIN as i128..=i64::MAX as i128).contains(&acc),
                    "matrix product overflows i64"
                );
                out.set(i, j, acc as i64);
            }
        }
        out
    }

    /// Matrix product reduced into [0, q)
    pub fn mul_mod(&self, other: &ZMatrix, q: u64) -> ZMatrix {
        assert_eq!(self.cols, other.rows, "shape mismatch in matrix product");
        let q_wide = q as i128;
        let mut out = ZMatrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let lhs = self.row(i);
            for j in 0..other.cols {
                let acc = lhs.iter().enumerate().fold(0i128, |acc, (k, &x)| {
                    (acc + x as i128 * other.get(k, j) as i128) % q_wide
                });
                out.set(i, j, acc.rem_euclid(q_wide) as i64);
            }
        }
        out
    }

    /// Elementwise sum
    pub fn add(&self, other: &ZMatrix) -> ZMatrix {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference
    pub fn sub(&self, other: &ZMatrix) -> ZMatrix {
        self.zip_with(other, |a, b| a - b)
    }

    fn zip_with(&self, other: &ZMatrix, f: impl Fn(i64, i64) -> i64) -> ZMatrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols), "shape mismatch");
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        ZMatrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Apply a function to every entry
    pub fn map(&self, mut f: impl FnMut(i64) -> i64) -> ZMatrix {
        ZMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Every entry reduced into [0, q)
    pub fn reduce_mod(&self, q: u64) -> ZMatrix {
        self.map(|x| ModQ::from_signed(x, q) as i64)
    }

    /// Every entry centered into (-q/2, q/2]
    pub fn center_mod(&self, q: u64) -> ZMatrix {
        self.map(|x| ModQ::center(x, q))
    }

    /// Largest absolute entry
    pub fn max_abs(&self) -> i64 {
        self.data.iter().map(|x| x.abs()).max().unwrap_or(0)
    }
}

impl fmt::Debug for ZMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ZMatrix {}x{} [", self.rows, self.cols)?;
        for i in 0..self.rows {
            writeln!(f, "  {:?}", self.row(i))?;
        }
        write!(f, "]")
    }
}

/// Inner product over Z, accumulated in i128
#[inline]
pub fn dot(a: &[i64], b: &[i64]) -> i128 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&x, &y)| x as i128 * y as i128).sum()
}
