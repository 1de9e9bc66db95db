//! Dense matrices over the integers with exact normal form algorithms.

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OrdoError};

/// Dense row-major matrix with arbitrary precision integer entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZMat {
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

impl ZMat {
    /// Creates a zero matrix of the given shape.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![BigInt::zero(); rows * cols],
        }
    }

    /// Creates the identity matrix of the given size.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = BigInt::one();
        }
        m
    }

    /// Builds a matrix from explicit rows, which must all share one length.
    pub fn from_rows(rows: Vec<Vec<BigInt>>) -> Result<Self, OrdoError> {
        let nrows = rows.len();
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        for row in &rows {
            if row.len() != ncols {
                return Err(OrdoError::Matrix(
                    ErrorInfo::new("ragged-rows", "matrix rows have inconsistent lengths")
                        .with_context("expected", ncols.to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Immutable entry access.
    pub fn get(&self, i: usize, j: usize) -> &BigInt {
        &self.data[i * self.cols + j]
    }

    /// Mutable entry access.
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut BigInt {
        &mut self.data[i * self.cols + j]
    }

    /// Returns row `i` as a slice.
    pub fn row(&self, i: usize) -> &[BigInt] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Returns an owned copy of row `i`.
    pub fn row_vec(&self, i: usize) -> Vec<BigInt> {
        self.row(i).to_vec()
    }

    /// Swaps two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Negates row `i` in place.
    pub fn negate_row(&mut self, i: usize) {
        for j in 0..self.cols {
            let v = -self.get(i, j).clone();
            *self.get_mut(i, j) = v;
        }
    }

    /// Subtracts `q` times row `src` from row `dst`.
    pub fn row_submul(&mut self, dst: usize, src: usize, q: &BigInt) {
        if q.is_zero() {
            return;
        }
        for j in 0..self.cols {
            let v = self.get(dst, j) - q * self.get(src, j);
            *self.get_mut(dst, j) = v;
        }
    }

    /// Returns the transpose.
    pub fn transpose(&self) -> ZMat {
        let mut out = ZMat::zero(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                *out.get_mut(j, i) = self.get(i, j).clone();
            }
        }
        out
    }

    /// Exact matrix product.
    pub fn mul(&self, other: &ZMat) -> Result<ZMat, OrdoError> {
        if self.cols != other.rows {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("shape-mismatch", "matrix product shapes do not agree")
                    .with_context("lhs", format!("{}x{}", self.rows, self.cols))
                    .with_context("rhs", format!("{}x{}", other.rows, other.cols)),
            ));
        }
        let mut out = ZMat::zero(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let v = out.get(i, j) + a * other.get(k, j);
                    *out.get_mut(i, j) = v;
                }
            }
        }
        Ok(out)
    }

    /// Multiplies every entry by a scalar.
    pub fn scalar_mul(&self, s: &BigInt) -> ZMat {
        let mut out = self.clone();
        for v in &mut out.data {
            *v = &*v * s;
        }
        out
    }

    /// Stacks `self` on top of `other`.
    pub fn vcat(&self, other: &ZMat) -> Result<ZMat, OrdoError> {
        if self.cols != other.cols {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("shape-mismatch", "vertical stack requires equal column counts")
                    .with_context("lhs_cols", self.cols.to_string())
                    .with_context("rhs_cols", other.cols.to_string()),
            ));
        }
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Ok(ZMat {
            rows: self.rows + other.rows,
            cols: self.cols,
            data,
        })
    }

    /// Keeps only the first `n` rows.
    pub fn top_rows(&self, n: usize) -> ZMat {
        let n = n.min(self.rows);
        ZMat {
            rows: n,
            cols: self.cols,
            data: self.data[..n * self.cols].to_vec(),
        }
    }

    /// True if every entry of row `i` is zero.
    pub fn row_is_zero(&self, i: usize) -> bool {
        self.row(i).iter().all(BigInt::is_zero)
    }

    /// Number of leading non-zero rows after a normal form computation.
    pub fn nonzero_rows(&self) -> usize {
        (0..self.rows).filter(|&i| !self.row_is_zero(i)).count()
    }

    /// Row-style Hermite normal form, upper-right convention.
    ///
    /// Pivot rows come first in pivot-column order, pivots are positive, and
    /// every entry above a pivot is reduced into `[0, pivot)`. Zero rows sink
    /// to the bottom. The row lattice is preserved exactly.
    pub fn hnf_upper(&self) -> ZMat {
        let mut m = self.clone();
        let mut r = 0usize;
        for c in 0..m.cols {
            if r == m.rows {
                break;
            }
            // Euclidean elimination on column c below row r.
            loop {
                let mut pivot: Option<usize> = None;
                for i in r..m.rows {
                    if m.get(i, c).is_zero() {
                        continue;
                    }
                    pivot = match pivot {
                        None => Some(i),
                        Some(p) if m.get(i, c).magnitude() < m.get(p, c).magnitude() => Some(i),
                        keep => keep,
                    };
                }
                let Some(p) = pivot else { break };
                m.swap_rows(r, p);
                let mut finished = true;
                for i in r + 1..m.rows {
                    if m.get(i, c).is_zero() {
                        continue;
                    }
                    let q = m.get(i, c) / m.get(r, c);
                    m.row_submul(i, r, &q);
                    if !m.get(i, c).is_zero() {
                        finished = false;
                    }
                }
                if finished {
                    break;
                }
            }
            if m.get(r, c).is_zero() {
                continue;
            }
            if m.get(r, c).sign() == Sign::Minus {
                m.negate_row(r);
            }
            let pivot = m.get(r, c).clone();
            for i in 0..r {
                let q = num_integer::Integer::div_floor(m.get(i, c), &pivot);
                m.row_submul(i, r, &q);
            }
            r += 1;
        }
        m
    }

    /// Row-style Hermite normal form, lower-left convention.
    ///
    /// Obtained by conjugating [`ZMat::hnf_upper`] with row and column
    /// reversal; for square full-rank input the result is lower triangular
    /// with positive pivots and reduced entries below them.
    pub fn hnf_lower(&self) -> ZMat {
        self.reversed().hnf_upper().reversed()
    }

    fn reversed(&self) -> ZMat {
        let mut out = ZMat::zero(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                *out.get_mut(self.rows - 1 - i, self.cols - 1 - j) = self.get(i, j).clone();
            }
        }
        out
    }

    /// Exact determinant via Bareiss fraction-free elimination.
    pub fn det(&self) -> Result<BigInt, OrdoError> {
        if self.rows != self.cols {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("not-square", "determinant requires a square matrix")
                    .with_context("shape", format!("{}x{}", self.rows, self.cols)),
            ));
        }
        let n = self.rows;
        if n == 0 {
            return Ok(BigInt::one());
        }
        let mut m = self.clone();
        let mut sign = BigInt::one();
        let mut prev = BigInt::one();
        for k in 0..n - 1 {
            if m.get(k, k).is_zero() {
                let swap = (k + 1..n).find(|&i| !m.get(i, k).is_zero());
                match swap {
                    Some(i) => {
                        m.swap_rows(k, i);
                        sign = -sign;
                    }
                    None => return Ok(BigInt::zero()),
                }
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let v = (m.get(i, j) * m.get(k, k) - m.get(i, k) * m.get(k, j)) / &prev;
                    *m.get_mut(i, j) = v;
                }
                *m.get_mut(i, k) = BigInt::zero();
            }
            prev = m.get(k, k).clone();
        }
        Ok(sign * m.get(n - 1, n - 1).clone())
    }

    /// Rank over the rationals.
    pub fn rank(&self) -> usize {
        self.hnf_upper().nonzero_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[i64]]) -> ZMat {
        ZMat::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&v| BigInt::from(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn hnf_of_simple_lattice() {
        let a = m(&[&[2, 0], &[1, 1]]);
        let h = a.hnf_upper();
        assert_eq!(h, m(&[&[1, 1], &[0, 2]]));
    }

    #[test]
    fn hnf_is_idempotent() {
        let a = m(&[&[4, 6, 2], &[6, 9, 3], &[2, 0, 8]]);
        let h = a.hnf_upper();
        assert_eq!(h.hnf_upper(), h);
    }

    #[test]
    fn det_matches_cofactor_expansion() {
        let a = m(&[&[2, 1], &[1, 1]]);
        assert_eq!(a.det().unwrap(), BigInt::from(1));
        let b = m(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 10]]);
        assert_eq!(b.det().unwrap(), BigInt::from(-3));
    }

    #[test]
    fn lower_hnf_is_lower_triangular() {
        let a = m(&[&[2, 1], &[0, 3]]);
        let h = a.hnf_lower();
        assert!(h.get(0, 1).is_zero());
    }
}
