//! Dense linear algebra over prime fields F_p with arbitrary precision `p`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use ordo_core::{ErrorInfo, OrdoError};

/// Inverse of `a` modulo the prime `p`.
pub fn inv_mod(a: &BigInt, p: &BigInt) -> Result<BigInt, OrdoError> {
    let a = a.mod_floor(p);
    let ext = BigInt::extended_gcd(&a, p);
    if !ext.gcd.is_one() {
        return Err(OrdoError::Algebra(
            ErrorInfo::new("not-invertible-mod-p", "element is not invertible modulo p")
                .with_context("p", p.to_string()),
        ));
    }
    Ok(ext.x.mod_floor(p))
}

/// Dense matrix over F_p; entries are kept reduced into `[0, p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpMat {
    p: BigInt,
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

impl FpMat {
    /// Zero matrix.
    pub fn zero(p: BigInt, rows: usize, cols: usize) -> Self {
        Self {
            p,
            rows,
            cols,
            data: vec![BigInt::zero(); rows * cols],
        }
    }

    /// Builds a matrix from integer rows, reducing every entry mod `p`.
    pub fn from_rows(p: BigInt, rows: Vec<Vec<BigInt>>) -> Result<Self, OrdoError> {
        let nrows = rows.len();
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in &rows {
            if row.len() != ncols {
                return Err(OrdoError::Matrix(ErrorInfo::new(
                    "ragged-rows",
                    "matrix rows have inconsistent lengths",
                )));
            }
            for v in row {
                data.push(v.mod_floor(&p));
            }
        }
        Ok(Self {
            p,
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// The prime modulus.
    pub fn modulus(&self) -> &BigInt {
        &self.p
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entry access.
    pub fn get(&self, i: usize, j: usize) -> &BigInt {
        &self.data[i * self.cols + j]
    }

    /// Entry assignment with reduction.
    pub fn set(&mut self, i: usize, j: usize, v: BigInt) {
        self.data[i * self.cols + j] = v.mod_floor(&self.p);
    }

    /// Owned copy of row `i`.
    pub fn row_vec(&self, i: usize) -> Vec<BigInt> {
        self.data[i * self.cols..(i + 1) * self.cols].to_vec()
    }

    /// Transpose.
    pub fn transpose(&self) -> FpMat {
        let mut out = FpMat::zero(self.p.clone(), self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j).clone());
            }
        }
        out
    }

    /// Matrix product mod p.
    pub fn mul(&self, other: &FpMat) -> Result<FpMat, OrdoError> {
        if self.cols != other.rows {
            return Err(OrdoError::Matrix(ErrorInfo::new(
                "shape-mismatch",
                "matrix product shapes do not agree",
            )));
        }
        let mut out = FpMat::zero(self.p.clone(), self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let v = (out.get(i, j) + a * other.get(k, j)).mod_floor(&self.p);
                    out.data[i * out.cols + j] = v;
                }
            }
        }
        Ok(out)
    }

    /// In-place reduced row echelon form; returns the pivot column list.
    pub fn rref(&mut self) -> Result<Vec<usize>, OrdoError> {
        let mut pivots = Vec::new();
        let mut r = 0usize;
        for c in 0..self.cols {
            if r == self.rows {
                break;
            }
            let Some(pr) = (r..self.rows).find(|&i| !self.get(i, c).is_zero()) else {
                continue;
            };
            for j in 0..self.cols {
                self.data.swap(r * self.cols + j, pr * self.cols + j);
            }
            let inv = inv_mod(&self.get(r, c).clone(), &self.p)?;
            for j in 0..self.cols {
                let v = (self.get(r, j) * &inv).mod_floor(&self.p);
                self.data[r * self.cols + j] = v;
            }
            for i in 0..self.rows {
                if i == r || self.get(i, c).is_zero() {
                    continue;
                }
                let f = self.get(i, c).clone();
                for j in 0..self.cols {
                    let v = (self.get(i, j) - &f * self.get(r, j)).mod_floor(&self.p);
                    self.data[i * self.cols + j] = v;
                }
            }
            pivots.push(c);
            r += 1;
        }
        Ok(pivots)
    }

    /// Rank over F_p.
    pub fn rank(&self) -> Result<usize, OrdoError> {
        let mut m = self.clone();
        Ok(m.rref()?.len())
    }

    /// Basis of the right kernel `{v : M v = 0}`, one vector per row of the
    /// returned list.
    pub fn kernel_basis(&self) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        let mut m = self.clone();
        let pivots = m.rref()?;
        let mut is_pivot = vec![false; self.cols];
        for &c in &pivots {
            is_pivot[c] = true;
        }
        let mut basis = Vec::new();
        for free in 0..self.cols {
            if is_pivot[free] {
                continue;
            }
            let mut v = vec![BigInt::zero(); self.cols];
            v[free] = BigInt::one();
            for (r, &c) in pivots.iter().enumerate() {
                // row r reads: x_c + sum over free columns = 0
                let coeff = m.get(r, free).clone();
                if !coeff.is_zero() {
                    v[c] = (-coeff).mod_floor(&self.p);
                }
            }
            basis.push(v);
        }
        Ok(basis)
    }

    /// Basis of the left kernel `{v : v M = 0}`.
    pub fn left_kernel_basis(&self) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        self.transpose().kernel_basis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm(p: i64, rows: &[&[i64]]) -> FpMat {
        FpMat::from_rows(
            BigInt::from(p),
            rows.iter()
                .map(|r| r.iter().map(|&v| BigInt::from(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn kernel_of_rank_deficient_matrix() {
        let m = fm(5, &[&[1, 2, 0], &[2, 4, 0]]);
        let kernel = m.kernel_basis().unwrap();
        assert_eq!(kernel.len(), 2);
        for v in kernel {
            for i in 0..2 {
                let mut acc = BigInt::zero();
                for j in 0..3 {
                    acc += m.get(i, j) * &v[j];
                }
                assert!(acc.mod_floor(m.modulus()).is_zero());
            }
        }
    }

    #[test]
    fn rank_counts_pivots() {
        assert_eq!(fm(3, &[&[1, 0], &[0, 1]]).rank().unwrap(), 2);
        assert_eq!(fm(3, &[&[1, 2], &[2, 4]]).rank().unwrap(), 1);
    }

    #[test]
    fn inv_mod_small_primes() {
        let inv = inv_mod(&BigInt::from(3), &BigInt::from(7)).unwrap();
        assert_eq!(inv, BigInt::from(5));
    }
}
