//! Dense rational matrices stored as an integer numerator with one
//! common positive denominator.
//!
//! The split representation keeps lattice computations (Hermite forms,
//! column lattices, index quotients) in pure integer arithmetic; entries are
//! materialized as `BigRational` only at the API boundary.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OrdoError};
use crate::qpoly::QPoly;
use crate::zmat::ZMat;

/// Rational matrix `num / den` with `den > 0` and content-reduced numerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QMat {
    num: ZMat,
    den: BigInt,
}

impl QMat {
    /// Wraps an integer matrix with denominator one.
    pub fn from_zmat(num: ZMat) -> Self {
        Self {
            num,
            den: BigInt::one(),
        }
    }

    /// Builds a rational matrix from an integer numerator and denominator.
    pub fn new(num: ZMat, den: BigInt) -> Result<Self, OrdoError> {
        if den.is_zero() {
            return Err(OrdoError::Matrix(ErrorInfo::new(
                "zero-denominator",
                "rational matrix denominator must be non-zero",
            )));
        }
        let mut out = Self { num, den };
        if out.den.is_negative() {
            out.num = out.num.scalar_mul(&BigInt::from(-1));
            out.den = -out.den;
        }
        out.canonicalize();
        Ok(out)
    }

    /// Builds a matrix from rows of rational entries.
    pub fn from_rational_rows(rows: Vec<Vec<BigRational>>) -> Result<Self, OrdoError> {
        let mut den = BigInt::one();
        for row in &rows {
            for v in row {
                den = den.lcm(v.denom());
            }
        }
        let int_rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| v.numer() * (&den / v.denom()))
                    .collect()
            })
            .collect();
        Self::new(ZMat::from_rows(int_rows)?, den)
    }

    fn canonicalize(&mut self) {
        let mut g = self.den.clone();
        for i in 0..self.num.nrows() {
            for j in 0..self.num.ncols() {
                g = g.gcd(self.num.get(i, j));
                if g.is_one() {
                    return;
                }
            }
        }
        if !g.is_one() && !g.is_zero() {
            let mut num = ZMat::zero(self.num.nrows(), self.num.ncols());
            for i in 0..self.num.nrows() {
                for j in 0..self.num.ncols() {
                    *num.get_mut(i, j) = self.num.get(i, j) / &g;
                }
            }
            self.num = num;
            self.den = &self.den / &g;
        }
    }

    /// Integer numerator matrix.
    pub fn numerator(&self) -> &ZMat {
        &self.num
    }

    /// Common positive denominator.
    pub fn denominator(&self) -> &BigInt {
        &self.den
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.num.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.num.ncols()
    }

    /// Entry as an exact rational.
    pub fn get(&self, i: usize, j: usize) -> BigRational {
        BigRational::new(self.num.get(i, j).clone(), self.den.clone())
    }

    /// Row as exact rationals.
    pub fn row(&self, i: usize) -> Vec<BigRational> {
        (0..self.ncols()).map(|j| self.get(i, j)).collect()
    }

    /// True when every entry is an integer.
    pub fn is_integral(&self) -> bool {
        self.den.is_one()
    }

    /// Exact matrix product.
    pub fn mul(&self, other: &QMat) -> Result<QMat, OrdoError> {
        QMat::new(self.num.mul(&other.num)?, &self.den * &other.den)
    }

    /// Stacks `self` on top of `other` over a common denominator.
    pub fn vcat(&self, other: &QMat) -> Result<QMat, OrdoError> {
        let den = self.den.lcm(&other.den);
        let top = self.num.scalar_mul(&(&den / &self.den));
        let bottom = other.num.scalar_mul(&(&den / &other.den));
        QMat::new(top.vcat(&bottom)?, den)
    }

    /// Places `self` and `other` side by side over a common denominator.
    pub fn hcat(&self, other: &QMat) -> Result<QMat, OrdoError> {
        if self.nrows() != other.nrows() {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("shape-mismatch", "horizontal stack requires equal row counts")
                    .with_context("lhs_rows", self.nrows().to_string())
                    .with_context("rhs_rows", other.nrows().to_string()),
            ));
        }
        let den = self.den.lcm(&other.den);
        let ls = &den / &self.den;
        let rs = &den / &other.den;
        let mut rows = Vec::with_capacity(self.nrows());
        for i in 0..self.nrows() {
            let mut row: Vec<BigInt> = self.num.row(i).iter().map(|v| v * &ls).collect();
            row.extend(other.num.row(i).iter().map(|v| v * &rs));
            rows.push(row);
        }
        QMat::new(ZMat::from_rows(rows)?, den)
    }

    /// Hermite normal form of the row lattice (upper-right convention);
    /// the denominator is carried through unchanged.
    pub fn hnf(&self) -> QMat {
        QMat {
            num: self.num.hnf_upper(),
            den: self.den.clone(),
        }
    }

    /// Keeps only the first `n` rows.
    pub fn top_rows(&self, n: usize) -> QMat {
        QMat {
            num: self.num.top_rows(n),
            den: self.den.clone(),
        }
    }

    /// Exact determinant.
    pub fn det(&self) -> Result<BigRational, OrdoError> {
        let d = self.num.det()?;
        Ok(BigRational::new(d, num_traits::pow(self.den.clone(), self.nrows())))
    }

    /// Exact inverse via Gauss-Jordan elimination over the rationals.
    pub fn inverse(&self) -> Result<QMat, OrdoError> {
        let n = self.nrows();
        if n != self.ncols() {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("not-square", "inverse requires a square matrix")
                    .with_context("shape", format!("{}x{}", self.nrows(), self.ncols())),
            ));
        }
        let mut work: Vec<Vec<BigRational>> = (0..n).map(|i| self.row(i)).collect();
        let mut inv: Vec<Vec<BigRational>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            BigRational::one()
                        } else {
                            BigRational::zero()
                        }
                    })
                    .collect()
            })
            .collect();
        for col in 0..n {
            let pivot = (col..n).find(|&i| !work[i][col].is_zero()).ok_or_else(|| {
                OrdoError::Matrix(
                    ErrorInfo::new("singular-matrix", "matrix is not invertible")
                        .with_context("column", col.to_string()),
                )
            })?;
            work.swap(col, pivot);
            inv.swap(col, pivot);
            let lead = work[col][col].clone();
            for j in 0..n {
                work[col][j] = &work[col][j] / &lead;
                inv[col][j] = &inv[col][j] / &lead;
            }
            for i in 0..n {
                if i == col || work[i][col].is_zero() {
                    continue;
                }
                let f = work[i][col].clone();
                for j in 0..n {
                    let w = &work[i][j] - &f * &work[col][j];
                    work[i][j] = w;
                    let v = &inv[i][j] - &f * &inv[col][j];
                    inv[i][j] = v;
                }
            }
        }
        QMat::from_rational_rows(inv)
    }

    /// Multiplies a row vector on the left: returns `v * self`.
    pub fn mul_row_vec(&self, v: &[BigRational]) -> Result<Vec<BigRational>, OrdoError> {
        if v.len() != self.nrows() {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("shape-mismatch", "row vector length does not match matrix rows")
                    .with_context("vector", v.len().to_string())
                    .with_context("rows", self.nrows().to_string()),
            ));
        }
        let mut out = vec![BigRational::zero(); self.ncols()];
        for (i, coeff) in v.iter().enumerate() {
            if coeff.is_zero() {
                continue;
            }
            for j in 0..self.ncols() {
                let t = &out[j] + coeff * self.get(i, j);
                out[j] = t;
            }
        }
        Ok(out)
    }

    /// Characteristic polynomial via the Faddeev-LeVerrier recurrence.
    ///
    /// Returns the monic polynomial `det(xI - A)` with exact rational
    /// coefficients, constant term first.
    pub fn charpoly(&self) -> Result<QPoly, OrdoError> {
        let n = self.nrows();
        if n != self.ncols() {
            return Err(OrdoError::Matrix(
                ErrorInfo::new("not-square", "characteristic polynomial requires a square matrix")
                    .with_context("shape", format!("{}x{}", self.nrows(), self.ncols())),
            ));
        }
        let mut coeffs = vec![BigRational::zero(); n + 1];
        coeffs[n] = BigRational::one();
        let mut m = QMat::from_zmat(ZMat::identity(n));
        for k in 1..=n {
            let am = self.mul(&m)?;
            let mut tr = BigRational::zero();
            for i in 0..n {
                tr += am.get(i, i);
            }
            let c = -tr / BigRational::new(BigInt::from(k as i64), BigInt::one());
            coeffs[n - k] = c.clone();
            // M_{k+1} = A*M_k + c*I
            let mut rows = Vec::with_capacity(n);
            for i in 0..n {
                let mut row = am.row(i);
                row[i] = &row[i] + &c;
                rows.push(row);
            }
            m = QMat::from_rational_rows(rows)?;
        }
        Ok(QPoly::from_coeffs(coeffs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qm(rows: &[&[i64]], den: i64) -> QMat {
        QMat::new(
            ZMat::from_rows(
                rows.iter()
                    .map(|r| r.iter().map(|&v| BigInt::from(v)).collect())
                    .collect(),
            )
            .unwrap(),
            BigInt::from(den),
        )
        .unwrap()
    }

    #[test]
    fn inverse_roundtrip() {
        let a = qm(&[&[2, 1], &[1, 1]], 1);
        let inv = a.inverse().unwrap();
        let prod = a.mul(&inv).unwrap();
        assert_eq!(prod, qm(&[&[1, 0], &[0, 1]], 1));
    }

    #[test]
    fn singular_matrix_reports_code() {
        let a = qm(&[&[1, 2], &[2, 4]], 1);
        let err = a.inverse().unwrap_err();
        assert_eq!(err.info().code, "singular-matrix");
    }

    #[test]
    fn charpoly_of_diagonal() {
        let a = qm(&[&[2, 0], &[0, 3]], 1);
        let p = a.charpoly().unwrap();
        // (x-2)(x-3) = x^2 - 5x + 6
        assert_eq!(p.coeff(0), BigRational::from_integer(BigInt::from(6)));
        assert_eq!(p.coeff(1), BigRational::from_integer(BigInt::from(-5)));
        assert_eq!(p.coeff(2), BigRational::from_integer(BigInt::from(1)));
    }

    #[test]
    fn content_is_reduced() {
        let a = qm(&[&[2, 4], &[6, 8]], 2);
        assert!(a.is_integral());
    }
}
