//! Univariate polynomials over the rationals.
//!
//! Provides the exact primitives the Schur-index computation needs:
//! arithmetic, monic gcd, Yun squarefree factorization and Sturm-chain
//! counting of positive real roots. Root counting is combinatorial on exact
//! coefficients; no floating point is involved.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

/// Dense polynomial, constant coefficient first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QPoly {
    coeffs: Vec<BigRational>,
}

impl QPoly {
    /// Builds a polynomial from coefficients, trimming trailing zeros.
    pub fn from_coeffs(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().map(Zero::is_zero).unwrap_or(false) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant polynomial one.
    pub fn one() -> Self {
        Self {
            coeffs: vec![BigRational::one()],
        }
    }

    /// True for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; zero polynomial reports degree 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Coefficient of `x^i` (zero beyond the degree).
    pub fn coeff(&self, i: usize) -> BigRational {
        self.coeffs.get(i).cloned().unwrap_or_else(BigRational::zero)
    }

    /// Leading coefficient; zero for the zero polynomial.
    pub fn leading(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    /// Sum.
    pub fn add(&self, other: &QPoly) -> QPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        QPoly::from_coeffs((0..n).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }

    /// Difference.
    pub fn sub(&self, other: &QPoly) -> QPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        QPoly::from_coeffs((0..n).map(|i| self.coeff(i) - other.coeff(i)).collect())
    }

    /// Product.
    pub fn mul(&self, other: &QPoly) -> QPoly {
        if self.is_zero() || other.is_zero() {
            return QPoly::zero();
        }
        let mut out = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                let v = &out[i + j] + a * b;
                out[i + j] = v;
            }
        }
        QPoly::from_coeffs(out)
    }

    /// Scales every coefficient.
    pub fn scale(&self, s: &BigRational) -> QPoly {
        QPoly::from_coeffs(self.coeffs.iter().map(|c| c * s).collect())
    }

    /// Makes the polynomial monic; the zero polynomial is returned unchanged.
    pub fn monic(&self) -> QPoly {
        if self.is_zero() {
            return self.clone();
        }
        self.scale(&self.leading().recip())
    }

    /// Formal derivative.
    pub fn derivative(&self) -> QPoly {
        if self.coeffs.len() <= 1 {
            return QPoly::zero();
        }
        QPoly::from_coeffs(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i as u64)))
                .collect(),
        )
    }

    /// Euclidean division; panics never, divisor must be non-zero.
    pub fn divrem(&self, divisor: &QPoly) -> (QPoly, QPoly) {
        debug_assert!(!divisor.is_zero());
        if self.degree() < divisor.degree() || self.is_zero() {
            return (QPoly::zero(), self.clone());
        }
        let mut rem = self.coeffs.clone();
        let dlead = divisor.leading();
        let dd = divisor.degree();
        let mut quot = vec![BigRational::zero(); rem.len() - dd];
        while rem.len() >= dd + 1 && !rem.iter().all(Zero::is_zero) {
            let rd = rem.len() - 1;
            if rem[rd].is_zero() {
                rem.pop();
                continue;
            }
            if rd < dd {
                break;
            }
            let f = &rem[rd] / &dlead;
            quot[rd - dd] = f.clone();
            for i in 0..=dd {
                let v = &rem[rd - dd + i] - &f * &divisor.coeffs[i];
                rem[rd - dd + i] = v;
            }
            rem.pop();
        }
        (QPoly::from_coeffs(quot), QPoly::from_coeffs(rem))
    }

    /// Exact quotient; remainder must vanish.
    pub fn div_exact(&self, divisor: &QPoly) -> QPoly {
        let (q, r) = self.divrem(divisor);
        debug_assert!(r.is_zero());
        q
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &QPoly) -> QPoly {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let (_, r) = a.divrem(&b);
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Yun squarefree factorization: returns `(g_i, i)` pairs with the `g_i`
    /// monic, squarefree, pairwise coprime, and `self ~ prod g_i^i`.
    pub fn squarefree_factors(&self) -> Vec<(QPoly, u32)> {
        let f = self.monic();
        if f.degree() == 0 {
            return Vec::new();
        }
        let fp = f.derivative();
        let g = f.gcd(&fp);
        if g.degree() == 0 {
            return vec![(f, 1)];
        }
        let mut c = f.div_exact(&g);
        let mut d = fp.div_exact(&g).sub(&c.derivative());
        let mut out = Vec::new();
        let mut i = 1u32;
        while c.degree() > 0 {
            let a = c.gcd(&d);
            if a.degree() > 0 {
                out.push((a.clone(), i));
            }
            c = c.div_exact(&a);
            d = d.div_exact(&a).sub(&c.derivative());
            i += 1;
        }
        out
    }

    /// Counts the distinct real roots in `(0, +inf)` of a squarefree
    /// polynomial with non-zero constant term, via a Sturm chain.
    pub fn count_positive_roots(&self) -> usize {
        if self.degree() == 0 || self.is_zero() {
            return 0;
        }
        let mut chain = vec![self.monic(), self.derivative().monic()];
        loop {
            let len = chain.len();
            if chain[len - 1].is_zero() {
                chain.pop();
                break;
            }
            let (_, r) = chain[len - 2].divrem(&chain[len - 1]);
            if r.is_zero() {
                break;
            }
            chain.push(r.scale(&BigRational::from_integer(BigInt::from(-1))));
        }
        let sign_at_zero: Vec<i8> = chain.iter().map(|p| sign_of(&p.coeff_lowest())).collect();
        let sign_at_inf: Vec<i8> = chain.iter().map(|p| sign_of(&p.leading())).collect();
        variations(&sign_at_zero).saturating_sub(variations(&sign_at_inf))
    }

    /// Lowest non-zero coefficient; determines the sign just right of zero.
    fn coeff_lowest(&self) -> BigRational {
        self.coeffs
            .iter()
            .find(|c| !c.is_zero())
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }
}

fn sign_of(v: &BigRational) -> i8 {
    if v.is_zero() {
        0
    } else if v.is_negative() {
        -1
    } else {
        1
    }
}

fn variations(signs: &[i8]) -> usize {
    let mut count = 0;
    let mut last = 0i8;
    for &s in signs {
        if s == 0 {
            continue;
        }
        if last != 0 && s != last {
            count += 1;
        }
        last = s;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(coeffs: &[i64]) -> QPoly {
        QPoly::from_coeffs(
            coeffs
                .iter()
                .map(|&c| BigRational::from_integer(BigInt::from(c)))
                .collect(),
        )
    }

    #[test]
    fn yun_splits_multiplicities() {
        // (x-1)^2 (x+2) = x^3 - 3x + 2
        let f = p(&[2, -3, 0, 1]);
        let factors = f.squarefree_factors();
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0], (p(&[2, 1]).monic(), 1));
        assert_eq!(factors[1], (p(&[-1, 1]).monic(), 2));
    }

    #[test]
    fn sturm_counts_positive_roots() {
        // roots 1, 2, -3
        let f = p(&[6, -7, 0, 1]);
        assert_eq!(f.count_positive_roots(), 2);
        // x^2 + 1 has none
        assert_eq!(p(&[1, 0, 1]).count_positive_roots(), 0);
        // x^2 - 2 has one positive root
        assert_eq!(p(&[-2, 0, 1]).count_positive_roots(), 1);
    }

    #[test]
    fn gcd_is_monic() {
        let f = p(&[-1, 0, 1]); // (x-1)(x+1)
        let g = p(&[-2, 2]); // 2(x-1)
        assert_eq!(f.gcd(&g), p(&[-1, 1]));
    }
}
