//! Univariate polynomial arithmetic and factorization over F_p.
//!
//! Factorization is distinct-degree followed by Cantor-Zassenhaus
//! equal-degree splitting; the characteristic two case uses the trace
//! polynomial variant. All randomness flows through the seeded
//! [`RngHandle`], so runs are reproducible.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

use ordo_core::{ErrorInfo, OrdoError, RngHandle};

use crate::fpmat::inv_mod;

/// Dense polynomial over F_p, constant coefficient first, entries in `[0, p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpPoly {
    p: BigInt,
    coeffs: Vec<BigInt>,
}

impl FpPoly {
    /// Builds a polynomial, reducing and trimming.
    pub fn from_coeffs(p: BigInt, coeffs: Vec<BigInt>) -> Self {
        let mut coeffs: Vec<BigInt> = coeffs.into_iter().map(|c| c.mod_floor(&p)).collect();
        while coeffs.last().map(Zero::is_zero).unwrap_or(false) {
            coeffs.pop();
        }
        Self { p, coeffs }
    }

    /// The zero polynomial.
    pub fn zero(p: BigInt) -> Self {
        Self { p, coeffs: Vec::new() }
    }

    /// The monomial `x`.
    pub fn x(p: BigInt) -> Self {
        Self::from_coeffs(p, vec![BigInt::zero(), BigInt::one()])
    }

    /// The constant one.
    pub fn one(p: BigInt) -> Self {
        Self::from_coeffs(p, vec![BigInt::one()])
    }

    /// The modulus.
    pub fn modulus(&self) -> &BigInt {
        &self.p
    }

    /// True for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; the zero polynomial reports 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Coefficient of `x^i`.
    pub fn coeff(&self, i: usize) -> BigInt {
        self.coeffs.get(i).cloned().unwrap_or_else(BigInt::zero)
    }

    /// Sum.
    pub fn add(&self, other: &FpPoly) -> FpPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        FpPoly::from_coeffs(
            self.p.clone(),
            (0..n).map(|i| self.coeff(i) + other.coeff(i)).collect(),
        )
    }

    /// Difference.
    pub fn sub(&self, other: &FpPoly) -> FpPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        FpPoly::from_coeffs(
            self.p.clone(),
            (0..n).map(|i| self.coeff(i) - other.coeff(i)).collect(),
        )
    }

    /// Product.
    pub fn mul(&self, other: &FpPoly) -> FpPoly {
        if self.is_zero() || other.is_zero() {
            return FpPoly::zero(self.p.clone());
        }
        let mut out = vec![BigInt::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] = (&out[i + j] + a * b).mod_floor(&self.p);
            }
        }
        FpPoly::from_coeffs(self.p.clone(), out)
    }

    /// Euclidean division by a non-zero divisor.
    pub fn divrem(&self, divisor: &FpPoly) -> Result<(FpPoly, FpPoly), OrdoError> {
        if divisor.is_zero() {
            return Err(OrdoError::Matrix(ErrorInfo::new(
                "division-by-zero-poly",
                "polynomial division by zero",
            )));
        }
        if self.is_zero() || self.degree() < divisor.degree() {
            return Ok((FpPoly::zero(self.p.clone()), self.clone()));
        }
        let lead_inv = inv_mod(&divisor.coeffs[divisor.degree()], &self.p)?;
        let dd = divisor.degree();
        let mut rem = self.coeffs.clone();
        let mut quot = vec![BigInt::zero(); rem.len() - dd];
        for rd in (dd..rem.len()).rev() {
            if rem[rd].is_zero() {
                continue;
            }
            let f = (&rem[rd] * &lead_inv).mod_floor(&self.p);
            quot[rd - dd] = f.clone();
            for i in 0..=dd {
                rem[rd - dd + i] = (&rem[rd - dd + i] - &f * &divisor.coeffs[i]).mod_floor(&self.p);
            }
        }
        Ok((
            FpPoly::from_coeffs(self.p.clone(), quot),
            FpPoly::from_coeffs(self.p.clone(), rem),
        ))
    }

    /// Makes the polynomial monic.
    pub fn monic(&self) -> Result<FpPoly, OrdoError> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        let inv = inv_mod(&self.coeffs[self.degree()], &self.p)?;
        Ok(FpPoly::from_coeffs(
            self.p.clone(),
            self.coeffs.iter().map(|c| c * &inv).collect(),
        ))
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &FpPoly) -> Result<FpPoly, OrdoError> {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let (_, r) = a.divrem(&b)?;
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Formal derivative.
    pub fn derivative(&self) -> FpPoly {
        if self.coeffs.len() <= 1 {
            return FpPoly::zero(self.p.clone());
        }
        FpPoly::from_coeffs(
            self.p.clone(),
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigInt::from(i as u64))
                .collect(),
        )
    }

    /// Remainder of `self` modulo `m`.
    pub fn rem(&self, m: &FpPoly) -> Result<FpPoly, OrdoError> {
        Ok(self.divrem(m)?.1)
    }

    /// `self^e mod m` by square and multiply on the exponent bits.
    pub fn powmod(&self, e: &BigInt, m: &FpPoly) -> Result<FpPoly, OrdoError> {
        let mut result = FpPoly::one(self.p.clone());
        let mut base = self.rem(m)?;
        let mut e = e.clone();
        while !e.is_zero() {
            if e.is_odd() {
                result = result.mul(&base).rem(m)?;
            }
            e >>= 1;
            if !e.is_zero() {
                base = base.mul(&base).rem(m)?;
            }
        }
        Ok(result)
    }

    /// Evaluates at a scalar.
    pub fn eval(&self, at: &BigInt) -> BigInt {
        let mut acc = BigInt::zero();
        for c in self.coeffs.iter().rev() {
            acc = (acc * at + c).mod_floor(&self.p);
        }
        acc
    }

    /// Factors a squarefree monic polynomial into monic irreducibles.
    ///
    /// The input must be squarefree (the minimal polynomials of elements of
    /// a semisimple algebra always are); this is debug-asserted via
    /// `gcd(f, f')`.
    pub fn factor_squarefree(&self, rng: &mut RngHandle) -> Result<Vec<FpPoly>, OrdoError> {
        let f = self.monic()?;
        if f.degree() == 0 {
            return Ok(Vec::new());
        }
        debug_assert!(f.gcd(&f.derivative())?.degree() == 0);
        let mut out = Vec::new();
        for (g, d) in f.distinct_degree()? {
            equal_degree_split(&g, d, rng, &mut out)?;
        }
        out.sort_by(|a, b| (a.degree(), &a.coeffs).cmp(&(b.degree(), &b.coeffs)));
        Ok(out)
    }

    /// Distinct-degree factorization: returns `(product, d)` pairs where
    /// `product` collects all irreducible factors of degree `d`.
    fn distinct_degree(&self) -> Result<Vec<(FpPoly, usize)>, OrdoError> {
        let mut f = self.clone();
        let mut out = Vec::new();
        let x = FpPoly::x(self.p.clone());
        let mut h = x.clone();
        let mut d = 0usize;
        while f.degree() >= 2 * (d + 1) {
            d += 1;
            let p = self.p.clone();
            h = h.powmod(&p, &f)?;
            let g = f.gcd(&h.sub(&x))?;
            if g.degree() > 0 {
                out.push((g.clone(), d));
                f = f.divrem(&g)?.0;
                h = h.rem(&f)?;
            }
        }
        if f.degree() > 0 {
            let deg = f.degree();
            out.push((f, deg));
        }
        Ok(out)
    }
}

/// Extended Euclid: returns monic `g = gcd(a, b)` and `u, v` with
/// `u*a + v*b = g`.
pub fn ext_gcd(a: &FpPoly, b: &FpPoly) -> Result<(FpPoly, FpPoly, FpPoly), OrdoError> {
    let p = a.modulus().clone();
    let mut r0 = a.clone();
    let mut r1 = b.clone();
    let mut u0 = FpPoly::one(p.clone());
    let mut u1 = FpPoly::zero(p.clone());
    let mut v0 = FpPoly::zero(p.clone());
    let mut v1 = FpPoly::one(p);
    while !r1.is_zero() {
        let (q, r) = r0.divrem(&r1)?;
        let u = u0.sub(&q.mul(&u1));
        let v = v0.sub(&q.mul(&v1));
        r0 = r1;
        r1 = r;
        u0 = u1;
        u1 = u;
        v0 = v1;
        v1 = v;
    }
    // Normalize to a monic gcd.
    if r0.is_zero() {
        return Ok((r0, u0, v0));
    }
    let inv = inv_mod(&r0.coeffs[r0.degree()], r0.modulus())?;
    let scale = FpPoly::from_coeffs(r0.modulus().clone(), vec![inv]);
    Ok((r0.monic()?, u0.mul(&scale), v0.mul(&scale)))
}

/// Splits a product of distinct irreducibles of equal degree `d`.
fn equal_degree_split(
    g: &FpPoly,
    d: usize,
    rng: &mut RngHandle,
    out: &mut Vec<FpPoly>,
) -> Result<(), OrdoError> {
    if g.degree() == d {
        out.push(g.monic()?);
        return Ok(());
    }
    let p = g.modulus().clone();
    let two = BigInt::from(2);
    loop {
        let h = random_poly(&p, g.degree(), rng);
        if h.degree() == 0 {
            continue;
        }
        let t = if p == two {
            // Trace polynomial h + h^2 + ... + h^(2^(d-1)) mod g.
            let mut acc = h.rem(g)?;
            let mut power = h.rem(g)?;
            for _ in 1..d {
                power = power.mul(&power).rem(g)?;
                acc = acc.add(&power);
            }
            acc
        } else {
            // h^((p^d - 1)/2) - 1 mod g.
            let exponent = (num_traits::pow(p.clone(), d) - BigInt::one()) / &two;
            h.powmod(&exponent, g)?.sub(&FpPoly::one(p.clone()))
        };
        let w = g.gcd(&t)?;
        if w.degree() > 0 && w.degree() < g.degree() {
            let (rest, _) = g.divrem(&w)?;
            equal_degree_split(&w, d, rng, out)?;
            equal_degree_split(&rest, d, rng, out)?;
            return Ok(());
        }
    }
}

fn random_poly(p: &BigInt, below_degree: usize, rng: &mut RngHandle) -> FpPoly {
    let coeffs = (0..below_degree)
        .map(|_| BigInt::from(rng.next_u64()).mod_floor(p))
        .collect();
    FpPoly::from_coeffs(p.clone(), coeffs)
}
