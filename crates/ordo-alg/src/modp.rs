//! Modular structure of an order: p-radical and maximal two-sided ideals.
//!
//! Input is the integral multiplication table of an order `O` in its own
//! basis; everything here works in the finite dimensional F_p-algebra
//! `O/pO`. Two radical routines are provided: the trace-form kernel, valid
//! for `p > dim`, and the iterated p-power-trace filtration, valid for every
//! prime. The maximal-ideal enumerator decomposes the semisimple quotient by
//! splitting its center into primitive idempotents.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

use ordo_core::{ErrorInfo, OrdoError, RngHandle};

use crate::fpmat::FpMat;
use crate::fppoly::{ext_gcd, FpPoly};

/// Integral multiplication table of an order in its own basis, plus the
/// coordinates of the ring unit in that basis.
#[derive(Debug, Clone)]
pub struct OrderTable {
    dim: usize,
    table: Vec<Vec<Vec<BigInt>>>,
    unit: Vec<BigInt>,
    /// `tvec[j]` is the regular trace of the `j`-th basis element.
    tvec: Vec<BigInt>,
}

impl OrderTable {
    /// Wraps a structure table; `table[i][j]` are the coordinates of
    /// `b_i * b_j` and must have length `dim`.
    pub fn new(
        table: Vec<Vec<Vec<BigInt>>>,
        unit: Vec<BigInt>,
    ) -> Result<Self, OrdoError> {
        let dim = table.len();
        if dim == 0
            || unit.len() != dim
            || table
                .iter()
                .any(|row| row.len() != dim || row.iter().any(|e| e.len() != dim))
        {
            return Err(OrdoError::Algebra(ErrorInfo::new(
                "malformed-table",
                "order table must be dim x dim x dim with a dim-length unit",
            )));
        }
        let tvec = (0..dim)
            .map(|j| (0..dim).map(|i| table[i][j][i].clone()).sum())
            .collect();
        Ok(Self {
            dim,
            table,
            unit,
            tvec,
        })
    }

    /// Dimension of the order.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Exact product of coordinate vectors over Z.
    pub fn mul_int(&self, x: &[BigInt], y: &[BigInt]) -> Vec<BigInt> {
        let mut out = vec![BigInt::zero(); self.dim];
        for (i, xi) in x.iter().enumerate() {
            if xi.is_zero() {
                continue;
            }
            for (j, yj) in y.iter().enumerate() {
                if yj.is_zero() {
                    continue;
                }
                let f = xi * yj;
                for (k, c) in self.table[i][j].iter().enumerate() {
                    if !c.is_zero() {
                        let v = &out[k] + &f * c;
                        out[k] = v;
                    }
                }
            }
        }
        out
    }

    /// Regular trace of a coordinate vector, over Z.
    pub fn trace_int(&self, x: &[BigInt]) -> BigInt {
        x.iter()
            .zip(&self.tvec)
            .map(|(xi, t)| xi * t)
            .sum()
    }

    fn pow_int(&self, x: &[BigInt], e: u64) -> Vec<BigInt> {
        let mut result = self.unit.clone();
        let mut base = x.to_vec();
        let mut e = e;
        while e > 0 {
            if e & 1 == 1 {
                result = self.mul_int(&result, &base);
            }
            e >>= 1;
            if e > 0 {
                base = self.mul_int(&base, &base);
            }
        }
        result
    }

    /// Trace Gram matrix `G[i][j] = Tr(b_i b_j)` over Z.
    pub fn trace_gram(&self) -> Vec<Vec<BigInt>> {
        (0..self.dim)
            .map(|i| {
                (0..self.dim)
                    .map(|j| self.trace_int(&self.table[i][j]))
                    .collect()
            })
            .collect()
    }

    /// Radical of `O/pO` as the kernel of the trace form mod p.
    ///
    /// Only valid for `p > dim`; the dispatcher in the saturation engine
    /// enforces that regime.
    pub fn radical_trace_kernel(&self, p: &BigInt) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        let gram = FpMat::from_rows(p.clone(), self.trace_gram())?;
        gram.kernel_basis()
    }

    /// Radical of `O/pO` for an arbitrary prime, via the iterated
    /// p-power-trace filtration on top of the trace-form kernel.
    pub fn radical_mod_p(&self, p: &BigInt) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        if p > &BigInt::from(self.dim as u64) {
            return self.radical_trace_kernel(p);
        }
        let mut v = self.radical_trace_kernel(p)?;
        // Smallest l with p^l >= dim; p <= dim here so everything stays small.
        let mut l = 0u32;
        let mut pl = BigInt::one();
        while pl < BigInt::from(self.dim as u64) {
            pl *= p;
            l += 1;
        }
        let p_u64 = u64::try_from(p.clone()).map_err(|_| {
            OrdoError::Algebra(ErrorInfo::new(
                "prime-too-large",
                "small-prime radical invoked with an oversized prime",
            ))
        })?;
        for k in 1..=l {
            if v.is_empty() {
                break;
            }
            let pk = p_u64.pow(k);
            let pk_big = num_traits::pow(p.clone(), k as usize);
            let mut rows = Vec::with_capacity(v.len());
            for vec in &v {
                let mut row = Vec::with_capacity(self.dim);
                for j in 0..self.dim {
                    let mut basis_j = vec![BigInt::zero(); self.dim];
                    basis_j[j] = BigInt::one();
                    let prod = self.mul_int(vec, &basis_j);
                    let power = self.pow_int(&prod, pk);
                    let tr = self.trace_int(&power);
                    let (q, r) = tr.div_rem(&pk_big);
                    if !r.is_zero() {
                        return Err(OrdoError::Algebra(
                            ErrorInfo::new(
                                "radical-divisibility",
                                "p-power trace was not divisible by p^k",
                            )
                            .with_context("k", k.to_string()),
                        ));
                    }
                    row.push(q);
                }
                rows.push(row);
            }
            let c = FpMat::from_rows(p.clone(), rows)?;
            let w = c.left_kernel_basis()?;
            v = combine_rows(&w, &v, p);
        }
        Ok(v)
    }

    /// Enumerates the maximal two-sided ideals of `O/pO`, returned as F_p
    /// row bases in `O` coordinates (the lattice `p*O` is not included).
    ///
    /// There is one ideal per simple factor of the semisimple quotient;
    /// the center of that quotient is split into primitive idempotents by
    /// minimal-polynomial factorization.
    pub fn maximal_ideals_mod_p(
        &self,
        p: &BigInt,
        rng: &mut RngHandle,
    ) -> Result<Vec<Vec<Vec<BigInt>>>, OrdoError> {
        let radical = self.radical_mod_p(p)?;
        let quotient = Quotient::build(self, p, &radical)?;
        let idempotents = quotient.primitive_central_idempotents(rng)?;
        let mut out = Vec::with_capacity(idempotents.len());
        for e in &idempotents {
            // Kernel of x -> pi(x) * e, an F_p subspace of O/pO.
            let mut rows = Vec::with_capacity(self.dim);
            for i in 0..self.dim {
                let mut basis_i = vec![BigInt::zero(); self.dim];
                basis_i[i] = BigInt::one();
                let image = quotient.project(&basis_i);
                rows.push(quotient.mul_b(&image, e));
            }
            let map = FpMat::from_rows(p.clone(), rows)?;
            out.push(map.left_kernel_basis()?);
        }
        Ok(out)
    }
}

/// `W * V` over F_p: each row of `W` is a coefficient vector over the rows
/// of `V`.
fn combine_rows(w: &[Vec<BigInt>], v: &[Vec<BigInt>], p: &BigInt) -> Vec<Vec<BigInt>> {
    let cols = v.first().map(Vec::len).unwrap_or(0);
    w.iter()
        .map(|coeffs| {
            let mut row = vec![BigInt::zero(); cols];
            for (c, vec) in coeffs.iter().zip(v) {
                if c.is_zero() {
                    continue;
                }
                for (slot, entry) in row.iter_mut().zip(vec) {
                    *slot = (&*slot + c * entry).mod_floor(p);
                }
            }
            row
        })
        .collect()
}

/// The semisimple quotient `B = (O/pO) / J` with multiplication table and
/// center, in a fixed complement basis.
struct Quotient {
    p: BigInt,
    /// Ambient dimension.
    n: usize,
    /// Quotient dimension.
    m: usize,
    /// Reduced row echelon basis of the radical.
    rad_rref: FpMat,
    rad_pivots: Vec<usize>,
    comp_cols: Vec<usize>,
    /// `mult[s][t]` = B-coordinates of `b_s * b_t`.
    mult: Vec<Vec<Vec<BigInt>>>,
    unit: Vec<BigInt>,
    center: Vec<Vec<BigInt>>,
}

impl Quotient {
    fn build(order: &OrderTable, p: &BigInt, radical: &[Vec<BigInt>]) -> Result<Self, OrdoError> {
        let n = order.dim();
        let mut rad_rref = FpMat::from_rows(p.clone(), radical.to_vec())?;
        let rad_pivots = rad_rref.rref()?;
        let mut is_pivot = vec![false; n];
        for &c in &rad_pivots {
            is_pivot[c] = true;
        }
        let comp_cols: Vec<usize> = (0..n).filter(|&c| !is_pivot[c]).collect();
        let m = comp_cols.len();
        let mut quotient = Quotient {
            p: p.clone(),
            n,
            m,
            rad_rref,
            rad_pivots,
            comp_cols,
            mult: Vec::new(),
            unit: Vec::new(),
            center: Vec::new(),
        };
        let mut mult = vec![vec![vec![BigInt::zero(); m]; m]; m];
        for (s, &cs) in quotient.comp_cols.clone().iter().enumerate() {
            for (t, &ct) in quotient.comp_cols.clone().iter().enumerate() {
                mult[s][t] = quotient.project(&order.table[cs][ct]);
            }
        }
        quotient.mult = mult;
        quotient.unit = quotient.project(&order.unit);
        quotient.center = quotient.compute_center()?;
        Ok(quotient)
    }

    /// Projects an ambient coordinate vector onto the complement basis.
    fn project(&self, v: &[BigInt]) -> Vec<BigInt> {
        let mut v: Vec<BigInt> = v.iter().map(|x| x.mod_floor(&self.p)).collect();
        for (r, &c) in self.rad_pivots.iter().enumerate() {
            if v[c].is_zero() {
                continue;
            }
            let f = v[c].clone();
            for j in 0..self.n {
                v[j] = (&v[j] - &f * self.rad_rref.get(r, j)).mod_floor(&self.p);
            }
        }
        self.comp_cols.iter().map(|&c| v[c].clone()).collect()
    }

    /// Bilinear product in B coordinates.
    fn mul_b(&self, x: &[BigInt], y: &[BigInt]) -> Vec<BigInt> {
        let mut out = vec![BigInt::zero(); self.m];
        for (s, xs) in x.iter().enumerate() {
            if xs.is_zero() {
                continue;
            }
            for (t, yt) in y.iter().enumerate() {
                if yt.is_zero() {
                    continue;
                }
                let f = (xs * yt).mod_floor(&self.p);
                for (k, c) in self.mult[s][t].iter().enumerate() {
                    if !c.is_zero() {
                        out[k] = (&out[k] + &f * c).mod_floor(&self.p);
                    }
                }
            }
        }
        out
    }

    fn compute_center(&self) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        if self.m == 0 {
            return Ok(Vec::new());
        }
        // z is central iff z*b_t - b_t*z = 0 for every basis direction t.
        let mut rows = Vec::with_capacity(self.m);
        for s in 0..self.m {
            let mut row = Vec::with_capacity(self.m * self.m);
            for t in 0..self.m {
                for k in 0..self.m {
                    let v = (&self.mult[s][t][k] - &self.mult[t][s][k]).mod_floor(&self.p);
                    row.push(v);
                }
            }
            rows.push(row);
        }
        let k_mat = FpMat::from_rows(self.p.clone(), rows)?;
        k_mat.left_kernel_basis()
    }

    /// Minimal polynomial of `z` inside the component with identity `e`.
    fn minimal_poly(&self, z: &[BigInt], e: &[BigInt]) -> Result<FpPoly, OrdoError> {
        let mut last = e.to_vec();
        let mut powers: Vec<Vec<BigInt>> = vec![last.clone()];
        loop {
            last = self.mul_b(&last, z);
            powers.push(last.clone());
            let mat = FpMat::from_rows(self.p.clone(), powers.clone())?;
            let kernel = mat.left_kernel_basis()?;
            if let Some(w) = kernel.into_iter().find(|w| !w[powers.len() - 1].is_zero()) {
                let k = powers.len() - 1;
                let lead_inv = crate::fpmat::inv_mod(&w[k], &self.p)?;
                let coeffs = (0..=k).map(|i| (&w[i] * &lead_inv).mod_floor(&self.p)).collect();
                return Ok(FpPoly::from_coeffs(self.p.clone(), coeffs));
            }
            if powers.len() > self.m + 1 {
                return Err(OrdoError::Algebra(ErrorInfo::new(
                    "minimal-poly-overflow",
                    "no linear dependency found among element powers",
                )));
            }
        }
    }

    /// Evaluates a polynomial at `z` with `e` as the component identity.
    fn eval_poly(&self, poly: &FpPoly, z: &[BigInt], e: &[BigInt]) -> Vec<BigInt> {
        let mut acc = vec![BigInt::zero(); self.m];
        for i in (0..=poly.degree()).rev() {
            acc = self.mul_b(&acc, z);
            let c = poly.coeff(i);
            if !c.is_zero() {
                for (slot, unit_c) in acc.iter_mut().zip(e) {
                    *slot = (&*slot + &c * unit_c).mod_floor(&self.p);
                }
            }
        }
        acc
    }

    /// Splits the center into primitive idempotents.
    ///
    /// Candidates are center basis elements, then pairwise sums, then a
    /// bounded number of seeded random center combinations; a component
    /// none of them splits is simple.
    fn primitive_central_idempotents(
        &self,
        rng: &mut RngHandle,
    ) -> Result<Vec<Vec<BigInt>>, OrdoError> {
        if self.m == 0 {
            return Ok(Vec::new());
        }
        let mut components = vec![self.unit.clone()];
        let mut stable = false;
        while !stable {
            stable = true;
            let mut next = Vec::with_capacity(components.len());
            for e in &components {
                match self.split_component(e, rng)? {
                    Some(parts) => {
                        stable = false;
                        next.extend(parts);
                    }
                    None => next.push(e.clone()),
                }
            }
            components = next;
        }
        Ok(components)
    }

    fn split_component(
        &self,
        e: &[BigInt],
        rng: &mut RngHandle,
    ) -> Result<Option<Vec<Vec<BigInt>>>, OrdoError> {
        let mut candidates: Vec<Vec<BigInt>> = Vec::new();
        for z in &self.center {
            candidates.push(self.mul_b(z, e));
        }
        for a in 0..self.center.len() {
            for b in 0..a {
                let sum: Vec<BigInt> = self.center[a]
                    .iter()
                    .zip(&self.center[b])
                    .map(|(x, y)| (x + y).mod_floor(&self.p))
                    .collect();
                candidates.push(self.mul_b(&sum, e));
            }
        }
        for _ in 0..12 {
            let mut v = vec![BigInt::zero(); self.m];
            for z in &self.center {
                let c = BigInt::from(rng.next_u64()).mod_floor(&self.p);
                for (slot, entry) in v.iter_mut().zip(z) {
                    *slot = (&*slot + &c * entry).mod_floor(&self.p);
                }
            }
            candidates.push(self.mul_b(&v, e));
        }
        for z in candidates {
            if z.iter().all(Zero::is_zero) {
                continue;
            }
            let min_poly = self.minimal_poly(&z, e)?;
            if min_poly.degree() <= 1 {
                continue;
            }
            let factors = min_poly.factor_squarefree(rng)?;
            if factors.len() < 2 {
                continue;
            }
            let mut parts = Vec::with_capacity(factors.len());
            for g in &factors {
                let (quot, _) = min_poly.divrem(g)?;
                let (gcd, inv, _) = ext_gcd(&quot, g)?;
                if gcd.degree() != 0 {
                    return Err(OrdoError::Algebra(ErrorInfo::new(
                        "idempotent-split",
                        "cofactor was not invertible modulo its factor",
                    )));
                }
                // h = quot * inv mod min_poly satisfies h = 1 mod g, 0 elsewhere.
                let h = quot.mul(&inv).rem(&min_poly)?;
                parts.push(self.eval_poly(&h, &z, e));
            }
            return Ok(Some(parts));
        }
        Ok(None)
    }
}
