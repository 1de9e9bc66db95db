//! Finite-dimensional associative algebras over the rationals, given by
//! structure constants.
//!
//! An [`Algebra`] is immutable once constructed. Elements are coordinate
//! row vectors tied to an `Arc` of their algebra; the multiplication table
//! `e_i * e_j = sum_k c_ijk e_k` is the single source of truth for products,
//! representation matrices and traces.

use std::hash::Hasher;
use std::sync::{Arc, OnceLock};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use siphasher::sip::SipHasher13;

use ordo_core::{ErrorInfo, OrdoError, QMat};

/// Structure-constant algebra over Q.
#[derive(Debug)]
pub struct Algebra {
    dim: usize,
    /// `table[i][j]` holds the coordinates of `e_i * e_j`.
    table: Vec<Vec<Vec<BigRational>>>,
    unit: Vec<BigRational>,
    /// Reduced traces are the regular representation trace divided by this;
    /// one for commutative algebras, the degree for central simple ones.
    trd_divisor: BigInt,
    commutative: OnceLock<bool>,
    fingerprint: OnceLock<u64>,
}

impl Algebra {
    /// Constructs an algebra and validates associativity and the unit laws.
    pub fn new(
        table: Vec<Vec<Vec<BigRational>>>,
        unit: Vec<BigRational>,
    ) -> Result<Arc<Self>, OrdoError> {
        Self::with_trd_divisor(table, unit, BigInt::one())
    }

    /// Constructs a central simple algebra; the reduced trace divisor is set
    /// to the degree `sqrt(dim)`, which must be exact.
    pub fn central_simple(
        table: Vec<Vec<Vec<BigRational>>>,
        unit: Vec<BigRational>,
    ) -> Result<Arc<Self>, OrdoError> {
        let dim = table.len();
        let deg = integer_sqrt(dim).ok_or_else(|| {
            OrdoError::Algebra(
                ErrorInfo::new(
                    "dimension-not-square",
                    "central simple algebras have square dimension",
                )
                .with_context("dim", dim.to_string()),
            )
        })?;
        Self::with_trd_divisor(table, unit, BigInt::from(deg as u64))
    }

    fn with_trd_divisor(
        table: Vec<Vec<Vec<BigRational>>>,
        unit: Vec<BigRational>,
        trd_divisor: BigInt,
    ) -> Result<Arc<Self>, OrdoError> {
        let dim = table.len();
        if dim == 0 || unit.len() != dim || table.iter().any(|row| row.len() != dim) {
            return Err(OrdoError::Algebra(ErrorInfo::new(
                "malformed-table",
                "structure constant table and unit must be dim x dim x dim and dim",
            )));
        }
        for row in &table {
            for entry in row {
                if entry.len() != dim {
                    return Err(OrdoError::Algebra(ErrorInfo::new(
                        "malformed-table",
                        "structure constant entries must have length dim",
                    )));
                }
            }
        }
        let alg = Self {
            dim,
            table,
            unit,
            trd_divisor,
            commutative: OnceLock::new(),
            fingerprint: OnceLock::new(),
        };
        alg.validate()?;
        Ok(Arc::new(alg))
    }

    fn validate(&self) -> Result<(), OrdoError> {
        let n = self.dim;
        for i in 0..n {
            let e_i = self.basis_coords(i);
            let left = self.mul_coords(&self.unit, &e_i);
            let right = self.mul_coords(&e_i, &self.unit);
            if left != e_i || right != e_i {
                return Err(OrdoError::Algebra(
                    ErrorInfo::new("unit-law-violated", "supplied unit is not a two-sided unit")
                        .with_context("basis_index", i.to_string()),
                ));
            }
        }
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let ij = self.table[i][j].clone();
                    let jk = self.table[j][k].clone();
                    let left = self.mul_coords(&ij, &self.basis_coords(k));
                    let right = self.mul_coords(&self.basis_coords(i), &jk);
                    if left != right {
                        return Err(OrdoError::Algebra(
                            ErrorInfo::new("not-associative", "structure constants violate associativity")
                                .with_context("triple", format!("({i},{j},{k})")),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Dimension over Q.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of the unit element.
    pub fn unit_coords(&self) -> &[BigRational] {
        &self.unit
    }

    /// The reduced trace divisor (one unless constructed as central simple).
    pub fn trd_divisor(&self) -> &BigInt {
        &self.trd_divisor
    }

    /// Coordinate vector of the `i`-th basis element.
    pub fn basis_coords(&self, i: usize) -> Vec<BigRational> {
        let mut v = vec![BigRational::zero(); self.dim];
        v[i] = BigRational::one();
        v
    }

    /// Product of two coordinate vectors.
    pub fn mul_coords(&self, x: &[BigRational], y: &[BigRational]) -> Vec<BigRational> {
        let mut out = vec![BigRational::zero(); self.dim];
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

    /// Matrix of right multiplication by `x` in the row-vector convention:
    /// `coords(y * x) = coords(y) * R(x)`.
    pub fn right_mul_matrix(&self, x: &[BigRational]) -> Result<QMat, OrdoError> {
        let rows = (0..self.dim)
            .map(|i| self.mul_coords(&self.basis_coords(i), x))
            .collect();
        QMat::from_rational_rows(rows)
    }

    /// Matrix of left multiplication by `x` in the row-vector convention:
    /// `coords(x * y) = coords(y) * L(x)`.
    pub fn left_mul_matrix(&self, x: &[BigRational]) -> Result<QMat, OrdoError> {
        let rows = (0..self.dim)
            .map(|i| self.mul_coords(x, &self.basis_coords(i)))
            .collect();
        QMat::from_rational_rows(rows)
    }

    /// Regular representation trace of `x`.
    pub fn regular_trace(&self, x: &[BigRational]) -> BigRational {
        let mut tr = BigRational::zero();
        for (j, xj) in x.iter().enumerate() {
            if xj.is_zero() {
                continue;
            }
            for i in 0..self.dim {
                let c = &self.table[i][j][i];
                if !c.is_zero() {
                    tr += xj * c;
                }
            }
        }
        tr
    }

    /// Reduced trace of `x`.
    pub fn reduced_trace(&self, x: &[BigRational]) -> BigRational {
        self.regular_trace(x) / BigRational::from_integer(self.trd_divisor.clone())
    }

    /// True when the multiplication table is symmetric; memoized.
    pub fn is_commutative(&self) -> bool {
        *self.commutative.get_or_init(|| {
            for i in 0..self.dim {
                for j in 0..i {
                    if self.table[i][j] != self.table[j][i] {
                        return false;
                    }
                }
            }
            true
        })
    }

    /// True when the trace form of the natural basis is non-degenerate; a
    /// separable algebra is exactly one with maximal orders.
    pub fn is_separable(&self) -> Result<bool, OrdoError> {
        let rows = (0..self.dim)
            .map(|i| {
                (0..self.dim)
                    .map(|j| self.regular_trace(&self.table[i][j]))
                    .collect()
            })
            .collect();
        let gram = QMat::from_rational_rows(rows)?;
        Ok(!gram.det()?.is_zero())
    }

    /// Stable identity of the algebra instance: SipHash-1-3 over the
    /// canonical structure constants, unit and trace divisor. Two algebras
    /// with identical tables share a fingerprint, which is exactly the cache
    /// key semantics the maximal-order memo wants.
    pub fn fingerprint(&self) -> u64 {
        *self.fingerprint.get_or_init(|| {
            let mut hasher = SipHasher13::new_with_keys(0, 0);
            hasher.write_u64(self.dim as u64);
            let mut feed = |v: &BigRational| {
                let (_, num_bytes) = v.numer().to_bytes_le();
                let (_, den_bytes) = v.denom().to_bytes_le();
                hasher.write_u8(if v.numer().is_negative() { 1 } else { 0 });
                hasher.write_u64(num_bytes.len() as u64);
                hasher.write(&num_bytes);
                hasher.write_u64(den_bytes.len() as u64);
                hasher.write(&den_bytes);
            };
            for row in &self.table {
                for entry in row {
                    for c in entry {
                        feed(c);
                    }
                }
            }
            for c in &self.unit {
                feed(c);
            }
            let (_, div_bytes) = self.trd_divisor.to_bytes_le();
            hasher.write(&div_bytes);
            hasher.finish()
        })
    }
}

impl Serialize for Algebra {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Algebra", 4)?;
        st.serialize_field("dim", &self.dim)?;
        st.serialize_field("table", &self.table)?;
        st.serialize_field("unit", &self.unit)?;
        st.serialize_field("trd_divisor", &self.trd_divisor)?;
        st.end()
    }
}

/// Element of an algebra: coordinates plus a shared handle to the algebra.
#[derive(Debug, Clone)]
pub struct AlgebraElement {
    algebra: Arc<Algebra>,
    coords: Vec<BigRational>,
}

impl PartialEq for AlgebraElement {
    fn eq(&self, other: &Self) -> bool {
        self.algebra.fingerprint() == other.algebra.fingerprint() && self.coords == other.coords
    }
}

impl Eq for AlgebraElement {}

// The shared algebra is serialized by fingerprint only; the table itself
// travels with the Algebra value.
impl Serialize for AlgebraElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("AlgebraElement", 2)?;
        st.serialize_field("algebra_fingerprint", &self.algebra.fingerprint())?;
        st.serialize_field("coords", &self.coords)?;
        st.end()
    }
}

impl AlgebraElement {
    /// Wraps a coordinate vector.
    pub fn new(algebra: Arc<Algebra>, coords: Vec<BigRational>) -> Result<Self, OrdoError> {
        if coords.len() != algebra.dim() {
            return Err(OrdoError::Algebra(
                ErrorInfo::new("coordinate-length", "element coordinates must match the dimension")
                    .with_context("dim", algebra.dim().to_string())
                    .with_context("len", coords.len().to_string()),
            ));
        }
        Ok(Self { algebra, coords })
    }

    /// The unit element.
    pub fn one(algebra: Arc<Algebra>) -> Self {
        let coords = algebra.unit_coords().to_vec();
        Self { algebra, coords }
    }

    /// The algebra handle.
    pub fn algebra(&self) -> &Arc<Algebra> {
        &self.algebra
    }

    /// Coordinate slice.
    pub fn coords(&self) -> &[BigRational] {
        &self.coords
    }

    /// Product.
    pub fn mul(&self, other: &AlgebraElement) -> AlgebraElement {
        AlgebraElement {
            algebra: Arc::clone(&self.algebra),
            coords: self.algebra.mul_coords(&self.coords, &other.coords),
        }
    }

    /// Sum.
    pub fn add(&self, other: &AlgebraElement) -> AlgebraElement {
        AlgebraElement {
            algebra: Arc::clone(&self.algebra),
            coords: self
                .coords
                .iter()
                .zip(&other.coords)
                .map(|(a, b)| a + b)
                .collect(),
        }
    }

    /// Reduced trace.
    pub fn reduced_trace(&self) -> BigRational {
        self.algebra.reduced_trace(&self.coords)
    }
}

/// Exact integer square root, if the input is a perfect square.
pub fn integer_sqrt(n: usize) -> Option<usize> {
    let mut r = 0usize;
    while r * r < n {
        r += 1;
    }
    (r * r == n).then_some(r)
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// The quadratic field Q(sqrt(d)) with basis `{1, sqrt(d)}`.
pub fn quadratic_field(d: i64) -> Result<Arc<Algebra>, OrdoError> {
    let z = rat(0);
    let o = rat(1);
    let table = vec![
        vec![vec![o.clone(), z.clone()], vec![z.clone(), o.clone()]],
        vec![vec![z.clone(), o.clone()], vec![rat(d), z.clone()]],
    ];
    Algebra::new(table, vec![o, z])
}

/// The full matrix algebra `M_n(Q)` with basis `E_11, E_12, ..., E_nn` in
/// row-major order.
pub fn matrix_algebra(n: usize) -> Result<Arc<Algebra>, OrdoError> {
    let dim = n * n;
    let z = rat(0);
    let mut table = vec![vec![vec![z.clone(); dim]; dim]; dim];
    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                for d in 0..n {
                    // E_ab * E_cd = delta_bc E_ad
                    if b == c {
                        table[a * n + b][c * n + d][a * n + d] = rat(1);
                    }
                }
            }
        }
    }
    let mut unit = vec![z; dim];
    for i in 0..n {
        unit[i * n + i] = rat(1);
    }
    Algebra::central_simple(table, unit)
}

/// The quaternion algebra `(a, b | Q)` with basis `{1, i, j, k}`,
/// `i^2 = a`, `j^2 = b`, `ij = -ji = k`.
pub fn quaternion_algebra(a: i64, b: i64) -> Result<Arc<Algebra>, OrdoError> {
    let z = rat(0);
    let e = |idx: usize, v: i64| {
        let mut c = vec![rat(0); 4];
        c[idx] = rat(v);
        c
    };
    let table = vec![
        // 1 * {1, i, j, k}
        vec![e(0, 1), e(1, 1), e(2, 1), e(3, 1)],
        // i * {1, i, j, k}
        vec![e(1, 1), e(0, a), e(3, 1), e(2, a)],
        // j * {1, i, j, k}
        vec![e(2, 1), e(3, -1), e(0, b), e(1, -b)],
        // k * {1, i, j, k}
        vec![e(3, 1), e(2, -a), e(1, b), e(0, -a * b)],
    ];
    let mut unit = vec![z; 4];
    unit[0] = rat(1);
    Algebra::central_simple(table, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_carries_table_and_fingerprint() {
        let alg = quadratic_field(-1).unwrap();
        let json = serde_json::to_value(alg.as_ref()).unwrap();
        assert_eq!(json["dim"], 2);
        assert_eq!(json["table"].as_array().unwrap().len(), 2);
        assert_eq!(json["unit"].as_array().unwrap().len(), 2);
        let elem = AlgebraElement::one(alg.clone());
        let json = serde_json::to_value(&elem).unwrap();
        assert_eq!(
            json["algebra_fingerprint"].as_u64().unwrap(),
            alg.fingerprint()
        );
        assert_eq!(json["coords"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn quadratic_field_traces() {
        let alg = quadratic_field(2).unwrap();
        assert_eq!(alg.regular_trace(&alg.basis_coords(0)), rat(2));
        assert_eq!(alg.regular_trace(&alg.basis_coords(1)), rat(0));
        assert!(alg.is_commutative());
    }

    #[test]
    fn quaternion_relations_hold() {
        let alg = quaternion_algebra(-1, -1).unwrap();
        let i = alg.basis_coords(1);
        let j = alg.basis_coords(2);
        let ij = alg.mul_coords(&i, &j);
        assert_eq!(ij, alg.basis_coords(3));
        let ji = alg.mul_coords(&j, &i);
        assert_eq!(ji[3], rat(-1));
        assert!(!alg.is_commutative());
    }

    #[test]
    fn matrix_algebra_unit_and_trace() {
        let alg = matrix_algebra(2).unwrap();
        let unit = alg.unit_coords().to_vec();
        assert_eq!(alg.mul_coords(&unit, &alg.basis_coords(1)), alg.basis_coords(1));
        // Reduced trace of E_11 is the matrix trace, i.e. 1.
        assert_eq!(alg.reduced_trace(&alg.basis_coords(0)), rat(1));
    }

    #[test]
    fn fingerprints_distinguish_tables() {
        let a = quadratic_field(2).unwrap();
        let b = quadratic_field(3).unwrap();
        let a2 = quadratic_field(2).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a2.fingerprint());
    }
}
