//! Orders: full-rank unital lattices in a rational algebra.
//!
//! An order is immutable after construction. Its basis matrix is kept in
//! canonical upper Hermite form, so two orders describe the same lattice
//! exactly when their basis matrices are equal. Derived data (inverse,
//! trace form, discriminant, maximality) lives in write-once cells.

use std::sync::{Arc, OnceLock};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use ordo_alg::{Algebra, AlgebraElement, OrderTable};
use ordo_core::{ErrorInfo, OrdoError, QMat, ZMat};

/// Rounds of product saturation attempted before a generating set is
/// declared not multiplicatively closed.
const CLOSURE_ROUNDS: usize = 16;

/// A full-rank lattice in a rational algebra, closed under multiplication
/// and containing the unit.
#[derive(Debug, Clone)]
pub struct Order {
    algebra: Arc<Algebra>,
    /// Rows are the lattice basis in algebra coordinates, canonical HNF.
    basis: QMat,
    inverse: OnceLock<QMat>,
    basis_elements: OnceLock<Vec<AlgebraElement>>,
    trace_form: OnceLock<ZMat>,
    discriminant: OnceLock<BigInt>,
    maximality: OnceLock<bool>,
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.algebra.fingerprint() == other.algebra.fingerprint() && self.basis == other.basis
    }
}

impl Eq for Order {}

impl Serialize for Order {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Order", 2)?;
        st.serialize_field("algebra_fingerprint", &self.algebra.fingerprint())?;
        st.serialize_field("basis_matrix", &self.basis)?;
        st.end()
    }
}

impl Order {
    /// Builds an order from a basis matrix whose rows span the lattice in
    /// algebra coordinates.
    ///
    /// The matrix is brought to canonical Hermite form. Full rank and
    /// containment of the algebra unit are checked here; multiplicative
    /// closure is checked lazily when the integral multiplication table is
    /// first extracted.
    pub fn from_basis_matrix(algebra: Arc<Algebra>, basis: QMat) -> Result<Self, OrdoError> {
        let n = algebra.dim();
        if basis.nrows() != n || basis.ncols() != n {
            return Err(OrdoError::Generators(
                ErrorInfo::new("basis-shape", "order basis must be square of the algebra dimension")
                    .with_context("dim", n.to_string())
                    .with_context("shape", format!("{}x{}", basis.nrows(), basis.ncols())),
            ));
        }
        let canonical = QMat::new(basis.numerator().hnf_upper(), basis.denominator().clone())?;
        if canonical.numerator().nonzero_rows() != n {
            return Err(OrdoError::Generators(ErrorInfo::new(
                "generators-not-full-rank",
                "order basis does not span the algebra",
            )));
        }
        let order = Self {
            algebra,
            basis: canonical,
            inverse: OnceLock::new(),
            basis_elements: OnceLock::new(),
            trace_form: OnceLock::new(),
            discriminant: OnceLock::new(),
            maximality: OnceLock::new(),
        };
        let unit = order.inverse()?.mul_row_vec(order.algebra.unit_coords())?;
        if unit.iter().any(|c| !c.is_integer()) {
            return Err(OrdoError::Generators(ErrorInfo::new(
                "unit-not-contained",
                "order lattice does not contain the algebra unit",
            )));
        }
        Ok(order)
    }

    /// Builds an order as the multiplicative closure of a generating set.
    ///
    /// The unit is always adjoined. With `validate` set, the span is
    /// saturated under pairwise products until it stabilizes; a span that
    /// keeps growing is rejected with `generators-not-closed`.
    pub fn from_generators(
        algebra: Arc<Algebra>,
        generators: &[AlgebraElement],
        validate: bool,
    ) -> Result<Self, OrdoError> {
        let n = algebra.dim();
        let mut rows = vec![algebra.unit_coords().to_vec()];
        for g in generators {
            if g.algebra().fingerprint() != algebra.fingerprint() {
                return Err(OrdoError::Precondition(ErrorInfo::new(
                    "algebra-mismatch",
                    "generator belongs to a different algebra",
                )));
            }
            rows.push(g.coords().to_vec());
        }
        let mut lattice = hnf_span(rows)?;
        if validate {
            let mut closed = false;
            for _ in 0..CLOSURE_ROUNDS {
                let mut product_rows: Vec<Vec<BigRational>> =
                    (0..lattice.nrows()).map(|i| lattice.row(i)).collect();
                for i in 0..lattice.nrows() {
                    for j in 0..lattice.nrows() {
                        product_rows.push(algebra.mul_coords(&lattice.row(i), &lattice.row(j)));
                    }
                }
                let next = hnf_span(product_rows)?;
                if next == lattice {
                    closed = true;
                    break;
                }
                lattice = next;
            }
            if !closed {
                return Err(OrdoError::Generators(
                    ErrorInfo::new(
                        "generators-not-closed",
                        "generator span does not stabilize under products",
                    )
                    .with_context("rounds", CLOSURE_ROUNDS.to_string()),
                ));
            }
        }
        if lattice.nrows() != n {
            return Err(OrdoError::Generators(
                ErrorInfo::new(
                    "generators-not-full-rank",
                    "generator span has deficient rank",
                )
                .with_context("rank", lattice.nrows().to_string())
                .with_context("dim", n.to_string()),
            ));
        }
        Self::from_basis_matrix(algebra, lattice)
    }

    /// The standard lattice `Z^n` as an order; requires an integral
    /// multiplication table and integral unit coordinates.
    pub fn equation_order(algebra: Arc<Algebra>) -> Result<Self, OrdoError> {
        let n = algebra.dim();
        for i in 0..n {
            for j in 0..n {
                let prod = algebra.mul_coords(&algebra.basis_coords(i), &algebra.basis_coords(j));
                if prod.iter().any(|c| !c.is_integer()) {
                    return Err(OrdoError::Precondition(
                        ErrorInfo::new(
                            "table-not-integral",
                            "equation order requires integral structure constants",
                        )
                        .with_context("pair", format!("({i},{j})")),
                    ));
                }
            }
        }
        if algebra.unit_coords().iter().any(|c| !c.is_integer()) {
            return Err(OrdoError::Precondition(ErrorInfo::new(
                "unit-not-integral",
                "equation order requires integral unit coordinates",
            )));
        }
        Self::from_basis_matrix(algebra, QMat::from_zmat(ZMat::identity(n)))
    }

    /// The ambient algebra.
    pub fn algebra(&self) -> &Arc<Algebra> {
        &self.algebra
    }

    /// Canonical basis matrix; rows are basis vectors in algebra coordinates.
    pub fn basis_matrix(&self) -> &QMat {
        &self.basis
    }

    /// Cached inverse of the basis matrix.
    pub fn inverse(&self) -> Result<&QMat, OrdoError> {
        if let Some(inv) = self.inverse.get() {
            return Ok(inv);
        }
        let inv = self.basis.inverse()?;
        Ok(self.inverse.get_or_init(|| inv))
    }

    /// Basis vectors as algebra elements.
    pub fn basis_elements(&self) -> Result<&[AlgebraElement], OrdoError> {
        if let Some(elems) = self.basis_elements.get() {
            return Ok(elems);
        }
        let mut elems = Vec::with_capacity(self.basis.nrows());
        for i in 0..self.basis.nrows() {
            elems.push(AlgebraElement::new(self.algebra.clone(), self.basis.row(i))?);
        }
        Ok(self.basis_elements.get_or_init(|| elems))
    }

    /// Whether the lattice contains the element.
    pub fn contains(&self, x: &AlgebraElement) -> Result<bool, OrdoError> {
        if x.algebra().fingerprint() != self.algebra.fingerprint() {
            return Err(OrdoError::Precondition(ErrorInfo::new(
                "algebra-mismatch",
                "element belongs to a different algebra",
            )));
        }
        let sol = self.inverse()?.mul_row_vec(x.coords())?;
        Ok(sol.iter().all(|c| c.is_integer()))
    }

    /// Lattice index `[other : self]` for `self ⊆ other`.
    pub fn index_in(&self, other: &Order) -> Result<BigInt, OrdoError> {
        if self.algebra.fingerprint() != other.algebra.fingerprint() {
            return Err(OrdoError::Precondition(ErrorInfo::new(
                "algebra-mismatch",
                "orders live in different algebras",
            )));
        }
        // Determinant quotients alone miss incomparable lattices of equal
        // covolume; the change of basis must itself be integral.
        let change = self.basis.mul(other.inverse()?)?;
        if !change.is_integral() {
            return Err(OrdoError::Precondition(ErrorInfo::new(
                "not-a-sublattice",
                "index is defined only for a contained order",
            )));
        }
        Ok(change.det()?.abs().to_integer())
    }

    /// Gram matrix of the reduced trace form on the order basis.
    pub fn trace_form(&self) -> Result<&ZMat, OrdoError> {
        if let Some(g) = self.trace_form.get() {
            return Ok(g);
        }
        let n = self.algebra.dim();
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                let prod = self.algebra.mul_coords(&self.basis.row(i), &self.basis.row(j));
                let t = self.algebra.reduced_trace(&prod);
                if !t.is_integer() {
                    return Err(OrdoError::Algebra(
                        ErrorInfo::new(
                            "non-integral-trace",
                            "reduced trace of an order product is not an integer",
                        )
                        .with_context("pair", format!("({i},{j})")),
                    ));
                }
                row.push(t.to_integer());
            }
            rows.push(row);
        }
        let g = ZMat::from_rows(rows)?;
        Ok(self.trace_form.get_or_init(|| g))
    }

    /// Discriminant: determinant of the trace form.
    pub fn discriminant(&self) -> Result<&BigInt, OrdoError> {
        if let Some(d) = self.discriminant.get() {
            return Ok(d);
        }
        let d = self.trace_form()?.det()?;
        Ok(self.discriminant.get_or_init(|| d))
    }

    /// Maximality, if it has been established; never reset once written.
    pub fn maximality(&self) -> Option<bool> {
        self.maximality.get().copied()
    }

    pub(crate) fn mark_maximality(&self, value: bool) {
        let _ = self.maximality.set(value);
    }

    /// Extracts the integral multiplication table of the order in its own
    /// basis, failing when the lattice is not multiplicatively closed.
    pub fn integral_table(&self) -> Result<OrderTable, OrdoError> {
        let n = self.algebra.dim();
        let inv = self.inverse()?;
        let mut table = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                let prod = self.algebra.mul_coords(&self.basis.row(i), &self.basis.row(j));
                row.push(integral_coords(&inv.mul_row_vec(&prod)?, i, j)?);
            }
            table.push(row);
        }
        let unit = integral_coords(&inv.mul_row_vec(self.algebra.unit_coords())?, 0, 0)?;
        OrderTable::new(table, unit)
    }
}

fn integral_coords(v: &[BigRational], i: usize, j: usize) -> Result<Vec<BigInt>, OrdoError> {
    let mut out = Vec::with_capacity(v.len());
    for c in v {
        if !c.is_integer() {
            return Err(OrdoError::Precondition(
                ErrorInfo::new(
                    "order-not-closed",
                    "lattice is not closed under multiplication",
                )
                .with_context("pair", format!("({i},{j})")),
            ));
        }
        out.push(c.to_integer());
    }
    Ok(out)
}

/// Canonical HNF span of rational rows, zero rows dropped.
fn hnf_span(rows: Vec<Vec<BigRational>>) -> Result<QMat, OrdoError> {
    let m = QMat::from_rational_rows(rows)?;
    let h = QMat::new(m.numerator().hnf_upper(), m.denominator().clone())?;
    let rank = h.numerator().nonzero_rows();
    Ok(h.top_rows(rank))
}

/// Restricted lattice sum of two orders that are p-maximal at disjoint
/// prime sets: stack the bases, reduce, keep the pivot rows.
///
/// For orders not meeting that precondition the result is still the
/// lattice sum, which need not be multiplicatively closed; downstream
/// table extraction reports that case.
pub fn combine_pmaximal(a: &Order, b: &Order) -> Result<Order, OrdoError> {
    if a.algebra().fingerprint() != b.algebra().fingerprint() {
        return Err(OrdoError::Precondition(ErrorInfo::new(
            "algebra-mismatch",
            "lattice sum requires orders in one algebra",
        )));
    }
    let stacked = a.basis_matrix().vcat(b.basis_matrix())?;
    let reduced = QMat::new(stacked.numerator().hnf_upper(), stacked.denominator().clone())?;
    let top = reduced.top_rows(a.algebra().dim());
    Order::from_basis_matrix(a.algebra().clone(), top)
}
