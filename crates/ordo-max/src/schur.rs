//! Schur indices of a central simple algebra at the real place and at
//! finite primes, read off an order's trace form and discriminant.

use num_bigint::BigInt;

use ordo_alg::integer_sqrt;
use ordo_core::{valuation, ErrorInfo, OrdoError, QMat};

use crate::order::Order;

fn degree_of(order: &Order) -> Result<usize, OrdoError> {
    integer_sqrt(order.algebra().dim()).ok_or_else(|| {
        OrdoError::Precondition(
            ErrorInfo::new(
                "dimension-not-square",
                "Schur indices are defined for central simple algebras",
            )
            .with_context("dim", order.algebra().dim().to_string()),
        )
    })
}

/// Schur index at the real place: 1 when the algebra splits over `R`,
/// 2 when it ramifies.
///
/// The positive-eigenvalue count of the trace form is a congruence
/// invariant, so any order basis works. A split degree-`m` algebra has
/// exactly `m(m+1)/2` positive eigenvalues; ramification lowers the
/// count.
pub fn schur_index_at_real_place(order: &Order) -> Result<u32, OrdoError> {
    let m = degree_of(order)?;
    let gram = QMat::from_zmat(order.trace_form()?.clone());
    let charpoly = gram.charpoly()?;
    let mut npos = 0usize;
    for (factor, mult) in charpoly.squarefree_factors() {
        npos += mult as usize * factor.count_positive_roots();
    }
    Ok(if npos == m * (m + 1) / 2 { 1 } else { 2 })
}

/// Schur index at a finite prime, read off the discriminant valuation of
/// a confirmed maximal order: `m_p = m / (m − v_p(disc)/m)`.
pub fn schur_index_at_p(order: &Order, p: &BigInt) -> Result<u32, OrdoError> {
    if order.maximality() != Some(true) {
        return Err(OrdoError::Precondition(ErrorInfo::new(
            "schur-index-nonmaximal-order",
            "local Schur indices require a confirmed maximal order",
        )));
    }
    let m = degree_of(order)? as u32;
    let v = valuation(order.discriminant()?, p);
    if v % m != 0 {
        return Err(OrdoError::Algebra(
            ErrorInfo::new(
                "local-valuation-shape",
                "discriminant valuation is incompatible with a central simple algebra",
            )
            .with_context("valuation", v.to_string())
            .with_context("degree", m.to_string()),
        ));
    }
    let local_capacity = m - v / m;
    if local_capacity == 0 || m % local_capacity != 0 {
        return Err(OrdoError::Algebra(
            ErrorInfo::new(
                "local-valuation-shape",
                "discriminant valuation is incompatible with a central simple algebra",
            )
            .with_context("valuation", v.to_string())
            .with_context("degree", m.to_string()),
        ));
    }
    Ok(m / local_capacity)
}
