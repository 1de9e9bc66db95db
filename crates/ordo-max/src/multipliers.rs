//! Ring of multipliers of an ideal lattice.

use serde::Serialize;

use ordo_core::{ErrorInfo, OrdoError, QMat};

use crate::ideal::Ideal;
use crate::order::Order;

/// Which multiplier set is requested: the label names the set, so right
/// multipliers put the candidate on the left of the ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Left multipliers `x` with `I · x ⊆ I`.
    Left,
    /// Right multipliers `x` with `x · I ⊆ I`.
    Right,
}

/// Computes the order `{x : x·I ⊆ I}` for [`Action::Right`], or the
/// left-multiplier analogue `{x : I·x ⊆ I}`.
///
/// With `B` the ideal basis and `R(b_j)` the representation matrix of the
/// `j`-th ideal basis vector, `x` is a multiplier exactly when every
/// `x · R(b_j) · B⁻¹` is integral. Writing the stacked constraint matrix as
/// `N/d`, the solution lattice is spanned by the rows of `d · (H₀ᵀ)⁻¹`
/// where `H₀` is the pivot block of the Hermite form of `Nᵀ`.
pub fn ring_of_multipliers(ideal: &Ideal, action: Action) -> Result<Order, OrdoError> {
    let algebra = ideal.algebra();
    let n = algebra.dim();
    let basis_inv = ideal.basis_matrix().inverse()?;
    let mut constraint: Option<QMat> = None;
    for j in 0..n {
        let b_j = ideal.basis_matrix().row(j);
        // Row convention: coords(x · b_j) = x · R(b_j) and
        // coords(b_j · x) = x · L(b_j).
        let rep = match action {
            Action::Right => algebra.right_mul_matrix(&b_j)?,
            Action::Left => algebra.left_mul_matrix(&b_j)?,
        };
        let block = rep.mul(&basis_inv)?;
        constraint = Some(match constraint {
            Some(c) => c.hcat(&block)?,
            None => block,
        });
    }
    let constraint = constraint.ok_or_else(|| {
        OrdoError::Precondition(ErrorInfo::new(
            "empty-ideal-basis",
            "multiplier ring needs a non-empty ideal basis",
        ))
    })?;
    let den = constraint.denominator().clone();
    let hermite = constraint.numerator().transpose().hnf_upper();
    if hermite.nonzero_rows() != n {
        return Err(OrdoError::Matrix(ErrorInfo::new(
            "multiplier-lattice-rank",
            "constraint lattice lost rank; ideal basis was degenerate",
        )));
    }
    let pivot_block = hermite.top_rows(n);
    let dual = QMat::from_zmat(pivot_block.transpose()).inverse()?;
    let basis = QMat::new(dual.numerator().scalar_mul(&den), dual.denominator().clone())?;
    Order::from_basis_matrix(algebra.clone(), basis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ideal::Side;
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use ordo_alg::quadratic_field;
    use ordo_core::ZMat;
    use std::sync::Arc;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn order_from_rows(alg: &Arc<ordo_alg::Algebra>, rows: &[&[i64]]) -> Order {
        let m = QMat::from_rational_rows(
            rows.iter()
                .map(|r| r.iter().map(|&v| rat(v)).collect())
                .collect(),
        )
        .unwrap();
        Order::from_basis_matrix(alg.clone(), m).unwrap()
    }

    #[test]
    fn multipliers_of_the_radical_enlarge_z_2sqrt2() {
        // O = Z + 2*sqrt(2) Z inside Q(sqrt(2)); the radical over 2 has
        // multiplier ring Z[sqrt(2)].
        let alg = quadratic_field(2).unwrap();
        let order = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
        let ideal = Ideal::from_modp_rows(
            &order,
            &[vec![BigInt::from(0), BigInt::from(1)]],
            &BigInt::from(2),
            Side::TwoSided,
        )
        .unwrap();
        let bigger = ring_of_multipliers(&ideal, Action::Left).unwrap();
        assert_eq!(bigger, Order::equation_order(alg).unwrap());
        assert_eq!(order.index_in(&bigger).unwrap(), BigInt::from(2));
    }

    #[test]
    fn multiplier_ring_contains_the_reference_order() {
        let alg = quadratic_field(-1).unwrap();
        let order = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
        let ideal = Ideal::from_modp_rows(
            &order,
            &[vec![BigInt::from(0), BigInt::from(1)]],
            &BigInt::from(2),
            Side::TwoSided,
        )
        .unwrap();
        let ring = ring_of_multipliers(&ideal, Action::Left).unwrap();
        for elem in order.basis_elements().unwrap() {
            assert!(ring.contains(elem).unwrap());
        }
    }

    #[test]
    fn left_and_right_multipliers_differ_in_a_matrix_algebra() {
        // I = integer matrices with even second row, a right ideal of
        // M_2(Z). Its right multipliers {x : x*I in I} pick up E12/2,
        // while its left multipliers are M_2(Z) itself.
        let alg = ordo_alg::matrix_algebra(2).unwrap();
        let order = Order::equation_order(alg.clone()).unwrap();
        let basis = QMat::from_rational_rows(vec![
            vec![rat(1), rat(0), rat(0), rat(0)],
            vec![rat(0), rat(1), rat(0), rat(0)],
            vec![rat(0), rat(0), rat(2), rat(0)],
            vec![rat(0), rat(0), rat(0), rat(2)],
        ])
        .unwrap();
        let ideal = Ideal::from_basis_matrix(&order, basis, Side::Right).unwrap();

        let right = ring_of_multipliers(&ideal, Action::Right).unwrap();
        let half_e12 = ordo_alg::AlgebraElement::new(
            alg.clone(),
            vec![
                rat(0),
                BigRational::new(BigInt::from(1), BigInt::from(2)),
                rat(0),
                rat(0),
            ],
        )
        .unwrap();
        assert!(right.contains(&half_e12).unwrap());
        assert!(!right.basis_matrix().is_integral());

        let left = ring_of_multipliers(&ideal, Action::Left).unwrap();
        assert_eq!(left, order);
    }

    #[test]
    fn full_lattice_is_its_own_multiplier_ring() {
        let alg = quadratic_field(-1).unwrap();
        let order = Order::equation_order(alg.clone()).unwrap();
        let ideal = Ideal::from_basis_matrix(
            &order,
            QMat::from_zmat(ZMat::identity(2)),
            Side::TwoSided,
        )
        .unwrap();
        let ring = ring_of_multipliers(&ideal, Action::Right).unwrap();
        assert_eq!(ring, order);
    }
}
