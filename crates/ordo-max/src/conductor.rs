//! Conductor of an overorder into a suborder.

use ordo_core::{ErrorInfo, OrdoError, QMat};

use crate::ideal::{Ideal, Side};
use crate::multipliers::Action;
use crate::order::Order;

/// The right conductor `{x : x·S ⊆ R}` (for [`Action::Right`]) of the
/// nested pair `R ⊆ S`, as an ideal of `R`; [`Action::Left`] gives
/// `{x : S·x ⊆ R}`.
///
/// The inclusion is checked first: every `S`-coordinate of an `R`-basis
/// vector must be integral. The constraint lattice is assembled in `R`
/// coordinates, one representation-matrix block per `S`-basis vector, and
/// solved by the same dual-lattice reduction the multiplier ring uses.
/// The returned ideal absorbs `S` on the side opposite the action.
pub fn conductor(inner: &Order, outer: &Order, action: Action) -> Result<Ideal, OrdoError> {
    if inner.algebra().fingerprint() != outer.algebra().fingerprint() {
        return Err(OrdoError::Precondition(ErrorInfo::new(
            "algebra-mismatch",
            "conductor requires orders in one algebra",
        )));
    }
    let change = inner.basis_matrix().mul(outer.inverse()?)?;
    if !change.is_integral() {
        return Err(OrdoError::Inclusion(ErrorInfo::new(
            "non-integral-inclusion",
            "conductor requires the first order to be contained in the second",
        )));
    }
    let algebra = inner.algebra();
    let n = algebra.dim();
    let basis = inner.basis_matrix();
    let basis_inv = inner.inverse()?;
    let mut constraint: Option<QMat> = None;
    for i in 0..n {
        let s_i = outer.basis_matrix().row(i);
        let rep = match action {
            Action::Right => algebra.right_mul_matrix(&s_i)?,
            Action::Left => algebra.left_mul_matrix(&s_i)?,
        };
        let block = basis.mul(&rep)?.mul(basis_inv)?;
        constraint = Some(match constraint {
            Some(c) => c.hcat(&block)?,
            None => block,
        });
    }
    let constraint = constraint.ok_or_else(|| {
        OrdoError::Precondition(ErrorInfo::new(
            "empty-order-basis",
            "conductor needs a non-empty order basis",
        ))
    })?;
    let den = constraint.denominator().clone();
    let hermite = constraint.numerator().transpose().hnf_upper();
    if hermite.nonzero_rows() != n {
        return Err(OrdoError::Matrix(ErrorInfo::new(
            "conductor-lattice-rank",
            "conductor constraint lattice lost rank",
        )));
    }
    let dual = QMat::from_zmat(hermite.top_rows(n).transpose()).inverse()?;
    let lattice = QMat::new(dual.numerator().scalar_mul(&den), dual.denominator().clone())?;
    // Back from R coordinates to algebra coordinates.
    let ideal_basis = lattice.mul(basis)?;
    // A right conductor is a left ideal of R, and vice versa.
    let side = match action {
        Action::Right => Side::Left,
        Action::Left => Side::Right,
    };
    Ideal::from_basis_matrix(inner, ideal_basis, side)
}
