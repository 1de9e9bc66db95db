//! Ideals of an order, represented as full-rank sublattices.

use std::sync::Arc;

use num_bigint::BigInt;
use serde::Serialize;

use ordo_alg::Algebra;
use ordo_core::{ErrorInfo, OrdoError, QMat, ZMat};

use crate::order::Order;

/// Which multiplications the ideal lattice absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    /// Absorbs multiplication by the order from the left.
    Left,
    /// Absorbs multiplication by the order from the right.
    Right,
    /// Absorbs both.
    TwoSided,
}

/// A full-rank ideal lattice of a reference order.
///
/// The basis matrix is in algebra coordinates and canonical Hermite form,
/// like an order's. The reference order is carried along because the
/// multiplier-ring computation needs its basis.
#[derive(Debug, Clone)]
pub struct Ideal {
    algebra: Arc<Algebra>,
    order: Order,
    basis: QMat,
    side: Side,
}

impl PartialEq for Ideal {
    fn eq(&self, other: &Self) -> bool {
        self.algebra.fingerprint() == other.algebra.fingerprint()
            && self.order == other.order
            && self.basis == other.basis
            && self.side == other.side
    }
}

impl Eq for Ideal {}

impl Ideal {
    /// Wraps an ideal basis given in algebra coordinates.
    pub fn from_basis_matrix(order: &Order, basis: QMat, side: Side) -> Result<Self, OrdoError> {
        let n = order.algebra().dim();
        if basis.nrows() != n || basis.ncols() != n {
            return Err(OrdoError::Precondition(
                ErrorInfo::new("basis-shape", "ideal basis must be square of the algebra dimension")
                    .with_context("shape", format!("{}x{}", basis.nrows(), basis.ncols())),
            ));
        }
        let canonical = QMat::new(basis.numerator().hnf_upper(), basis.denominator().clone())?;
        if canonical.numerator().nonzero_rows() != n {
            return Err(OrdoError::Precondition(ErrorInfo::new(
                "ideal-rank-deficient",
                "ideal lattice must have full rank",
            )));
        }
        Ok(Self {
            algebra: order.algebra().clone(),
            order: order.clone(),
            basis: canonical,
            side,
        })
    }

    /// Lifts a mod-p row basis (in order coordinates) to the ideal lattice
    /// it generates together with `p · O`, mapped to algebra coordinates.
    pub fn from_modp_rows(
        order: &Order,
        rows: &[Vec<BigInt>],
        p: &BigInt,
        side: Side,
    ) -> Result<Self, OrdoError> {
        let n = order.algebra().dim();
        let mut stacked: Vec<Vec<BigInt>> = rows.to_vec();
        for i in 0..n {
            let mut row = vec![BigInt::from(0); n];
            row[i] = p.clone();
            stacked.push(row);
        }
        let lattice = ZMat::from_rows(stacked)?.hnf_upper().top_rows(n);
        // Order coordinates back to algebra coordinates.
        let basis = QMat::from_zmat(lattice).mul(order.basis_matrix())?;
        Self::from_basis_matrix(order, basis, side)
    }

    /// The ambient algebra.
    pub fn algebra(&self) -> &Arc<Algebra> {
        &self.algebra
    }

    /// The reference order.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Canonical basis matrix in algebra coordinates.
    pub fn basis_matrix(&self) -> &QMat {
        &self.basis
    }

    /// Which side the ideal absorbs.
    pub fn side(&self) -> Side {
        self.side
    }
}
