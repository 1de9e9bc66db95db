#![deny(missing_docs)]
#![doc = "Finite-dimensional rational algebras by structure constants, plus the mod-p layer (radical, maximal ideals) consumed by the ORDO maximal-order engine."]

pub mod algebra;
pub mod fpmat;
pub mod fppoly;
pub mod modp;

pub use algebra::{
    integer_sqrt, matrix_algebra, quadratic_field, quaternion_algebra, Algebra, AlgebraElement,
};
pub use fpmat::{inv_mod, FpMat};
pub use fppoly::{ext_gcd, FpPoly};
pub use modp::OrderTable;
