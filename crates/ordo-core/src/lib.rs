#![deny(missing_docs)]
#![doc = "Exact integer and rational linear algebra primitives shared by the ORDO order-computation crates."]

pub mod errors;
pub mod factor;
pub mod qmat;
pub mod qpoly;
pub mod rng;
pub mod zmat;

pub use errors::{ErrorInfo, OrdoError};
pub use factor::{factor, valuation};
pub use qmat::QMat;
pub use qpoly::QPoly;
pub use rng::{derive_substream_seed, RngHandle};
pub use zmat::ZMat;
