#![deny(missing_docs)]
#![doc = "Maximal-order refinement for finite-dimensional rational algebras: orders and ideals as exact lattices, prime-by-prime saturation, conductors, and Schur indices."]

pub mod conductor;
pub mod ideal;
pub mod maximal;
pub mod multipliers;
pub mod order;
pub mod schur;

pub use conductor::conductor;
pub use ideal::{Ideal, Side};
pub use maximal::{maximal_order, maximal_order_uncached, pmaximal_overorder, MaximalOrderCache};
pub use multipliers::{ring_of_multipliers, Action};
pub use order::{combine_pmaximal, Order};
pub use schur::{schur_index_at_p, schur_index_at_real_place};
