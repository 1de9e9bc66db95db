//! Prime-by-prime saturation of an order up to the maximal order.
//!
//! For each prime whose square divides the discriminant the order is
//! enlarged inside its p-saturation: either by iterating radical
//! idealizers (large primes) or by enumerating maximal two-sided ideals
//! over `p·O` and adopting any idealizer that moves the lattice (small
//! primes, and the fall-through for stalled radical iteration). Every
//! adoption divides the discriminant by the square of the index, so both
//! loops terminate.

use std::collections::BTreeMap;

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use ordo_core::{derive_substream_seed, factor, valuation, ErrorInfo, OrdoError, RngHandle};

use crate::ideal::{Ideal, Side};
use crate::multipliers::{ring_of_multipliers, Action};
use crate::order::{combine_pmaximal, Order};

fn prime_low_bits(p: &BigInt) -> u64 {
    p.iter_u64_digits().next().unwrap_or(0)
}

/// The p-saturation of an order: the smallest overorder that is maximal
/// at `p`.
///
/// Orders with `p² ∤ disc` are already p-maximal and returned unchanged.
/// Above the dimension the radical idealizer iteration applies; at or
/// below it the Frobenius shortcut is unavailable and the maximal-ideal
/// enumeration runs directly.
pub fn pmaximal_overorder(order: &Order, p: &BigInt) -> Result<Order, OrdoError> {
    if valuation(order.discriminant()?, p) < 2 {
        return Ok(order.clone());
    }
    let n = order.algebra().dim();
    if *p > BigInt::from(n as u64) {
        let current = radical_saturation(order.clone(), p)?;
        if valuation(current.discriminant()?, p) < 2 {
            return Ok(current);
        }
        maximal_ideal_saturation(current, p)
    } else {
        maximal_ideal_saturation(order.clone(), p)
    }
}

/// Iterates `O ← idealizer of rad_p(O)` until the lattice stops moving.
fn radical_saturation(mut current: Order, p: &BigInt) -> Result<Order, OrdoError> {
    loop {
        let table = current.integral_table()?;
        let radical_rows = table.radical_mod_p(p)?;
        let ideal = Ideal::from_modp_rows(&current, &radical_rows, p, Side::TwoSided)?;
        let bigger = ring_of_multipliers(&ideal, Action::Right)?;
        if bigger == current {
            return Ok(current);
        }
        current = bigger;
        if valuation(current.discriminant()?, p) < 2 {
            return Ok(current);
        }
    }
}

/// Enumerates maximal two-sided ideals over `p·O` and adopts the first
/// idealizer (either side) that enlarges the order; restarts after every
/// adoption. A full pass with no adoption means the order is p-maximal.
fn maximal_ideal_saturation(mut current: Order, p: &BigInt) -> Result<Order, OrdoError> {
    'pass: loop {
        if valuation(current.discriminant()?, p) < 2 {
            return Ok(current);
        }
        let table = current.integral_table()?;
        let seed = derive_substream_seed(current.algebra().fingerprint(), prime_low_bits(p));
        let mut rng = RngHandle::from_seed(seed);
        let ideals = table.maximal_ideals_mod_p(p, &mut rng)?;
        for (rows, action) in ideals
            .iter()
            .cartesian_product([Action::Left, Action::Right])
        {
            let ideal = Ideal::from_modp_rows(&current, rows, p, Side::TwoSided)?;
            let ring = ring_of_multipliers(&ideal, action)?;
            if ring != current {
                current = ring;
                continue 'pass;
            }
        }
        return Ok(current);
    }
}

/// Computes the maximal order containing `order`, without consulting a
/// cache. The result carries a confirmed maximality cell.
pub fn maximal_order_uncached(order: &Order) -> Result<Order, OrdoError> {
    let disc = order.discriminant()?.clone();
    if disc.is_zero() {
        return Err(OrdoError::Precondition(ErrorInfo::new(
            "degenerate-trace-form",
            "maximal orders exist only in separable algebras",
        )));
    }
    let mut result = order.clone();
    for (p, e) in factor(&disc.abs())? {
        if e < 2 {
            continue;
        }
        let saturated = pmaximal_overorder(order, &p)?;
        result = combine_pmaximal(&result, &saturated)?;
    }
    result.mark_maximality(true);
    Ok(result)
}

/// Caller-owned memo of maximal orders, keyed by the algebra fingerprint.
#[derive(Debug, Default)]
pub struct MaximalOrderCache {
    entries: BTreeMap<u64, Order>,
}

impl MaximalOrderCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized algebras.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached maximal-order computation.
///
/// A memoized order is reused only when it contains `order`; an entry
/// computed from an incomparable starting order in the same algebra is
/// recomputed and replaced.
pub fn maximal_order(order: &Order, cache: &mut MaximalOrderCache) -> Result<Order, OrdoError> {
    let key = order.algebra().fingerprint();
    if let Some(hit) = cache.entries.get(&key) {
        let mut usable = true;
        for elem in order.basis_elements()? {
            if !hit.contains(elem)? {
                usable = false;
                break;
            }
        }
        if usable {
            return Ok(hit.clone());
        }
    }
    let max = maximal_order_uncached(order)?;
    cache.entries.insert(key, max.clone());
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;
    use ordo_core::QMat;
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
    fn gaussian_suborder_saturates_at_two() {
        let alg = ordo_alg::quadratic_field(-1).unwrap();
        let order = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
        assert_eq!(order.discriminant().unwrap(), &BigInt::from(-16));
        let sat = pmaximal_overorder(&order, &BigInt::from(2)).unwrap();
        assert_eq!(sat, Order::equation_order(alg).unwrap());
        assert_eq!(sat.discriminant().unwrap(), &BigInt::from(-4));
    }

    #[test]
    fn radical_branch_runs_for_primes_above_the_dimension() {
        // Z + 5i Z has index 5 in Z[i]; 5 > dim = 2 exercises the
        // trace-kernel radical.
        let alg = ordo_alg::quadratic_field(-1).unwrap();
        let order = order_from_rows(&alg, &[&[1, 0], &[0, 5]]);
        assert_eq!(order.discriminant().unwrap(), &BigInt::from(-100));
        let sat = pmaximal_overorder(&order, &BigInt::from(5)).unwrap();
        assert_eq!(sat, Order::equation_order(alg).unwrap());
    }

    #[test]
    fn squarefree_discriminant_is_a_fixed_point() {
        let alg = ordo_alg::quadratic_field(-1).unwrap();
        let maximal = Order::equation_order(alg).unwrap();
        let sat = pmaximal_overorder(&maximal, &BigInt::from(2)).unwrap();
        assert_eq!(sat, maximal);
    }

    #[test]
    fn zero_discriminant_is_rejected() {
        // Q[x]/(x²) is not separable.
        let table = vec![
            vec![vec![rat(1), rat(0)], vec![rat(0), rat(1)]],
            vec![vec![rat(0), rat(1)], vec![rat(0), rat(0)]],
        ];
        let alg = ordo_alg::Algebra::new(table, vec![rat(1), rat(0)]).unwrap();
        let order = Order::equation_order(alg).unwrap();
        let err = maximal_order_uncached(&order).unwrap_err();
        assert_eq!(err.info().code, "degenerate-trace-form");
    }
}
