//! End-to-end saturation against quadratic fields with known maximal
//! orders.

use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;

use ordo_alg::{quadratic_field, Algebra};
use ordo_core::QMat;
use ordo_max::{maximal_order, MaximalOrderCache, Order};

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn order_from_rows(alg: &Arc<Algebra>, rows: &[&[i64]]) -> Order {
    let m = QMat::from_rational_rows(
        rows.iter()
            .map(|r| r.iter().map(|&v| rat(v)).collect())
            .collect(),
    )
    .unwrap();
    Order::from_basis_matrix(alg.clone(), m).unwrap()
}

#[test]
fn q_sqrt_two_reaches_discriminant_eight() {
    let alg = quadratic_field(2).unwrap();
    let start = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
    assert_eq!(start.discriminant().unwrap(), &BigInt::from(32));
    let mut cache = MaximalOrderCache::new();
    let max = maximal_order(&start, &mut cache).unwrap();
    assert_eq!(max.discriminant().unwrap(), &BigInt::from(8));
    assert_eq!(max, Order::equation_order(alg).unwrap());
    assert_eq!(max.maximality(), Some(true));
}

#[test]
fn gaussian_field_reaches_discriminant_minus_four() {
    let alg = quadratic_field(-1).unwrap();
    let start = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
    let mut cache = MaximalOrderCache::new();
    let max = maximal_order(&start, &mut cache).unwrap();
    assert_eq!(max.discriminant().unwrap(), &BigInt::from(-4));
    assert_eq!(max, Order::equation_order(alg).unwrap());
}

#[test]
fn eisenstein_like_field_reaches_discriminant_minus_three() {
    // Z[sqrt(-3)] is index 2 in Z[(1 + sqrt(-3))/2].
    let alg = quadratic_field(-3).unwrap();
    let start = Order::equation_order(alg.clone()).unwrap();
    assert_eq!(start.discriminant().unwrap(), &BigInt::from(-12));
    let mut cache = MaximalOrderCache::new();
    let max = maximal_order(&start, &mut cache).unwrap();
    assert_eq!(max.discriminant().unwrap(), &BigInt::from(-3));
    assert_eq!(start.index_in(&max).unwrap(), BigInt::from(2));
    // The half-integer basis vector (1 + sqrt(-3))/2 is in the result.
    let omega = ordo_alg::AlgebraElement::new(
        alg,
        vec![
            BigRational::new(BigInt::from(1), BigInt::from(2)),
            BigRational::new(BigInt::from(1), BigInt::from(2)),
        ],
    )
    .unwrap();
    assert!(max.contains(&omega).unwrap());
}

#[test]
fn discriminant_scales_by_index_squared() {
    for (d, rows, expected_index) in [
        (2i64, [[1i64, 0i64], [0, 2]], 2i64),
        (-1, [[1, 0], [0, 3]], 3),
        (-3, [[1, 0], [0, 1]], 2),
    ] {
        let alg = quadratic_field(d).unwrap();
        let start = order_from_rows(&alg, &[&rows[0], &rows[1]]);
        let mut cache = MaximalOrderCache::new();
        let max = maximal_order(&start, &mut cache).unwrap();
        let index = start.index_in(&max).unwrap();
        assert_eq!(index, BigInt::from(expected_index));
        assert_eq!(
            start.discriminant().unwrap(),
            &(&index * &index * max.discriminant().unwrap())
        );
    }
}
