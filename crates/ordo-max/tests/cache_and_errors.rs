//! Cache reuse and the error surface of the public API.

use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;

use ordo_alg::{quadratic_field, Algebra, AlgebraElement};
use ordo_core::{OrdoError, QMat};
use ordo_max::{maximal_order, schur_index_at_p, MaximalOrderCache, Order};

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
fn cache_is_reused_across_suborders_of_one_algebra() {
    let alg = quadratic_field(-1).unwrap();
    let mut cache = MaximalOrderCache::new();

    let first = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
    let max_a = maximal_order(&first, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);

    // A different suborder of the same algebra hits the memoized entry.
    let second = order_from_rows(&alg, &[&[1, 0], &[0, 5]]);
    let max_b = maximal_order(&second, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(max_a, max_b);
}

#[test]
fn cache_keys_distinguish_algebras() {
    let mut cache = MaximalOrderCache::new();
    let gauss = quadratic_field(-1).unwrap();
    let real = quadratic_field(2).unwrap();
    let a = order_from_rows(&gauss, &[&[1, 0], &[0, 2]]);
    let b = order_from_rows(&real, &[&[1, 0], &[0, 2]]);
    maximal_order(&a, &mut cache).unwrap();
    maximal_order(&b, &mut cache).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn cached_result_carries_the_maximality_cell() {
    let alg = quadratic_field(-1).unwrap();
    let mut cache = MaximalOrderCache::new();
    let start = order_from_rows(&alg, &[&[1, 0], &[0, 2]]);
    let max = maximal_order(&start, &mut cache).unwrap();
    assert_eq!(max.maximality(), Some(true));
    // Usable directly by the local Schur-index entry point in a central
    // simple setting; here the dimension check fires first.
    let err = schur_index_at_p(&max, &BigInt::from(2)).unwrap_err();
    assert_eq!(err.info().code, "dimension-not-square");
}

#[test]
fn errors_serialize_with_a_family_tag() {
    let alg = quadratic_field(-1).unwrap();
    let half = AlgebraElement::new(
        alg.clone(),
        vec![BigRational::new(BigInt::from(1), BigInt::from(2)), rat(0)],
    )
    .unwrap();
    let err = Order::from_generators(alg, &[half], true).unwrap_err();
    assert!(matches!(err, OrdoError::Generators(_)));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Generators");
    assert_eq!(json["detail"]["code"], "generators-not-closed");
}

#[test]
fn mismatched_algebras_are_a_precondition_error() {
    let gauss = quadratic_field(-1).unwrap();
    let real = quadratic_field(2).unwrap();
    let a = Order::equation_order(gauss).unwrap();
    let x = AlgebraElement::new(real, vec![rat(1), rat(0)]).unwrap();
    let err = a.contains(&x).unwrap_err();
    assert!(matches!(err, OrdoError::Precondition(_)));
    assert_eq!(err.info().code, "algebra-mismatch");
}
