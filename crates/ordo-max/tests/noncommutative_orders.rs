//! Saturation in matrix and quaternion algebras.

use num_bigint::BigInt;
use num_rational::BigRational;

use ordo_alg::{matrix_algebra, quaternion_algebra, AlgebraElement};
use ordo_core::{QMat, ZMat};
use ordo_max::{
    maximal_order_uncached, schur_index_at_p, schur_index_at_real_place, Order,
};

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

#[test]
fn hereditary_start_in_m2_reaches_the_matrix_ring() {
    let alg = matrix_algebra(2).unwrap();
    // Span of {1, E11, E12, 2 E21}: a non-maximal order of index 2.
    let basis = QMat::from_rational_rows(vec![
        vec![rat(1), rat(0), rat(0), rat(1)],
        vec![rat(1), rat(0), rat(0), rat(0)],
        vec![rat(0), rat(1), rat(0), rat(0)],
        vec![rat(0), rat(0), rat(2), rat(0)],
    ])
    .unwrap();
    let start = Order::from_basis_matrix(alg.clone(), basis).unwrap();
    assert_eq!(start.discriminant().unwrap(), &BigInt::from(-4));

    let max = maximal_order_uncached(&start).unwrap();
    assert_eq!(max.discriminant().unwrap(), &BigInt::from(-1));
    // M_2(Z) in canonical form is the standard lattice.
    assert_eq!(max.basis_matrix(), &QMat::from_zmat(ZMat::identity(4)));
    // E21 itself was adjoined along the way.
    let e21 = AlgebraElement::new(alg, vec![rat(0), rat(0), rat(1), rat(0)]).unwrap();
    assert!(max.contains(&e21).unwrap());
    assert!(!start.contains(&e21).unwrap());

    assert_eq!(schur_index_at_real_place(&max).unwrap(), 1);
    assert_eq!(schur_index_at_p(&max, &BigInt::from(2)).unwrap(), 1);
}

#[test]
fn lipschitz_order_saturates_to_hurwitz() {
    let alg = quaternion_algebra(-1, -1).unwrap();
    let lipschitz = Order::equation_order(alg.clone()).unwrap();
    assert_eq!(lipschitz.discriminant().unwrap(), &BigInt::from(-16));

    let hurwitz = maximal_order_uncached(&lipschitz).unwrap();
    assert_eq!(hurwitz.discriminant().unwrap(), &BigInt::from(-4));
    assert_eq!(lipschitz.index_in(&hurwitz).unwrap(), BigInt::from(2));
    // (1 + i + j + k)/2 generates the enlargement.
    let omega = AlgebraElement::new(
        alg,
        (0..4)
            .map(|_| BigRational::new(BigInt::from(1), BigInt::from(2)))
            .collect(),
    )
    .unwrap();
    assert!(hurwitz.contains(&omega).unwrap());
    assert!(!lipschitz.contains(&omega).unwrap());
}

#[test]
fn hamilton_quaternions_have_index_two_at_two_and_infinity() {
    let alg = quaternion_algebra(-1, -1).unwrap();
    let lipschitz = Order::equation_order(alg).unwrap();
    let hurwitz = maximal_order_uncached(&lipschitz).unwrap();
    assert_eq!(schur_index_at_real_place(&hurwitz).unwrap(), 2);
    assert_eq!(schur_index_at_p(&hurwitz, &BigInt::from(2)).unwrap(), 2);
    assert_eq!(schur_index_at_p(&hurwitz, &BigInt::from(3)).unwrap(), 1);
    assert_eq!(schur_index_at_p(&hurwitz, &BigInt::from(5)).unwrap(), 1);
}

#[test]
fn split_quaternions_are_a_disguised_matrix_algebra() {
    // (1, 1 | Q) is isomorphic to M_2(Q); its equation order saturates to
    // discriminant -1 and splits at the real place.
    let alg = quaternion_algebra(1, 1).unwrap();
    let start = Order::equation_order(alg).unwrap();
    let max = maximal_order_uncached(&start).unwrap();
    assert_eq!(max.discriminant().unwrap(), &BigInt::from(-1));
    assert_eq!(schur_index_at_real_place(&max).unwrap(), 1);
    assert_eq!(schur_index_at_p(&max, &BigInt::from(2)).unwrap(), 1);
}
