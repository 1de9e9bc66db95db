//! Modular-structure checks against the Gaussian integers, whose prime
//! behavior (ramified, inert, split) is known in closed form.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

use ordo_alg::OrderTable;
use ordo_core::RngHandle;

fn bi(v: i64) -> BigInt {
    BigInt::from(v)
}

/// Multiplication table of Z[i] in the basis `{1, i}`.
fn gaussian_table() -> OrderTable {
    let table = vec![
        vec![vec![bi(1), bi(0)], vec![bi(0), bi(1)]],
        vec![vec![bi(0), bi(1)], vec![bi(-1), bi(0)]],
    ];
    OrderTable::new(table, vec![bi(1), bi(0)]).unwrap()
}

#[test]
fn ramified_prime_has_radical_generated_by_one_plus_i() {
    let table = gaussian_table();
    let radical = table.radical_mod_p(&bi(2)).unwrap();
    assert_eq!(radical, vec![vec![bi(1), bi(1)]]);

    let mut rng = RngHandle::from_seed(11);
    let ideals = table.maximal_ideals_mod_p(&bi(2), &mut rng).unwrap();
    assert_eq!(ideals.len(), 1);
    assert_eq!(ideals[0], vec![vec![bi(1), bi(1)]]);
}

#[test]
fn inert_prime_gives_trivial_radical_and_the_zero_ideal() {
    let table = gaussian_table();
    assert!(table.radical_mod_p(&bi(3)).unwrap().is_empty());

    // O/3O is the field F_9; its unique maximal ideal is 3O itself,
    // reported as an empty row basis.
    let mut rng = RngHandle::from_seed(11);
    let ideals = table.maximal_ideals_mod_p(&bi(3), &mut rng).unwrap();
    assert_eq!(ideals.len(), 1);
    assert!(ideals[0].is_empty());
}

#[test]
fn split_prime_yields_two_conjugate_ideals() {
    let table = gaussian_table();
    let p = bi(5);
    assert!(table.radical_mod_p(&p).unwrap().is_empty());

    let mut rng = RngHandle::from_seed(11);
    let ideals = table.maximal_ideals_mod_p(&p, &mut rng).unwrap();
    assert_eq!(ideals.len(), 2);
    for ideal in &ideals {
        assert_eq!(ideal.len(), 1);
        let x = &ideal[0];
        // a + bi lies over 5 exactly when a^2 + b^2 = 0 mod 5.
        let norm = (&x[0] * &x[0] + &x[1] * &x[1]).mod_floor(&p);
        assert!(norm.is_zero());
    }
    assert_ne!(ideals[0], ideals[1]);
}

#[test]
fn ideal_enumeration_is_deterministic_per_seed() {
    let table = gaussian_table();
    let p = bi(5);
    let mut rng_a = RngHandle::from_seed(42);
    let mut rng_b = RngHandle::from_seed(42);
    let a = table.maximal_ideals_mod_p(&p, &mut rng_a).unwrap();
    let b = table.maximal_ideals_mod_p(&p, &mut rng_b).unwrap();
    assert_eq!(a, b);
}
