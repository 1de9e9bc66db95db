use num_bigint::BigInt;
use num_traits::Signed;
use ordo_core::ZMat;
use proptest::prelude::*;

fn mat_from(entries: &[i64], rows: usize, cols: usize) -> ZMat {
    ZMat::from_rows(
        (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| BigInt::from(entries[i * cols + j]))
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn hnf_is_idempotent(entries in proptest::collection::vec(-30i64..30, 9)) {
        let m = mat_from(&entries, 3, 3);
        let h = m.hnf_upper();
        prop_assert_eq!(h.hnf_upper(), h);
    }

    #[test]
    fn hnf_is_invariant_under_row_operations(
        entries in proptest::collection::vec(-20i64..20, 9),
        factor in -3i64..4,
    ) {
        // Adding a multiple of one row to another does not change the row
        // lattice, so the canonical form must be identical.
        let m = mat_from(&entries, 3, 3);
        let mut shuffled = m.clone();
        shuffled.swap_rows(0, 2);
        shuffled.row_submul(1, 0, &BigInt::from(factor));
        prop_assert_eq!(m.hnf_upper(), shuffled.hnf_upper());
    }

    #[test]
    fn hnf_preserves_absolute_determinant(entries in proptest::collection::vec(-15i64..15, 9)) {
        let m = mat_from(&entries, 3, 3);
        let h = m.hnf_upper();
        prop_assert_eq!(m.det().unwrap().abs(), h.det().unwrap().abs());
    }
}
