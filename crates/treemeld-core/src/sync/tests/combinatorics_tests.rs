use proptest::prelude::*;

use crate::sync::combinatorics::{choose, combinations, rank, rank2, rank3, unrank};

#[test]
fn binomials_match_known_values() {
    assert_eq!(choose(5, 3), 10);
    assert_eq!(choose(6, 2), 15);
    assert_eq!(choose(4, 0), 1);
    assert_eq!(choose(3, 3), 1);
    assert_eq!(choose(3, 5), 0);
}

#[test]
fn triple_ranks_follow_lexicographic_order() {
    assert_eq!(rank(&[0, 1, 2], 5), 0);
    assert_eq!(rank(&[1, 3, 4], 5), 8);
    assert_eq!(rank(&[2, 3, 4], 5), 9);
    // argument order never matters
    assert_eq!(rank3(4, 3, 1, 5), 8);
}

#[test]
fn pair_ranks_are_order_free() {
    assert_eq!(rank2(0, 2, 4), 1);
    assert_eq!(rank2(2, 0, 4), 1);
    assert_eq!(rank2(3, 2, 4), 5);
}

#[test]
fn combinations_enumerate_in_rank_order() {
    for (index, combo) in combinations(6, 3).iter().enumerate() {
        assert_eq!(rank(combo, 6), index);
    }
    assert_eq!(combinations(6, 3).len(), choose(6, 3));
}

proptest! {
    #[test]
    fn unrank_inverts_rank(n in 3usize..12, index_seed in any::<usize>()) {
        let total = choose(n, 3);
        let index = index_seed % total;
        let combo = unrank(index, n, 3);
        prop_assert_eq!(combo.len(), 3);
        prop_assert!(combo.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(combo.iter().all(|&element| element < n));
        prop_assert_eq!(rank(&combo, n), index);
    }
}
