//! Lexicographic ranking of unordered k-subsets of `{0..n-1}`.
//!
//! Every worker must agree bit-exactly on how a combination of action
//! positions maps to an array index, because the exchanged statistics are
//! addressed by these ranks alone.

/// Exact integer binomial coefficient. Zero when `k > n`.
pub fn choose(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 1..=k {
        // exact at every step: result is always a binomial coefficient
        result = result * (n - k + i) / i;
    }
    result
}

/// Rank of a sorted k-combination among all k-subsets of `{0..n-1}` listed in
/// lexicographic order over ascending tuples.
pub fn rank(combo: &[usize], n: usize) -> usize {
    let k = combo.len();
    assert!(k <= n, "combination larger than the ground set");

    let mut result = 0;
    let mut previous: Option<usize> = None;
    for (position, &element) in combo.iter().enumerate() {
        assert!(element < n, "combination element out of range");
        if let Some(previous) = previous {
            assert!(element > previous, "combination must be strictly ascending");
        }

        let start = previous.map_or(0, |p| p + 1);
        for skipped in start..element {
            result += choose(n - 1 - skipped, k - 1 - position);
        }
        previous = Some(element);
    }
    result
}

/// Inverse of `rank`: the `index`-th k-combination in lexicographic order.
pub fn unrank(mut index: usize, n: usize, k: usize) -> Vec<usize> {
    assert!(
        index < choose(n, k),
        "rank {index} out of range for C({n},{k})"
    );

    let mut combo = Vec::with_capacity(k);
    let mut element = 0;
    for position in 0..k {
        loop {
            let block = choose(n - 1 - element, k - 1 - position);
            if index < block {
                combo.push(element);
                element += 1;
                break;
            }
            index -= block;
            element += 1;
        }
    }
    combo
}

/// Rank of the unordered pair `{a, b}`; arguments may come in either order.
pub fn rank2(a: usize, b: usize, n: usize) -> usize {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    rank(&[lo, hi], n)
}

/// Rank of the unordered triple `{a, b, c}`; arguments may come in any order.
pub fn rank3(a: usize, b: usize, c: usize, n: usize) -> usize {
    let mut combo = [a, b, c];
    combo.sort_unstable();
    rank(&combo, n)
}

/// All k-combinations of `{0..n-1}` in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    (0..choose(n, k)).map(|index| unrank(index, n, k)).collect()
}
