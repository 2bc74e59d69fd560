use crate::sync::reduce::{mean_counts, mean_encoded, mean_rewards, reduce_reports};

#[test]
fn position_wise_mean_of_counts() {
    // a single visit across two workers does not survive; 3 across two does,
    // keeping its fraction
    let rows = vec![vec![3, 0, 1, 2], vec![1, 4, 0, 1]];
    assert_eq!(mean_counts(&rows), vec![2.0, 2.0, 0.0, 1.5]);
}

#[test]
fn minority_counts_collapse_to_zero() {
    let rows = vec![vec![1, 3], vec![0, 3], vec![1, 3]];
    assert_eq!(mean_counts(&rows), vec![0.0, 3.0]);
}

#[test]
fn mean_is_order_free() {
    let a = vec![vec![3, 0, 1, 2], vec![1, 4, 0, 1]];
    let b = vec![vec![1, 4, 0, 1], vec![3, 0, 1, 2]];
    assert_eq!(mean_counts(&a), mean_counts(&b));
}

#[test]
fn encoded_rows_expand_before_averaging() {
    // one worker never visited the branch, the other has counts; the pad
    // zeros past the run are ignored
    let rows = vec![vec![-3, 0, 0], vec![5, 1, 2]];
    assert_eq!(mean_encoded(&rows, 3), vec![2.5, 0.0, 1.0]);
}

#[test]
fn reward_rows_average_position_wise() {
    let rows = vec![vec![1.5, -1.0], vec![0.5, 0.0]];
    assert_eq!(mean_rewards(&rows), vec![1.0, -0.5]);
}

#[test]
fn reduce_reports_covers_all_levels() {
    // round-root with three actions: level 1 and 2 both expand to six slots
    let combined = reduce_reports(
        3,
        &[vec![2, 1, 0], vec![0, 1, 2]],
        &[vec![2, 1, -4], vec![2, 0, 0]],
        &[vec![-6], vec![-6]],
        &[vec![1.5], vec![0.5]],
        &[vec![3], vec![1]],
    );

    assert_eq!(combined.level0, vec![1.0, 1.0, 1.0]);
    assert_eq!(combined.level1, vec![2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(combined.level2, vec![0.0; 6]);
    assert_eq!(combined.reward3, vec![1.0]);
    assert_eq!(combined.visits3, vec![2.0]);
}

#[test]
fn empty_worker_set_reduces_to_nothing() {
    let combined = reduce_reports(3, &[], &[], &[], &[], &[]);
    assert!(combined.level0.is_empty());
    assert!(combined.reward3.is_empty());
}
