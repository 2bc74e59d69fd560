use crate::sync::combinatorics::rank3;
use crate::sync::encode::{combine_zeros, decode_runs, flatten, level1_len, level2_len};
use crate::testgame::ClaimGame;
use crate::tree::ids::ActionId;
use crate::tree::search_tree::{Expansion, Tree};

#[test]
fn zero_runs_collapse_and_expand() {
    let raw = [0, 0, 3, 0, -2, 0, 4];
    let encoded = combine_zeros(&raw);
    assert_eq!(encoded, vec![-2, 3, -4, 4]);
    assert_eq!(decode_runs(&encoded, 8), vec![0, 0, 3, 0, 0, 0, 0, 4]);
}

#[test]
fn trailing_zeros_fold_into_one_run() {
    assert_eq!(combine_zeros(&[1, 0, 0, 0]), vec![1, -3]);
    assert_eq!(decode_runs(&[1, -3], 4), vec![1, 0, 0, 0]);
}

#[test]
fn decode_ignores_padding_past_logical_length() {
    assert_eq!(decode_runs(&[2, -2, 5, 0, 0, 0], 4), vec![2, 0, 0, 5]);
}

#[test]
fn decode_pads_short_input_with_zeros() {
    assert_eq!(decode_runs(&[7], 3), vec![7, 0, 0]);
}

#[test]
fn flatten_reports_counts_and_absent_branches() {
    let game = ClaimGame::new(4, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    let child = tree
        .child_for_action(root, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    tree.add_value(root, ActionId::from(0), 1.0, 1.4).expect("link exists");
    tree.add_value(root, ActionId::from(1), 0.0, 1.4).expect("link exists");
    tree.add_value(child, ActionId::from(2), 1.0, 1.4).expect("link exists");

    let report = flatten(&tree, root, &game).expect("flatten");
    assert_eq!(report.level0, vec![1, 1, 0, 0]);

    // child 0 contributes its three counts, the three absent children one
    // sentinel block each
    assert_eq!(report.level1, vec![-1, 1, -10]);
    assert_eq!(
        decode_runs(&report.level1, level1_len(4)),
        vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    // no grandchildren anywhere: the whole level collapses to one run
    assert_eq!(report.level2, vec![-24]);
    assert_eq!(decode_runs(&report.level2, level2_len(4)), vec![0; 24]);

    assert_eq!(report.reward3, vec![0.0; 4]);
    assert_eq!(report.visits3, vec![0; 4]);
}

#[test]
fn flatten_reads_combination_totals() {
    let game = ClaimGame::new(4, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    let a = tree
        .child_for_action(root, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    let ab = tree
        .child_for_action(a, ActionId::from(1), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    let abc = tree
        .child_for_action(ab, ActionId::from(2), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    tree.add_value(abc, ActionId::from(3), 1.0, 1.4).expect("link exists");

    let report = flatten(&tree, root, &game).expect("flatten");
    let r = rank3(0, 1, 2, 4);
    assert_eq!(report.visits3[r], 2);
    assert!((report.reward3[r] - 1.0).abs() < 1e-12);
}
