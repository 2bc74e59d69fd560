use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::testgame::ClaimGame;
use crate::tree::error::TreeError;
use crate::tree::ids::ActionId;
use crate::tree::search_tree::{Expansion, Tree};

#[test]
fn greedy_selection_prefers_higher_mean() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    for _ in 0..5 {
        tree.add_value(root, ActionId::from(0), 1.0, 1.4).expect("link exists");
        tree.add_value(root, ActionId::from(1), -1.0, 1.4).expect("link exists");
        tree.add_value(root, ActionId::from(2), 0.0, 1.4).expect("link exists");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let action = tree.node(root).expect("root").select_action(0.0, &mut rng);
    assert_eq!(action, Some(ActionId::from(0)));
}

#[test]
fn exact_ties_break_randomly_over_all_maxima() {
    let game = ClaimGame::new(4, 0);
    let tree = Tree::for_game(&game, 1);
    let node = tree.node(tree.root_id()).expect("root");

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut seen = HashSet::new();
    for _ in 0..64 {
        seen.insert(node.select_action(1.4, &mut rng).expect("nonempty"));
    }

    assert_eq!(seen.len(), 4);
}

#[test]
fn unvisited_sibling_wins_after_backups() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    tree.add_value(root, ActionId::from(0), 1.0, 1.4).expect("link exists");
    tree.add_value(root, ActionId::from(1), 1.0, 1.4).expect("link exists");

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let picked = tree.node(root).expect("root").select_action(1.4, &mut rng);
    assert_eq!(picked, Some(ActionId::from(2)));
}

#[test]
fn backups_accumulate_on_the_chosen_link() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();
    let action = ActionId::from(1);

    tree.add_value(root, action, 1.0, 1.4).expect("link exists");
    tree.add_value(root, action, -1.0, 1.4).expect("link exists");

    let node = tree.node(root).expect("root");
    let link = node.link(action).expect("link exists");
    assert_eq!(link.times_chosen(), 2);
    assert!(link.reward_sum().abs() < 1e-12);
    assert_eq!(node.visit_count(), 3);

    assert!(matches!(
        tree.add_value(root, ActionId::from(9), 1.0, 1.4),
        Err(TreeError::MissingLink { .. })
    ));
}

#[test]
fn current_path_follows_greedy_children() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    let child = tree
        .child_for_action(root, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    for _ in 0..4 {
        tree.add_value(root, ActionId::from(0), 1.0, 1.4).expect("link exists");
    }
    tree.add_value(root, ActionId::from(1), -1.0, 1.4).expect("link exists");
    tree.add_value(root, ActionId::from(2), -1.0, 1.4).expect("link exists");

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let path = tree.current_path(&mut rng);
    assert_eq!(path, vec![root, child]);
}
