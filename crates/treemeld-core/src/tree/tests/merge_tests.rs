use crate::game::Game;
use crate::testgame::ClaimGame;
use crate::tree::error::TreeError;
use crate::tree::ids::{ActionId, StateKey};
use crate::tree::search_tree::{Expansion, Tree};

#[test]
fn merge_sums_statistics_on_shared_nodes() {
    let game = ClaimGame::new(3, 0);
    let mut ours = Tree::for_game(&game, 1);
    let mut theirs = Tree::for_game(&game, 1);

    for _ in 0..3 {
        ours.add_value(ours.root_id(), ActionId::from(0), 1.0, 1.4)
            .expect("link exists");
    }
    for _ in 0..2 {
        theirs
            .add_value(theirs.root_id(), ActionId::from(0), 1.0, 1.4)
            .expect("link exists");
    }
    theirs
        .add_value(theirs.root_id(), ActionId::from(1), -1.0, 1.4)
        .expect("link exists");

    ours.merge(&theirs).expect("roots match");

    let root = ours.node(ours.root_id()).expect("root");
    assert_eq!(root.visit_count(), 8);
    assert_eq!(root.link(ActionId::from(0)).expect("link").times_chosen(), 5);
    assert_eq!(root.link(ActionId::from(1)).expect("link").times_chosen(), 1);
    assert_eq!(root.link(ActionId::from(2)).expect("link").times_chosen(), 0);
}

#[test]
fn merge_imports_unseen_subtrees() {
    let game = ClaimGame::new(3, 0);
    let mut ours = Tree::for_game(&game, 1);
    let mut theirs = Tree::for_game(&game, 1);

    let their_child = theirs
        .child_for_action(theirs.root_id(), ActionId::from(2), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    theirs
        .add_value(their_child, ActionId::from(0), 1.0, 1.4)
        .expect("link exists");

    ours.merge(&theirs).expect("roots match");

    let key = game.canonical_key(&game.apply(&0u32, ActionId::from(2)));
    let imported = ours.find_node(key).expect("subtree imported");

    let our_root = ours.node(ours.root_id()).expect("root");
    assert_eq!(
        our_root.link(ActionId::from(2)).expect("link").child(),
        Some(imported)
    );

    let node = ours.node(imported).expect("resident");
    assert_eq!(node.visit_count(), 2);
    assert_eq!(node.link(ActionId::from(0)).expect("link").times_chosen(), 1);
    assert_eq!(ours.population(), 2);
}

#[test]
fn merge_rejects_different_roots() {
    let mut ours: Tree<u32> = Tree::with_root(0, StateKey::from(0u64), vec![], 1);
    let theirs: Tree<u32> = Tree::with_root(1, StateKey::from(9u64), vec![], 1);

    assert!(matches!(
        ours.merge(&theirs),
        Err(TreeError::RootMismatch { .. })
    ));
}
