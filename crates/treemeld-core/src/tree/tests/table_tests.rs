use crate::game::Game;
use crate::testgame::ClaimGame;
use crate::tree::error::TreeError;
use crate::tree::ids::{ActionId, NodeId};
use crate::tree::node::Node;
use crate::tree::search_tree::{Expansion, Tree};

#[test]
fn transposed_paths_share_one_node() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    let a = tree
        .child_for_action(root, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    let b = tree
        .child_for_action(root, ActionId::from(1), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    let ab = tree
        .child_for_action(a, ActionId::from(1), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    let ba = tree
        .child_for_action(b, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");

    assert_eq!(ab, ba);
    assert_eq!(tree.node(ab).expect("resident").parent_count(), 2);
    assert_eq!(tree.population(), 4);
    assert_eq!(tree.num_nodes(), 4);
}

#[test]
fn duplicate_insert_returns_resident_node() {
    let game = ClaimGame::new(2, 0);
    let mut tree = Tree::for_game(&game, 1);

    let state = 1u32;
    let key = game.canonical_key(&state);
    let actions = game.legal_actions(&state);

    let first = tree.add_node(Node::new(state, key, 1, actions.clone()));
    let before = tree.num_nodes();
    let second = tree.add_node(Node::new(state, key, 1, actions));

    assert_eq!(first, second);
    assert_eq!(tree.num_nodes(), before);
}

#[test]
fn standard_expansion_waits_for_visits() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 2);
    let root = tree.root_id();
    let action = ActionId::from(0);

    assert!(
        tree.child_for_action(root, action, Expansion::Standard, &game)
            .expect("tree ok")
            .is_none()
    );

    tree.add_value(root, action, 1.0, 1.4).expect("link exists");
    assert!(
        tree.child_for_action(root, action, Expansion::Standard, &game)
            .expect("tree ok")
            .is_none()
    );

    tree.add_value(root, action, 0.0, 1.4).expect("link exists");
    let child = tree
        .child_for_action(root, action, Expansion::Standard, &game)
        .expect("tree ok");
    assert!(child.is_some());

    // an existing child is returned even under the read-only policy
    assert_eq!(
        tree.child_for_action(root, action, Expansion::Never, &game)
            .expect("tree ok"),
        child
    );
}

#[test]
fn never_policy_does_not_expand() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 0);
    let root = tree.root_id();

    assert!(
        tree.child_for_action(root, ActionId::from(0), Expansion::Never, &game)
            .expect("tree ok")
            .is_none()
    );
    assert_eq!(tree.population(), 1);
}

#[test]
fn missing_node_is_reported() {
    let game = ClaimGame::new(2, 0);
    let tree: Tree<u32> = Tree::for_game(&game, 1);

    let bogus = NodeId::from(99usize);
    assert!(matches!(
        tree.node(bogus),
        Err(TreeError::MissingNode { .. })
    ));
}

#[test]
fn depth_statistics_track_insertions() {
    let game = ClaimGame::new(3, 0);
    let mut tree = Tree::for_game(&game, 1);
    let root = tree.root_id();

    let a = tree
        .child_for_action(root, ActionId::from(0), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");
    tree.child_for_action(a, ActionId::from(2), Expansion::Always, &game)
        .expect("tree ok")
        .expect("child created");

    assert_eq!(tree.maximum_depth(), 2);
    assert_eq!(tree.total_depth(), 3);
    assert_eq!(tree.leaves(), 1);
}
