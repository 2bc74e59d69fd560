use std::collections::HashMap;

use rand::Rng;

use crate::game::Game;
use crate::tree::{
    arena::Arena,
    error::TreeError,
    ids::{ActionId, NodeId, StateKey},
    node::Node,
};

/// Controls when following a link without a child creates the child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Create the child immediately.
    Always,
    /// Create the child once the link has been chosen enough times.
    Standard,
    /// Never create a child; read-only policy playback.
    Never,
}

/// A Monte Carlo search tree backed by a transposition table.
///
/// The table maps canonical state keys to arena nodes, so equivalent states
/// reached along different move orders share a single node and the logical
/// tree is really a DAG. Depth strictly increases along every link, so the
/// DAG has no cycles and branch deletion can recurse safely.
#[derive(Debug, Clone)]
pub struct Tree<S> {
    arena: Arena<Node<S>>,
    table: HashMap<StateKey, NodeId>,
    root: NodeId,
    num_nodes: u64,
    deleted_nodes: u64,
    leaves: u64,
    total_depth: u64,
    maximum_depth: u64,
    expansion_threshold: u64,
}

impl<S: Clone + Eq + std::fmt::Debug> Tree<S> {
    /// Create a tree with an explicit root state.
    pub fn with_root(
        state: S,
        key: StateKey,
        actions: Vec<ActionId>,
        expansion_threshold: u64,
    ) -> Self {
        let root_node = Node::new(state, key, 0, actions);
        let mut arena = Arena::new();
        let mut table = HashMap::new();

        let root = arena.insert(root_node);
        table.insert(key, root);

        Tree {
            arena,
            table,
            root,
            num_nodes: 1,
            deleted_nodes: 0,
            leaves: 1,
            total_depth: 0,
            maximum_depth: 0,
            expansion_threshold,
        }
    }

    /// Create a tree rooted at a game's initial state.
    pub fn for_game<G: Game<State = S>>(game: &G, expansion_threshold: u64) -> Self {
        let state = game.initial_state();
        let key = game.canonical_key(&state);
        let actions = game.legal_actions(&state);
        Self::with_root(state, key, actions, expansion_threshold)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Nodes currently resident in the transposition table.
    pub fn population(&self) -> usize {
        self.table.len()
    }

    /// Total nodes ever inserted; never decremented, so
    /// `num_nodes == deleted_nodes + population` always holds.
    pub fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    pub fn deleted_nodes(&self) -> u64 {
        self.deleted_nodes
    }

    pub fn leaves(&self) -> u64 {
        self.leaves
    }

    pub fn total_depth(&self) -> u64 {
        self.total_depth
    }

    /// Deepest node ever inserted. A high-water mark: deletions do not lower
    /// it until `recount` rescans the resident nodes.
    pub fn maximum_depth(&self) -> u64 {
        self.maximum_depth
    }

    /// Return an immutable node handle.
    pub fn node(&self, node_id: NodeId) -> Result<&Node<S>, TreeError> {
        self.arena
            .get(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Return a mutable node handle.
    pub fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node<S>, TreeError> {
        self.arena
            .get_mut(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Look a node up by canonical key.
    pub fn find_node(&self, key: StateKey) -> Option<NodeId> {
        self.table.get(&key).copied()
    }

    /// Insert a node unless an equivalent one already exists, returning the
    /// resident node's id either way. A duplicate insert merges ownership
    /// only; the caller must not double-count statistics.
    pub fn add_node(&mut self, node: Node<S>) -> NodeId {
        if let Some(existing) = self.table.get(&node.key()) {
            return *existing;
        }

        let key = node.key();
        let depth = node.depth();
        let id = self.arena.insert(node);
        self.table.insert(key, id);

        self.num_nodes += 1;
        self.leaves += 1;
        self.total_depth += depth;
        if depth > self.maximum_depth {
            self.maximum_depth = depth;
        }

        id
    }

    /// Point `action` on `parent` at `child`, bumping the child's parent
    /// count and fixing leaf bookkeeping. Re-linking the same child is a
    /// no-op; pointing at a different child is an error.
    pub fn link_child(
        &mut self,
        parent: NodeId,
        action: ActionId,
        child: NodeId,
    ) -> Result<(), TreeError> {
        let parent_node = self.node(parent)?;
        let link = parent_node.link(action).ok_or(TreeError::MissingLink {
            node_id: parent,
            action,
        })?;

        match link.child() {
            Some(existing) if existing == child => return Ok(()),
            Some(_) => {
                return Err(TreeError::ChildConflict {
                    node_id: parent,
                    action,
                });
            }
            None => {}
        }

        let parent_node = self.node_mut(parent)?;
        let was_leaf = parent_node.is_leaf();
        parent_node
            .link_mut(action)
            .ok_or(TreeError::MissingLink {
                node_id: parent,
                action,
            })?
            .set_child(child);
        if was_leaf {
            parent_node.set_is_leaf(false);
            self.leaves = self.leaves.saturating_sub(1);
        }

        self.node_mut(child)?.inc_parent_count();
        Ok(())
    }

    /// Detach the child behind `action`, decrementing its parent count. The
    /// parent stays resident and becomes a leaf again if this was its last
    /// child. Returns the detached child, if there was one.
    pub fn unlink_child(
        &mut self,
        parent: NodeId,
        action: ActionId,
    ) -> Result<Option<NodeId>, TreeError> {
        let parent_node = self.node_mut(parent)?;
        let link = parent_node.link_mut(action).ok_or(TreeError::MissingLink {
            node_id: parent,
            action,
        })?;
        let Some(child) = link.child() else {
            return Ok(None);
        };
        link.clear_child();

        let now_leaf = parent_node.links().iter().all(|l| l.child().is_none());
        if now_leaf && !parent_node.is_leaf() {
            parent_node.set_is_leaf(true);
            self.leaves += 1;
        }

        if let Some(child_node) = self.arena.get_mut(child) {
            child_node.dec_parent_count();
        }
        Ok(Some(child))
    }

    /// Follow `action` from a node, creating the child according to the
    /// expansion policy. Returns `None` when the child does not exist and the
    /// policy declines to create it.
    pub fn child_for_action<G: Game<State = S>>(
        &mut self,
        node_id: NodeId,
        action: ActionId,
        policy: Expansion,
        game: &G,
    ) -> Result<Option<NodeId>, TreeError> {
        let node = self.node(node_id)?;
        let link = node.link(action).ok_or(TreeError::MissingLink {
            node_id,
            action,
        })?;

        if let Some(child) = link.child() {
            return Ok(Some(child));
        }

        let create = match policy {
            Expansion::Always => true,
            Expansion::Standard => link.times_chosen() >= self.expansion_threshold,
            Expansion::Never => false,
        };
        if !create {
            return Ok(None);
        }

        let depth = node.depth();
        let next_state = game.apply(node.state(), action);
        let key = game.canonical_key(&next_state);

        let child = match self.find_node(key) {
            Some(existing) => existing,
            None => {
                let actions = game.legal_actions(&next_state);
                self.add_node(Node::new(next_state, key, depth + 1, actions))
            }
        };

        self.link_child(node_id, action, child)?;
        Ok(Some(child))
    }

    /// Backup one reward into a node's link and refresh sibling bonuses.
    pub fn add_value(
        &mut self,
        node_id: NodeId,
        action: ActionId,
        reward: f64,
        c: f64,
    ) -> Result<(), TreeError> {
        let node = self.node_mut(node_id)?;
        if node.apply_backup(action, reward, c) {
            Ok(())
        } else {
            Err(TreeError::MissingLink { node_id, action })
        }
    }

    /// Remove a single node from the table, unlinking its children. Children
    /// are kept even at zero parents; use `delete_branch` to reclaim them.
    /// Any link still pointing at the removed node goes stale, so callers
    /// detach parents with `unlink_child` first.
    pub fn delete_node(&mut self, key: StateKey) -> Option<Node<S>> {
        let id = self.table.remove(&key)?;
        let node = self.arena.remove(id)?;

        self.deleted_nodes += 1;
        self.total_depth = self.total_depth.saturating_sub(node.depth());
        if node.is_leaf() {
            self.leaves = self.leaves.saturating_sub(1);
        }

        for link in node.links() {
            if let Some(child) = link.child() {
                if let Some(child_node) = self.arena.get_mut(child) {
                    child_node.dec_parent_count();
                }
            }
        }

        Some(node)
    }

    /// Delete an unreferenced node and recursively every descendant whose
    /// parent count drops to zero. Returns how many nodes were actually
    /// freed; a node still linked from any parent is never freed, so callers
    /// detach the branch with `unlink_child` first.
    pub fn delete_branch(&mut self, key: StateKey) -> u64 {
        let still_linked = self
            .find_node(key)
            .and_then(|id| self.arena.get(id))
            .is_none_or(|node| node.parent_count() > 0);
        if still_linked {
            return 0;
        }

        let Some(node) = self.delete_node(key) else {
            return 0;
        };

        let mut deleted = 1;
        for link in node.links() {
            if let Some(child) = link.child() {
                let child_info = self
                    .arena
                    .get(child)
                    .map(|child_node| (child_node.key(), child_node.parent_count()));
                if let Some((child_key, 0)) = child_info {
                    deleted += self.delete_branch(child_key);
                }
            }
        }

        deleted
    }

    /// Additively merge another tree grown from the same root. Statistics
    /// sum; subtrees the other tree explored and this one did not are
    /// imported wholesale. Children are wired before the parents that
    /// reference them, so the merge is a pure addition at every node.
    pub fn merge(&mut self, other: &Tree<S>) -> Result<(), TreeError> {
        let our_root = self.node(self.root)?.key();
        let their_root = other.node(other.root)?.key();
        if our_root != their_root {
            return Err(TreeError::RootMismatch {
                ours: our_root,
                theirs: their_root,
            });
        }

        // Deepest first: a child's statistics settle before any parent links it.
        let mut reachable = other.reachable_from_root();
        reachable.sort_by_key(|&(_, depth)| std::cmp::Reverse(depth));

        for &(other_id, _) in &reachable {
            let other_node = other.node(other_id)?;
            let key = other_node.key();

            let ours = match self.find_node(key) {
                Some(ours) => {
                    self.node_mut(ours)?.merge_node(other_node);
                    ours
                }
                None => {
                    let mut fresh = Node::new(
                        other_node.state().clone(),
                        key,
                        other_node.depth(),
                        other_node.actions(),
                    );
                    fresh.adopt_stats(other_node);
                    self.add_node(fresh)
                }
            };
            for link in other.node(other_id)?.links() {
                let Some(other_child) = link.child() else {
                    continue;
                };
                let child_key = other.node(other_child)?.key();
                let our_link_child = self.node(ours)?.link(link.action()).and_then(|l| l.child());
                if our_link_child.is_none() {
                    if let Some(our_child) = self.find_node(child_key) {
                        self.link_child(ours, link.action(), our_child)?;
                    }
                }
            }
        }

        self.recount();
        Ok(())
    }

    /// Rebuild the scan-derived counters (leaves, depth totals) from the
    /// table. The monotone counters are left alone.
    pub fn recount(&mut self) {
        debug_assert_eq!(self.arena.len(), self.table.len());

        let mut leaves = 0;
        let mut total_depth = 0;
        let mut maximum_depth = 0;

        for (_, node) in self.arena.iter() {
            if node.is_leaf() {
                leaves += 1;
            }
            total_depth += node.depth();
            if node.depth() > maximum_depth {
                maximum_depth = node.depth();
            }
        }

        self.leaves = leaves;
        self.total_depth = total_depth;
        self.maximum_depth = maximum_depth;
    }

    /// The path the tree currently favors: greedy playback with no
    /// exploration bonus, never expanding, from the root until off-tree.
    pub fn current_path<R: Rng>(&self, rng: &mut R) -> Vec<NodeId> {
        let mut path = vec![self.root];
        let mut current = self.root;

        loop {
            let Ok(node) = self.node(current) else {
                break;
            };
            let Some(action) = node.select_action(0.0, rng) else {
                break;
            };
            let Some(child) = node.link(action).and_then(|link| link.child()) else {
                break;
            };
            path.push(child);
            current = child;
        }

        path
    }

    fn reachable_from_root(&self) -> Vec<(NodeId, u64)> {
        let mut visited: HashMap<NodeId, u64> = HashMap::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if visited.contains_key(&id) {
                continue;
            }
            let Ok(node) = self.node(id) else { continue };
            visited.insert(id, node.depth());
            for link in node.links() {
                if let Some(child) = link.child() {
                    stack.push(child);
                }
            }
        }

        visited.into_iter().collect()
    }
}
