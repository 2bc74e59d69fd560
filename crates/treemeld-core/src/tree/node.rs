use rand::Rng;

use crate::tree::{
    ids::{ActionId, StateKey},
    links::ActionLink,
};

/// A decision state in the search tree. Owns one `ActionLink` per legal
/// action, in the stable order the game enumerated them at creation time.
#[derive(Debug, Clone)]
pub struct Node<S> {
    state: S,
    key: StateKey,
    depth: u64,
    visit_count: u64,
    is_leaf: bool,
    parent_count: u64,
    links: Vec<ActionLink>,
}

impl<S> Node<S> {
    /// Create a new node for a state with its legal actions.
    pub fn new(state: S, key: StateKey, depth: u64, actions: Vec<ActionId>) -> Self {
        Node {
            state,
            key,
            depth,
            visit_count: 1,
            is_leaf: true,
            parent_count: 0,
            links: actions.into_iter().map(ActionLink::new).collect(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn key(&self) -> StateKey {
        self.key
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// The number of times this node has been reached, N(s).
    pub fn visit_count(&self) -> u64 {
        self.visit_count
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Number of action links elsewhere in the table whose child is this
    /// node. A node may only be evicted once this drops to zero.
    pub fn parent_count(&self) -> u64 {
        self.parent_count
    }

    pub fn links(&self) -> &[ActionLink] {
        &self.links
    }

    /// Number of legal actions from this state.
    pub fn num_actions(&self) -> usize {
        self.links.len()
    }

    /// Look up the link for a game action.
    pub fn link(&self, action: ActionId) -> Option<&ActionLink> {
        self.links.iter().find(|link| link.action() == action)
    }

    pub(crate) fn link_mut(&mut self, action: ActionId) -> Option<&mut ActionLink> {
        self.links.iter_mut().find(|link| link.action() == action)
    }

    /// The game actions of every link, in stable link order.
    pub fn actions(&self) -> Vec<ActionId> {
        self.links.iter().map(|link| link.action()).collect()
    }

    /// Visit counts of every link, in stable link order.
    pub fn times_chosen_vec(&self) -> Vec<u64> {
        self.links.iter().map(|link| link.times_chosen()).collect()
    }

    /// Cumulative reward over all links.
    pub fn total_reward(&self) -> f64 {
        self.links.iter().map(|link| link.reward_sum()).sum()
    }

    /// Select the next action by value plus exploration bonus. Exact ties are
    /// broken uniformly at random among all tied maxima.
    pub fn select_action<R: Rng>(&self, c: f64, rng: &mut R) -> Option<ActionId> {
        if self.links.is_empty() {
            return None;
        }

        let apply_bonus = c > 0.0;
        let mut best = f64::NEG_INFINITY;
        let mut tied: Vec<ActionId> = Vec::new();

        for link in &self.links {
            let value = link.value(apply_bonus);
            if value > best {
                best = value;
                tied.clear();
                tied.push(link.action());
            } else if value == best {
                tied.push(link.action());
            }
        }

        if tied.len() == 1 {
            Some(tied[0])
        } else {
            Some(tied[rng.gen_range(0..tied.len())])
        }
    }

    /// Backup step: count the visit, add the reward to the chosen action, and
    /// refresh every sibling's bonus from the new visit total. Returns false
    /// when the node has no link for the action.
    pub(crate) fn apply_backup(&mut self, action: ActionId, reward: f64, c: f64) -> bool {
        let Some(link) = self.links.iter_mut().find(|link| link.action() == action) else {
            return false;
        };

        self.visit_count += 1;
        link.update(reward);

        for link in &mut self.links {
            link.update_bonus(self.visit_count, c);
        }

        true
    }

    /// Additive merge with an equivalent node from another tree. Assumes the
    /// two nodes describe the same state and therefore carry the same links
    /// in the same order.
    pub(crate) fn merge_node(&mut self, other: &Node<S>) {
        self.visit_count += other.visit_count;
        self.is_leaf = self.is_leaf && other.is_leaf;

        for (link, other_link) in self.links.iter_mut().zip(other.links.iter()) {
            link.merge(other_link);
        }
    }

    /// Copy the statistics of an equivalent node wholesale. Used when a merge
    /// imports a node this tree had never seen.
    pub(crate) fn adopt_stats(&mut self, other: &Node<S>) {
        self.visit_count = other.visit_count;
        self.is_leaf = self.is_leaf && other.is_leaf;

        for (link, other_link) in self.links.iter_mut().zip(other.links.iter()) {
            link.set_times_chosen(other_link.times_chosen());
            link.set_reward_sum(other_link.reward_sum());
        }
    }

    pub(crate) fn set_visit_count(&mut self, visit_count: u64) {
        self.visit_count = visit_count;
    }

    pub(crate) fn set_is_leaf(&mut self, is_leaf: bool) {
        self.is_leaf = is_leaf;
    }

    pub(crate) fn inc_parent_count(&mut self) {
        self.parent_count += 1;
    }

    pub(crate) fn dec_parent_count(&mut self) {
        self.parent_count = self.parent_count.saturating_sub(1);
    }
}
