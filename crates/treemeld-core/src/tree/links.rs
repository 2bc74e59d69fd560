use crate::tree::ids::{ActionId, NodeId};

/// One directed edge out of a node: "taking a particular action from this
/// state". Holds the running statistics MCTS updates on every backup plus a
/// lazily created child reference into the tree arena.
#[derive(Debug, Clone)]
pub struct ActionLink {
    action: ActionId,
    times_chosen: u64,
    reward_sum: f64,
    bonus: f64,
    child: Option<NodeId>,
}

impl ActionLink {
    /// Create a fresh link with no child and no visits.
    pub fn new(action: ActionId) -> Self {
        ActionLink {
            action,
            times_chosen: 0,
            reward_sum: 0.0,
            bonus: 1.0,
            child: None,
        }
    }

    /// Getter for the game action this link represents.
    pub fn action(&self) -> ActionId {
        self.action
    }

    /// Number of times this action was chosen during selection.
    pub fn times_chosen(&self) -> u64 {
        self.times_chosen
    }

    /// Cumulative reward observed after choosing this action.
    pub fn reward_sum(&self) -> f64 {
        self.reward_sum
    }

    /// The child node, if one has been expanded for this link.
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub(crate) fn set_child(&mut self, child: NodeId) {
        self.child = Some(child);
    }

    pub(crate) fn clear_child(&mut self) {
        self.child = None;
    }

    /// Record one backup: add the reward and count the visit.
    pub fn update(&mut self, reward: f64) {
        self.reward_sum += reward;
        self.times_chosen += 1;
    }

    /// Recompute the exploration bonus `c * sqrt(ln(N) / n_a)` from the
    /// parent's visit total. An unvisited link gets an infinite bonus so it
    /// is always tried before re-sampling a sibling.
    pub fn update_bonus(&mut self, parent_visits: u64, c: f64) {
        self.bonus = if self.times_chosen == 0 || parent_visits == 0 {
            f64::INFINITY
        } else {
            c * ((parent_visits as f64).ln() / self.times_chosen as f64).sqrt()
        };
    }

    /// The selection value of this action: mean reward plus (optionally) the
    /// exploration bonus. An unvisited link is worth its bonus alone.
    pub fn value(&self, apply_bonus: bool) -> f64 {
        if self.times_chosen == 0 {
            return self.bonus;
        }

        let mean = self.reward_sum / self.times_chosen as f64;
        if apply_bonus { mean + self.bonus } else { mean }
    }

    /// Additive merge with the equivalent link from another tree.
    /// Child wiring is the tree's job; only statistics combine here.
    pub(crate) fn merge(&mut self, other: &ActionLink) {
        self.times_chosen += other.times_chosen;
        self.reward_sum += other.reward_sum;
    }

    /// Overwrite statistics from a synchronization round: the reward sum is
    /// rebuilt from the merged value estimate and the (already replaced)
    /// visit count, then the bonus is refreshed.
    pub(crate) fn sync_update(&mut self, q: f64, parent_visits: u64, c: f64) {
        self.reward_sum = q * self.times_chosen as f64;
        self.update_bonus(parent_visits, c);
    }

    pub(crate) fn set_times_chosen(&mut self, times_chosen: u64) {
        self.times_chosen = times_chosen;
    }

    pub(crate) fn set_reward_sum(&mut self, reward_sum: f64) {
        self.reward_sum = reward_sum;
    }
}
