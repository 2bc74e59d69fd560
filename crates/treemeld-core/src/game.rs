use rand::Rng;

use crate::tree::ids::{ActionId, StateKey};

/// Contract for the game collaborator the search core runs against.
///
/// The core never inspects states; it only threads them through these calls.
/// Two requirements matter beyond the obvious ones:
///
/// - `legal_actions` must enumerate actions in a stable, deterministic order,
///   because the synchronization protocol addresses statistics by position in
///   that order across independent workers.
/// - `apply_many` must be commutative over the action multiset: applying the
///   same set of actions in any order yields the same state. The merge
///   protocol relies on this to name a node by an unordered action
///   combination.
pub trait Game {
    type State: Clone + Eq + std::fmt::Debug;

    /// The state the game starts from.
    fn initial_state(&self) -> Self::State;

    /// Distinct legal actions from a state, in stable order.
    fn legal_actions(&self, state: &Self::State) -> Vec<ActionId>;

    /// Successor state after one action.
    fn apply(&self, state: &Self::State, action: ActionId) -> Self::State;

    /// Successor state after a batch of actions, order-independent.
    fn apply_many(&self, state: &Self::State, actions: &[ActionId]) -> Self::State {
        actions
            .iter()
            .fold(state.clone(), |state, &action| self.apply(&state, action))
    }

    /// Canonical transposition key for a state. Must be stable, and must
    /// collapse symmetric states to one key if the game reduces symmetries.
    fn canonical_key(&self, state: &Self::State) -> StateKey;

    /// How many points the acting player scores by playing `action` here.
    fn score_delta(&self, state: &Self::State, action: ActionId) -> u32;

    /// Whether the acting player keeps the turn after `action`. The default
    /// is the scoring rule: a point-scoring move grants another turn.
    fn keeps_turn(&self, state: &Self::State, action: ActionId) -> bool {
        self.score_delta(state, action) > 0
    }

    /// Whether the game is over in this state.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Uniformly random legal action, used by the default playout policy.
    fn random_action<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Option<ActionId> {
        let actions = self.legal_actions(state);
        if actions.is_empty() {
            None
        } else {
            Some(actions[rng.gen_range(0..actions.len())])
        }
    }
}
