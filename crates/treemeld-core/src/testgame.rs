use crate::game::Game;
use crate::tree::ids::{ActionId, StateKey};

/// Tiny claiming game for tests. Players alternately claim items from a fixed
/// pool; claiming a scoring item is worth a point and keeps the turn. The
/// final position depends only on which items were claimed, so different move
/// orders transpose to the same state.
#[derive(Debug, Clone)]
pub(crate) struct ClaimGame {
    items: usize,
    scoring: u32,
}

impl ClaimGame {
    pub(crate) fn new(items: usize, scoring: u32) -> Self {
        assert!(items <= 32, "claim game supports at most 32 items");
        ClaimGame { items, scoring }
    }
}

impl Game for ClaimGame {
    type State = u32;

    fn initial_state(&self) -> u32 {
        0
    }

    fn legal_actions(&self, state: &u32) -> Vec<ActionId> {
        (0..self.items)
            .filter(|&item| state & (1 << item) == 0)
            .map(ActionId::from)
            .collect()
    }

    fn apply(&self, state: &u32, action: ActionId) -> u32 {
        state | (1 << action.index())
    }

    fn canonical_key(&self, state: &u32) -> StateKey {
        StateKey::from(*state as u64)
    }

    fn score_delta(&self, _state: &u32, action: ActionId) -> u32 {
        if self.scoring & (1 << action.index()) != 0 {
            1
        } else {
            0
        }
    }

    fn is_terminal(&self, state: &u32) -> bool {
        state.count_ones() as usize == self.items
    }
}
