use std::fmt;

use rand::Rng;

use crate::config::SearchConfig;
use crate::game::Game;
use crate::tree::{
    error::TreeError,
    ids::{ActionId, NodeId, StateKey},
    search_tree::{Expansion, Tree},
};

/// Error type for a single simulation. A simulation fault abandons one match;
/// statistics already committed to the tree stay valid.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    Tree(TreeError),
    /// The playout ran out of legal actions before the game ended.
    NoLegalActions { key: StateKey },
    /// The playout exceeded the configured step bound without terminating.
    PlayoutDiverged { steps: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Tree(err) => write!(f, "tree fault during simulation: {err}"),
            SimError::NoLegalActions { key } => {
                write!(f, "no legal actions in non-terminal state {}", key.value())
            }
            SimError::PlayoutDiverged { steps } => {
                write!(f, "playout did not terminate within {steps} steps")
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<TreeError> for SimError {
    fn from(err: TreeError) -> Self {
        SimError::Tree(err)
    }
}

/// What one simulation did.
#[derive(Debug, Clone, Copy)]
pub struct SimReport {
    /// Selection steps taken on-tree.
    pub tree_steps: usize,
    /// Random playout steps taken off-tree.
    pub playout_steps: usize,
    /// Match outcome relative to the player to move at the start: -1, 0, +1.
    pub outcome: i32,
}

/// One full MCTS cycle from `start`: selection with UCB and lazy expansion,
/// uniform-random playout off-tree, then backpropagation of the collapsed
/// outcome along the recorded path.
///
/// `start_net` is the score differential, relative to the player to move at
/// `start`, accumulated in the real game before this node.
pub fn simulate<S, G, R>(
    tree: &mut Tree<S>,
    start: NodeId,
    start_net: i64,
    game: &G,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<SimReport, SimError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
    R: Rng,
{
    let c = config.c;
    let mut mover_is_first = true;
    let mut net = start_net;
    let mut visited: Vec<(NodeId, ActionId, bool)> = Vec::new();

    let mut current = start;
    let mut state = tree.node(current)?.state().clone();
    let mut off_tree = false;

    while !game.is_terminal(&state) && !off_tree {
        let action = {
            let node = tree.node(current)?;
            node.select_action(c, rng)
                .ok_or(TreeError::SelectionFailed { node_id: current })?
        };
        visited.push((current, action, mover_is_first));

        let delta = game.score_delta(&state, action) as i64;
        let keeps = game.keeps_turn(&state, action);

        let next = tree.child_for_action(current, action, Expansion::Standard, game)?;
        state = game.apply(&state, action);

        net += if mover_is_first { delta } else { -delta };
        if !keeps {
            mover_is_first = !mover_is_first;
        }

        match next {
            Some(child) => current = child,
            None => off_tree = true,
        }
    }

    let tree_steps = visited.len();
    let mut playout_steps = 0;

    // Playout: purely off-tree, no nodes created.
    while !game.is_terminal(&state) {
        if playout_steps >= config.max_playout_steps {
            return Err(SimError::PlayoutDiverged {
                steps: playout_steps,
            });
        }

        let action = game
            .random_action(&state, rng)
            .ok_or_else(|| SimError::NoLegalActions {
                key: game.canonical_key(&state),
            })?;

        let delta = game.score_delta(&state, action) as i64;
        let keeps = game.keeps_turn(&state, action);
        state = game.apply(&state, action);

        net += if mover_is_first { delta } else { -delta };
        if !keeps {
            mover_is_first = !mover_is_first;
        }
        playout_steps += 1;
    }

    let outcome = net.signum() as i32;

    // Backpropagate in recording order, flipping the sign for the opponent's
    // plies so every link accumulates reward from its own mover's view.
    for &(node_id, action, was_first) in &visited {
        let reward = if was_first { outcome } else { -outcome } as f64;
        tree.add_value(node_id, action, reward, c)?;
    }

    Ok(SimReport {
        tree_steps,
        playout_steps,
        outcome,
    })
}
