use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::game::Game;
use crate::sim::simulate;
use crate::sync::round::sync_round;
use crate::sync::transport::{Collective, SyncError};
use crate::tree::{
    error::TreeError,
    ids::{ActionId, NodeId},
    search_tree::{Expansion, Tree},
};

/// Error type for a worker's match loop.
#[derive(Debug)]
pub enum WorkerError {
    Tree(TreeError),
    /// The lockstep move exchange failed; the match cannot continue.
    Sync(SyncError),
    /// No action was selectable at a non-terminal position.
    NoMove { ply: usize },
    /// Rank 0 broadcast an action that is not legal here.
    IllegalMove { ply: usize, action: ActionId },
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Tree(err) => write!(f, "tree fault in worker: {err}"),
            WorkerError::Sync(err) => write!(f, "move exchange failed: {err}"),
            WorkerError::NoMove { ply } => {
                write!(f, "no selectable action at ply {ply}")
            }
            WorkerError::IllegalMove { ply, action } => {
                write!(
                    f,
                    "broadcast action {} is illegal at ply {ply}",
                    action.index()
                )
            }
        }
    }
}

impl std::error::Error for WorkerError {}

impl From<TreeError> for WorkerError {
    fn from(err: TreeError) -> Self {
        WorkerError::Tree(err)
    }
}

impl From<SyncError> for WorkerError {
    fn from(err: SyncError) -> Self {
        WorkerError::Sync(err)
    }
}

/// Attempts per simulation slot before the slot is counted as failed.
const SIM_ATTEMPTS: usize = 3;

/// What happened in one self-play match.
#[derive(Debug, Clone, Copy)]
pub struct MatchReport {
    pub plies: usize,
    /// Final score differential from the first player's view.
    pub first_player_net: i64,
    /// `first_player_net` collapsed to -1, 0, +1.
    pub outcome: i32,
    pub sims_run: usize,
    /// Slots whose every attempt failed.
    pub failed_sims: usize,
    /// Failed attempts that were retried within the same slot.
    pub retried_sims: usize,
    pub sync_rounds: usize,
    pub failed_syncs: usize,
}

/// One member of a worker group playing lockstep self-play matches.
///
/// Every worker grows its own pair of trees, one per player, from the same
/// deterministic game. Rank 0 commits each real move and broadcasts it, so
/// all workers walk the identical game while exploring different parts of
/// the search space with differently seeded RNGs. During the first player's
/// thinking time the group periodically merges statistics at the current
/// position.
pub struct Worker<G: Game, C: Collective> {
    game: G,
    collective: C,
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl<G: Game, C: Collective> Worker<G, C> {
    pub fn new(game: G, collective: C, config: SearchConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(collective.rank() as u64));
        Worker {
            game,
            collective,
            config,
            rng,
        }
    }

    pub fn rank(&self) -> usize {
        self.collective.rank()
    }

    pub fn world_size(&self) -> usize {
        self.collective.world_size()
    }

    /// Play `count` matches back to back. The first failed move exchange
    /// aborts the batch: the group is out of step at that point and there is
    /// no recovery short of reconnecting the cluster.
    pub fn run_matches(&mut self, count: usize) -> Result<Vec<MatchReport>, WorkerError> {
        let mut reports = Vec::with_capacity(count);
        for _ in 0..count {
            reports.push(self.play_match()?);
        }
        Ok(reports)
    }

    /// Play one full match from the initial state. Trees are fresh per match.
    pub fn play_match(&mut self) -> Result<MatchReport, WorkerError> {
        let mut trees = [
            Tree::for_game(&self.game, self.config.expansion_threshold),
            Tree::for_game(&self.game, self.config.expansion_threshold),
        ];
        let mut current: [NodeId; 2] = [trees[0].root_id(), trees[1].root_id()];

        let mut state = self.game.initial_state();
        let mut net: i64 = 0;
        let mut mover = 0usize;
        let mut report = MatchReport {
            plies: 0,
            first_player_net: 0,
            outcome: 0,
            sims_run: 0,
            failed_sims: 0,
            retried_sims: 0,
            sync_rounds: 0,
            failed_syncs: 0,
        };
        // A failed round leaves the group out of step, so statistics sharing
        // stays off for the rest of the match.
        let mut sync_enabled = self.collective.world_size() > 1;

        while !self.game.is_terminal(&state) {
            let start_net = if mover == 0 { net } else { -net };

            for step in 0..self.config.simulations_per_move {
                // An abandoned simulation left no statistics behind, so the
                // slot is simply retried from scratch, a bounded number of
                // times.
                for attempt in 1..=SIM_ATTEMPTS {
                    match simulate(
                        &mut trees[mover],
                        current[mover],
                        start_net,
                        &self.game,
                        &self.config,
                        &mut self.rng,
                    ) {
                        Ok(_) => {
                            report.sims_run += 1;
                            break;
                        }
                        Err(err) if attempt < SIM_ATTEMPTS => {
                            report.retried_sims += 1;
                            debug!(ply = report.plies, attempt, %err, "simulation abandoned, retrying");
                        }
                        Err(err) => {
                            report.failed_sims += 1;
                            debug!(ply = report.plies, %err, "simulation abandoned");
                        }
                    }
                }

                if sync_enabled && mover == 0 && (step + 1) % self.config.sync_interval == 0 {
                    match sync_round(
                        &mut trees[0],
                        current[0],
                        &self.game,
                        &self.collective,
                        self.config.c,
                    ) {
                        Ok(()) => report.sync_rounds += 1,
                        Err(err) => {
                            report.failed_syncs += 1;
                            sync_enabled = false;
                            warn!(
                                rank = self.collective.rank(),
                                ply = report.plies,
                                %err,
                                "synchronization round failed, sharing disabled for this match"
                            );
                        }
                    }
                }
            }

            let chosen = self.exchange_move(&trees, &current, mover, report.plies)?;
            if !self.game.legal_actions(&state).contains(&chosen) {
                return Err(WorkerError::IllegalMove {
                    ply: report.plies,
                    action: chosen,
                });
            }

            let delta = self.game.score_delta(&state, chosen) as i64;
            let keeps = self.game.keeps_turn(&state, chosen);

            for player in 0..2 {
                let next = trees[player].child_for_action(
                    current[player],
                    chosen,
                    Expansion::Always,
                    &self.game,
                )?;
                current[player] = next.ok_or(TreeError::MissingLink {
                    node_id: current[player],
                    action: chosen,
                })?;
            }

            state = self.game.apply(&state, chosen);
            net += if mover == 0 { delta } else { -delta };
            if !keeps {
                mover = 1 - mover;
            }
            report.plies += 1;
        }

        report.first_player_net = net;
        report.outcome = net.signum() as i32;
        debug!(
            rank = self.collective.rank(),
            plies = report.plies,
            net = report.first_player_net,
            outcome = report.outcome,
            "match finished"
        );
        Ok(report)
    }

    /// Commit one real move: rank 0 plays its tree's preferred action greedily
    /// and every other rank takes the broadcast result.
    fn exchange_move(
        &mut self,
        trees: &[Tree<G::State>; 2],
        current: &[NodeId; 2],
        mover: usize,
        ply: usize,
    ) -> Result<ActionId, WorkerError> {
        if self.collective.rank() == 0 {
            let action = trees[mover]
                .node(current[mover])?
                .select_action(0.0, &mut self.rng)
                .ok_or(WorkerError::NoMove { ply })?;
            if self.collective.world_size() > 1 {
                self.collective
                    .broadcast_i64("move", Some(vec![action.index() as i64]))?;
            }
            Ok(action)
        } else {
            let row = self.collective.broadcast_i64("move", None)?;
            match row.as_slice() {
                [value] => Ok(ActionId::from(*value as usize)),
                _ => Err(WorkerError::Sync(SyncError::LengthMismatch {
                    expected: 1,
                    got: row.len(),
                })),
            }
        }
    }
}
