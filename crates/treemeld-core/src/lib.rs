mod config;
mod game;
mod sim;
mod sync;
#[cfg(test)]
mod testgame;
mod tree;
mod worker;

pub use config::{SearchConfig, SearchConfigError};
pub use game::Game;
pub use sim::{SimError, SimReport, simulate};
pub use sync::combinatorics;
pub use sync::encode::{StatsReport, combine_zeros, decode_runs, flatten, level1_len, level2_len};
pub use sync::reduce::{CombinedStats, mean_counts, mean_encoded, mean_rewards, reduce_reports};
pub use sync::round::sync_round;
pub use sync::transport::{ChannelCollective, Collective, LocalCluster, SyncError};
pub use tree::error::TreeError;
pub use tree::ids::{ActionId, NodeId, StateKey};
pub use tree::links::ActionLink;
pub use tree::node::Node;
pub use tree::search_tree::{Expansion, Tree};
pub use worker::{MatchReport, Worker, WorkerError};
