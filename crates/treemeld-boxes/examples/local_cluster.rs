//! Self-play on a 2x2 board with a group of in-process workers sharing
//! statistics. Run with `RUST_LOG=debug` to watch the synchronization rounds.

use std::thread;
use std::time::Duration;

use treemeld_boxes::DotsAndBoxes;
use treemeld_core::{LocalCluster, SearchConfig, Worker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = SearchConfig {
        simulations_per_move: 200,
        sync_interval: 50,
        ..SearchConfig::from_default_yaml()?
    };
    let board = DotsAndBoxes::new(2, 2)?;
    let world = 4;

    let endpoints = LocalCluster::connect(world, Duration::from_millis(config.sync_timeout_ms));
    let mut handles = Vec::new();
    for collective in endpoints {
        let board = board.clone();
        let config = config.clone();
        handles.push(thread::spawn(move || {
            Worker::new(board, collective, config).play_match()
        }));
    }

    for (rank, handle) in handles.into_iter().enumerate() {
        let report = handle.join().expect("worker thread")?;
        println!(
            "rank {rank}: {} plies, net {:+}, {} simulations, {} sync rounds",
            report.plies, report.first_player_net, report.sims_run, report.sync_rounds
        );
    }

    Ok(())
}
