use tracing::debug;

use crate::game::Game;
use crate::sync::combinatorics::{choose, combinations, rank2, rank3};
use crate::sync::encode::{flatten, level1_len, level2_len};
use crate::sync::reduce::{CombinedStats, reduce_reports};
use crate::sync::transport::{Collective, SyncError};
use crate::tree::{
    error::TreeError,
    ids::NodeId,
    node::Node,
    search_tree::Tree,
};

/// Run one synchronization round at `round_root` across the whole worker
/// group. Every worker flattens its local statistics, rank 0 averages the
/// gathered reports, and every worker rebuilds the three levels below the
/// round-root from the broadcast result.
///
/// All workers must call this at the same point with the same round-root
/// state; a worker that misses a stage fails the round with a timeout. A
/// round-root with fewer than three actions, or a group of one, is a no-op.
pub fn sync_round<S, G, C>(
    tree: &mut Tree<S>,
    round_root: NodeId,
    game: &G,
    collective: &C,
    c: f64,
) -> Result<(), SyncError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
    C: Collective,
{
    if collective.world_size() < 2 {
        return Ok(());
    }
    let n = tree.node(round_root)?.num_actions();
    if n < 3 {
        return Ok(());
    }

    let report = flatten(tree, round_root, game)?;

    // The run-encoded levels differ in length across workers. Negotiate the
    // padded wire length first so the gathers line up.
    let lens = [report.level1.len() as i64, report.level2.len() as i64];
    let all_lens = collective.gather_i64("lengths", &lens)?;
    let maxes = all_lens.map(|rows| {
        let mut maxes = vec![0i64; 2];
        for row in &rows {
            for (slot, &len) in maxes.iter_mut().zip(row.iter()) {
                if len > *slot {
                    *slot = len;
                }
            }
        }
        maxes
    });
    let maxes = collective.broadcast_i64("max-lengths", maxes)?;
    if maxes.len() != 2 {
        return Err(SyncError::LengthMismatch {
            expected: 2,
            got: maxes.len(),
        });
    }

    let mut level1 = report.level1;
    let mut level2 = report.level2;
    level1.resize(maxes[0] as usize, 0);
    level2.resize(maxes[1] as usize, 0);

    let level0s = collective.gather_i64("level0", &report.level0)?;
    let level1s = collective.gather_i64("level1", &level1)?;
    let level2s = collective.gather_i64("level2", &level2)?;
    let reward3s = collective.gather_f64("reward3", &report.reward3)?;
    let visits3s = collective.gather_i64("visits3", &report.visits3)?;

    let reduced = match (level0s, level1s, level2s, reward3s, visits3s) {
        (Some(l0), Some(l1), Some(l2), Some(r3), Some(v3)) => {
            Some(reduce_reports(n, &l0, &l1, &l2, &r3, &v3))
        }
        _ => None,
    };

    let combined = CombinedStats {
        level0: collective.broadcast_f64(
            "combined-level0",
            reduced.as_ref().map(|s| s.level0.clone()),
        )?,
        level1: collective.broadcast_f64(
            "combined-level1",
            reduced.as_ref().map(|s| s.level1.clone()),
        )?,
        level2: collective.broadcast_f64(
            "combined-level2",
            reduced.as_ref().map(|s| s.level2.clone()),
        )?,
        reward3: collective.broadcast_f64(
            "combined-reward3",
            reduced.as_ref().map(|s| s.reward3.clone()),
        )?,
        visits3: collective.broadcast_f64(
            "combined-visits3",
            reduced.as_ref().map(|s| s.visits3.clone()),
        )?,
    };

    apply_combined(tree, round_root, game, &combined, c)?;

    debug!(
        rank = collective.rank(),
        actions = n,
        "synchronization round applied"
    );
    Ok(())
}

/// Position of the ordered pair `(a, b)` in the level-1 layout: `a` picks the
/// block, `b` the slot among the `n - 1` remaining actions in ascending order.
fn ordered_index(a: usize, b: usize, n: usize) -> usize {
    a * (n - 1) + if b > a { b - 1 } else { b }
}

/// Combined counts are group means; only whole visits survive the write-back.
fn floor_count(value: f64) -> u64 {
    value as u64
}

/// Pick the traversal order for the unordered pair `{i, j}`: try `(i, j)`
/// then `(j, i)` and keep the first whose level-1 count and level-2 block are
/// both populated. Returns the chosen ordered index.
fn pick_ordering(i: usize, j: usize, n: usize, level1: &[f64], level2: &[f64]) -> Option<usize> {
    for (a, b) in [(i, j), (j, i)] {
        let index = ordered_index(a, b, n);
        let start = index * (n - 2);
        let block_sum: f64 = level2[start..start + (n - 2)].iter().sum();
        if level1[index] > 0.0 && block_sum > 0.0 {
            return Some(index);
        }
    }
    None
}

/// Find the resident node reached from `root` by a set of action positions,
/// without creating it.
fn find_combo_node<S, G>(
    tree: &Tree<S>,
    root: NodeId,
    game: &G,
    positions: &[usize],
) -> Result<Option<NodeId>, TreeError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
{
    let root_node = tree.node(root)?;
    let actions = root_node.actions();
    let combo_actions: Vec<_> = positions.iter().map(|&p| actions[p]).collect();
    let state = game.apply_many(root_node.state(), &combo_actions);
    Ok(tree.find_node(game.canonical_key(&state)))
}

/// Find or create the node reached from `root` by a set of action positions.
/// Creation only inserts the node into the table; the caller wires links.
fn ensure_combo_node<S, G>(
    tree: &mut Tree<S>,
    root: NodeId,
    game: &G,
    positions: &[usize],
) -> Result<NodeId, TreeError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
{
    let (actions, root_state, root_depth) = {
        let root_node = tree.node(root)?;
        (
            root_node.actions(),
            root_node.state().clone(),
            root_node.depth(),
        )
    };

    let combo_actions: Vec<_> = positions.iter().map(|&p| actions[p]).collect();
    let state = game.apply_many(&root_state, &combo_actions);
    let key = game.canonical_key(&state);

    if let Some(existing) = tree.find_node(key) {
        return Ok(existing);
    }

    let legal = game.legal_actions(&state);
    let depth = root_depth + positions.len() as u64;
    Ok(tree.add_node(Node::new(state, key, depth, legal)))
}

/// Rebuild the three levels below `round_root` from the group average.
///
/// Value estimates flow bottom-up: Q3 straight from the combination totals,
/// Q2 as the visit-weighted mix of the Q3 values reachable from each pair,
/// Q1 likewise from Q2. Missing nodes along populated paths are synthesized
/// through the transposition table, so re-running this with the same stats is
/// idempotent.
fn apply_combined<S, G>(
    tree: &mut Tree<S>,
    round_root: NodeId,
    game: &G,
    stats: &CombinedStats,
    c: f64,
) -> Result<(), SyncError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
{
    let (n, actions) = {
        let root_node = tree.node(round_root)?;
        (root_node.num_actions(), root_node.actions())
    };

    let triples = choose(n, 3);
    for (name, len, expected) in [
        ("level0", stats.level0.len(), n),
        ("level1", stats.level1.len(), level1_len(n)),
        ("level2", stats.level2.len(), level2_len(n)),
        ("reward3", stats.reward3.len(), triples),
        ("visits3", stats.visits3.len(), triples),
    ] {
        if len != expected {
            debug!(array = name, "combined array has unexpected length");
            return Err(SyncError::LengthMismatch { expected, got: len });
        }
    }

    let q3: Vec<f64> = (0..triples)
        .map(|r| {
            if stats.visits3[r] > 0.0 {
                stats.reward3[r] / stats.visits3[r]
            } else {
                0.0
            }
        })
        .collect();

    let mut q2 = vec![0.0; choose(n, 2)];
    for i in 0..n {
        for j in (i + 1)..n {
            let Some(index) = pick_ordering(i, j, n, &stats.level1, &stats.level2) else {
                continue;
            };
            let start = index * (n - 2);
            let block = &stats.level2[start..start + (n - 2)];
            let block_sum: f64 = block.iter().sum();

            let remaining: Vec<usize> = (0..n).filter(|&k| k != i && k != j).collect();
            let mut q = 0.0;
            for (p, &k) in remaining.iter().enumerate() {
                if block[p] > 0.0 {
                    q += block[p] / block_sum * q3[rank3(i, j, k, n)];
                }
            }
            q2[rank2(i, j, n)] = q;
        }
    }

    let mut q1 = vec![0.0; n];
    for i in 0..n {
        let block = &stats.level1[i * (n - 1)..(i + 1) * (n - 1)];
        let block_sum: f64 = block.iter().sum();
        if block_sum <= 0.0 {
            continue;
        }
        let others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
        for (p, &j) in others.iter().enumerate() {
            if block[p] > 0.0 {
                q1[i] += block[p] / block_sum * q2[rank2(i, j, n)];
            }
        }
    }

    // Level 3: make sure every visited combination has a node and carries the
    // group's visit total.
    for (r, combo) in combinations(n, 3).into_iter().enumerate() {
        let visits = floor_count(stats.visits3[r]);
        if visits == 0 {
            continue;
        }
        let id = ensure_combo_node(tree, round_root, game, &combo)?;
        tree.node_mut(id)?.set_visit_count(visits);
    }

    // Level 2: pair nodes, patched from the chosen ordering's block and
    // valued by Q3, then wired down to the level-3 nodes.
    for i in 0..n {
        for j in (i + 1)..n {
            let Some(index) = pick_ordering(i, j, n, &stats.level1, &stats.level2) else {
                continue;
            };
            let start = index * (n - 2);
            let counts: Vec<u64> = stats.level2[start..start + (n - 2)]
                .iter()
                .map(|&value| floor_count(value))
                .collect();
            let remaining: Vec<usize> = (0..n).filter(|&k| k != i && k != j).collect();

            let pair_id = ensure_combo_node(tree, round_root, game, &[i, j])?;
            let visit = 1 + counts.iter().sum::<u64>();

            for (p, &k) in remaining.iter().enumerate() {
                let action = actions[k];
                {
                    let node = tree.node_mut(pair_id)?;
                    let link = node.link_mut(action).ok_or(TreeError::MissingLink {
                        node_id: pair_id,
                        action,
                    })?;
                    link.set_times_chosen(counts[p]);
                    link.sync_update(q3[rank3(i, j, k, n)], visit, c);
                }
                if counts[p] > 0 {
                    if let Some(triple) = find_combo_node(tree, round_root, game, &[i, j, k])? {
                        tree.link_child(pair_id, action, triple)?;
                    }
                }
            }
            tree.node_mut(pair_id)?.set_visit_count(visit);
        }
    }

    // Level 1: one child per root action, patched from its level-1 block and
    // valued by Q2, wired to the root and down to the pair nodes.
    for i in 0..n {
        let block: Vec<u64> = stats.level1[i * (n - 1)..(i + 1) * (n - 1)]
            .iter()
            .map(|&value| floor_count(value))
            .collect();
        let block_total: u64 = block.iter().sum();
        if block_total == 0 && floor_count(stats.level0[i]) == 0 {
            continue;
        }

        let child_id = ensure_combo_node(tree, round_root, game, &[i])?;
        let visit = 1 + block_total;
        let others: Vec<usize> = (0..n).filter(|&j| j != i).collect();

        for (p, &j) in others.iter().enumerate() {
            let action = actions[j];
            {
                let node = tree.node_mut(child_id)?;
                let link = node.link_mut(action).ok_or(TreeError::MissingLink {
                    node_id: child_id,
                    action,
                })?;
                link.set_times_chosen(block[p]);
                link.sync_update(q2[rank2(i, j, n)], visit, c);
            }
            if block[p] > 0 {
                if let Some(pair) = find_combo_node(tree, round_root, game, &[i, j])? {
                    tree.link_child(child_id, action, pair)?;
                }
            }
        }
        tree.node_mut(child_id)?.set_visit_count(visit);
        tree.link_child(round_root, actions[i], child_id)?;
    }

    // Level 0: the round-root's own links take the averaged visit counts and
    // the Q1 estimates.
    {
        let node = tree.node_mut(round_root)?;
        let mut total = 0u64;
        for (i, &action) in actions.iter().enumerate() {
            let count = floor_count(stats.level0[i]);
            let link = node.link_mut(action).ok_or(TreeError::MissingLink {
                node_id: round_root,
                action,
            })?;
            link.set_times_chosen(count);
            total += count;
        }
        let visit = 1 + total;
        node.set_visit_count(visit);
        for (i, &action) in actions.iter().enumerate() {
            let link = node.link_mut(action).ok_or(TreeError::MissingLink {
                node_id: round_root,
                action,
            })?;
            link.sync_update(q1[i], visit, c);
        }
    }

    Ok(())
}
