use crate::game::Game;
use crate::sync::combinatorics::combinations;
use crate::tree::{error::TreeError, ids::NodeId, search_tree::Tree};

/// One worker's flattened statistics for the three levels below the
/// round-root, plus the level-3 combination totals. Lives only for the
/// duration of one synchronization round.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    /// Visit counts of the round-root's own links, one per action.
    pub level0: Vec<i64>,
    /// Grandchild visit counts, zero-run encoded, variable length.
    pub level1: Vec<i64>,
    /// Great-grandchild visit counts, zero-run encoded, variable length.
    pub level2: Vec<i64>,
    /// Cumulative reward per 3-combination of root actions, in rank order.
    pub reward3: Vec<f64>,
    /// Visit total per 3-combination of root actions, in rank order.
    pub visits3: Vec<i64>,
}

/// Expanded (decoded) length of the level-1 report for `n` root actions.
pub fn level1_len(n: usize) -> usize {
    n * n.saturating_sub(1)
}

/// Expanded (decoded) length of the level-2 report for `n` root actions.
pub fn level2_len(n: usize) -> usize {
    n * n.saturating_sub(1) * n.saturating_sub(2)
}

/// Collapse zero entries and absent-branch sentinels into maximal negative
/// runs: `-m` stands for `m` consecutive zeros.
pub fn combine_zeros(values: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(values.len());
    let mut run: i64 = 0;

    for &value in values {
        if value < 0 {
            run += value;
        } else if value == 0 {
            run -= 1;
        } else {
            if run != 0 {
                out.push(run);
                run = 0;
            }
            out.push(value);
        }
    }
    if run != 0 {
        out.push(run);
    }

    out
}

/// Expand a zero-run encoded slice back to `logical_len` raw entries.
/// Trailing pad (anything past the logical data) is ignored.
pub fn decode_runs(encoded: &[i64], logical_len: usize) -> Vec<i64> {
    let mut out = Vec::with_capacity(logical_len);

    for &value in encoded {
        if out.len() >= logical_len {
            break;
        }
        if value < 0 {
            let zeros = (-value) as usize;
            for _ in 0..zeros.min(logical_len - out.len()) {
                out.push(0);
            }
        } else {
            out.push(value);
        }
    }

    out.resize(logical_len, 0);
    out
}

/// Flatten a worker's local statistics for the three levels below `root`.
///
/// Level 1 walks the root's children in link order: an absent child stands in
/// for its whole block with the sentinel `-(n-1)`, a present child emits its
/// `n-1` link visit counts. Level 2 does the same one layer down with block
/// size `n-2`. Level 3 records, for every unordered 3-combination of the
/// root's actions, the reward and visit totals of the node reached by that
/// combination, or zeros when no such node exists locally.
pub fn flatten<S, G>(tree: &Tree<S>, root: NodeId, game: &G) -> Result<StatsReport, TreeError>
where
    S: Clone + Eq + std::fmt::Debug,
    G: Game<State = S>,
{
    let root_node = tree.node(root)?;
    let n = root_node.num_actions();
    let actions = root_node.actions();

    let level0: Vec<i64> = root_node
        .links()
        .iter()
        .map(|link| link.times_chosen() as i64)
        .collect();

    let block1 = n.saturating_sub(1);
    let block2 = n.saturating_sub(2);
    let mut raw1: Vec<i64> = Vec::new();
    let mut raw2: Vec<i64> = Vec::new();

    for link in root_node.links() {
        let child = link.child().and_then(|id| tree.node(id).ok());
        // A child whose action count disagrees with the combinatorial layout
        // cannot be addressed by rank; report its block as absent.
        let child = child.filter(|node| node.num_actions() == block1);

        match child {
            None => {
                raw1.push(-(block1 as i64));
                raw2.push(-((block1 * block2) as i64));
            }
            Some(child_node) => {
                for count in child_node.times_chosen_vec() {
                    raw1.push(count as i64);
                }

                for grand_link in child_node.links() {
                    let grandchild = grand_link.child().and_then(|id| tree.node(id).ok());
                    let grandchild = grandchild.filter(|node| node.num_actions() == block2);
                    match grandchild {
                        None => raw2.push(-(block2 as i64)),
                        Some(grand_node) => {
                            for count in grand_node.times_chosen_vec() {
                                raw2.push(count as i64);
                            }
                        }
                    }
                }
            }
        }
    }

    let mut reward3 = Vec::new();
    let mut visits3 = Vec::new();
    for combo in combinations(n, 3) {
        let combo_actions: Vec<_> = combo.iter().map(|&index| actions[index]).collect();
        let state = game.apply_many(root_node.state(), &combo_actions);
        let key = game.canonical_key(&state);

        match tree.find_node(key) {
            Some(id) => {
                let node = tree.node(id)?;
                reward3.push(node.total_reward());
                visits3.push(node.visit_count() as i64);
            }
            None => {
                reward3.push(0.0);
                visits3.push(0);
            }
        }
    }

    Ok(StatsReport {
        level0,
        level1: combine_zeros(&raw1),
        level2: combine_zeros(&raw2),
        reward3,
        visits3,
    })
}
