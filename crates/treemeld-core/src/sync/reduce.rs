use crate::sync::encode::{decode_runs, level1_len, level2_len};

/// Averaged statistics for one round, as broadcast back to every worker.
/// Level 1 and 2 are expanded to their full logical layout; no run encoding
/// survives the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedStats {
    pub level0: Vec<f64>,
    pub level1: Vec<f64>,
    pub level2: Vec<f64>,
    pub reward3: Vec<f64>,
    pub visits3: Vec<f64>,
}

/// Position-wise mean of equal-length integer rows, one per worker. A
/// position whose mean lands below one collapses to zero, so a count seen on
/// only a minority of workers does not survive the reduction.
pub fn mean_counts(rows: &[Vec<i64>]) -> Vec<f64> {
    let workers = rows.len();
    if workers == 0 {
        return Vec::new();
    }
    let len = rows[0].len();
    let mut out = vec![0.0; len];
    for row in rows {
        for (slot, &value) in out.iter_mut().zip(row.iter()) {
            *slot += value as f64;
        }
    }
    for slot in &mut out {
        *slot /= workers as f64;
        if *slot < 1.0 {
            *slot = 0.0;
        }
    }
    out
}

/// Position-wise mean of equal-length float rows, one per worker.
pub fn mean_rewards(rows: &[Vec<f64>]) -> Vec<f64> {
    let workers = rows.len();
    if workers == 0 {
        return Vec::new();
    }
    let len = rows[0].len();
    let mut out = vec![0.0; len];
    for row in rows {
        for (slot, &value) in out.iter_mut().zip(row.iter()) {
            *slot += value;
        }
    }
    for slot in &mut out {
        *slot /= workers as f64;
    }
    out
}

/// Mean of run-encoded rows. Each worker's row is expanded to `logical_len`
/// raw entries first, so absent branches on one worker contribute zeros at
/// the positions other workers have counts for.
pub fn mean_encoded(rows: &[Vec<i64>], logical_len: usize) -> Vec<f64> {
    let decoded: Vec<Vec<i64>> = rows
        .iter()
        .map(|row| decode_runs(row, logical_len))
        .collect();
    mean_counts(&decoded)
}

/// Reduce one gathered set of worker reports for a round-root with `n`
/// actions. Rows within each level must already be padded to equal length.
pub fn reduce_reports(
    n: usize,
    level0s: &[Vec<i64>],
    level1s: &[Vec<i64>],
    level2s: &[Vec<i64>],
    reward3s: &[Vec<f64>],
    visits3s: &[Vec<i64>],
) -> CombinedStats {
    CombinedStats {
        level0: mean_counts(level0s),
        level1: mean_encoded(level1s, level1_len(n)),
        level2: mean_encoded(level2s, level2_len(n)),
        reward3: mean_rewards(reward3s),
        visits3: mean_counts(visits3s),
    }
}
