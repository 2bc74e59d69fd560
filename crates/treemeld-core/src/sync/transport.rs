use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::tree::error::TreeError;

/// Error type for a synchronization round. Any failure abandons the round on
/// the failing worker; the local tree keeps searching with its own statistics.
#[derive(Debug)]
pub enum SyncError {
    /// A collective call did not complete within the configured timeout.
    Timeout { stage: &'static str },
    /// A peer hung up mid-round.
    Disconnected { stage: &'static str },
    /// A peer sent a payload of the wrong kind for this stage.
    Protocol { stage: &'static str },
    /// An array arrived with an unexpected length.
    LengthMismatch { expected: usize, got: usize },
    Tree(TreeError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Timeout { stage } => write!(f, "timed out during sync stage '{stage}'"),
            SyncError::Disconnected { stage } => {
                write!(f, "peer disconnected during sync stage '{stage}'")
            }
            SyncError::Protocol { stage } => {
                write!(f, "unexpected payload during sync stage '{stage}'")
            }
            SyncError::LengthMismatch { expected, got } => {
                write!(f, "expected array of length {expected}, got {got}")
            }
            SyncError::Tree(err) => write!(f, "tree fault during sync: {err}"),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<TreeError> for SyncError {
    fn from(err: TreeError) -> Self {
        SyncError::Tree(err)
    }
}

/// Rank-0-rooted collective operations over a fixed set of workers.
///
/// `gather_*` returns `Some(rows)` at rank 0, ordered by rank, and `None`
/// everywhere else. `broadcast_*` takes `Some(row)` at rank 0 and returns the
/// broadcast row on every rank.
pub trait Collective {
    fn rank(&self) -> usize;
    fn world_size(&self) -> usize;

    fn gather_i64(
        &self,
        stage: &'static str,
        row: &[i64],
    ) -> Result<Option<Vec<Vec<i64>>>, SyncError>;

    fn gather_f64(
        &self,
        stage: &'static str,
        row: &[f64],
    ) -> Result<Option<Vec<Vec<f64>>>, SyncError>;

    fn broadcast_i64(
        &self,
        stage: &'static str,
        row: Option<Vec<i64>>,
    ) -> Result<Vec<i64>, SyncError>;

    fn broadcast_f64(
        &self,
        stage: &'static str,
        row: Option<Vec<f64>>,
    ) -> Result<Vec<f64>, SyncError>;
}

enum Payload {
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

enum Links {
    Root {
        to_workers: Vec<Sender<Payload>>,
        from_workers: Vec<Receiver<Payload>>,
    },
    Worker {
        to_root: Sender<Payload>,
        from_root: Receiver<Payload>,
    },
}

/// In-process `Collective` over std mpsc channels, one endpoint per thread.
/// Rank 0 is the coordinator; every worker talks only to it.
pub struct ChannelCollective {
    rank: usize,
    world: usize,
    timeout: Duration,
    links: Links,
}

/// Builds the channel mesh for an in-process worker group.
pub struct LocalCluster;

impl LocalCluster {
    /// Create `world_size` connected endpoints. Endpoint `i` has rank `i`;
    /// hand each one to its own thread.
    pub fn connect(world_size: usize, timeout: Duration) -> Vec<ChannelCollective> {
        assert!(world_size > 0, "world size must be at least 1");

        let mut to_workers = Vec::with_capacity(world_size - 1);
        let mut from_workers = Vec::with_capacity(world_size - 1);
        let mut workers = Vec::with_capacity(world_size - 1);

        for rank in 1..world_size {
            let (down_tx, down_rx) = mpsc::channel();
            let (up_tx, up_rx) = mpsc::channel();
            to_workers.push(down_tx);
            from_workers.push(up_rx);
            workers.push(ChannelCollective {
                rank,
                world: world_size,
                timeout,
                links: Links::Worker {
                    to_root: up_tx,
                    from_root: down_rx,
                },
            });
        }

        let root = ChannelCollective {
            rank: 0,
            world: world_size,
            timeout,
            links: Links::Root {
                to_workers,
                from_workers,
            },
        };

        let mut endpoints = Vec::with_capacity(world_size);
        endpoints.push(root);
        endpoints.extend(workers);
        endpoints
    }
}

impl ChannelCollective {
    fn recv(&self, rx: &Receiver<Payload>, stage: &'static str) -> Result<Payload, SyncError> {
        rx.recv_timeout(self.timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => SyncError::Timeout { stage },
            RecvTimeoutError::Disconnected => SyncError::Disconnected { stage },
        })
    }

    fn gather<T, F, G>(
        &self,
        stage: &'static str,
        row: Vec<T>,
        wrap: F,
        unwrap: G,
    ) -> Result<Option<Vec<Vec<T>>>, SyncError>
    where
        F: Fn(Vec<T>) -> Payload,
        G: Fn(Payload) -> Option<Vec<T>>,
    {
        match &self.links {
            Links::Root { from_workers, .. } => {
                let mut rows = Vec::with_capacity(self.world);
                rows.push(row);
                for rx in from_workers {
                    let payload = self.recv(rx, stage)?;
                    let row = unwrap(payload).ok_or(SyncError::Protocol { stage })?;
                    rows.push(row);
                }
                Ok(Some(rows))
            }
            Links::Worker { to_root, .. } => {
                to_root
                    .send(wrap(row))
                    .map_err(|_| SyncError::Disconnected { stage })?;
                Ok(None)
            }
        }
    }

    fn broadcast<T, F, G>(
        &self,
        stage: &'static str,
        row: Option<Vec<T>>,
        wrap: F,
        unwrap: G,
    ) -> Result<Vec<T>, SyncError>
    where
        T: Clone,
        F: Fn(Vec<T>) -> Payload,
        G: Fn(Payload) -> Option<Vec<T>>,
    {
        match &self.links {
            Links::Root { to_workers, .. } => {
                let row = row.ok_or(SyncError::Protocol { stage })?;
                for tx in to_workers {
                    tx.send(wrap(row.clone()))
                        .map_err(|_| SyncError::Disconnected { stage })?;
                }
                Ok(row)
            }
            Links::Worker { from_root, .. } => {
                let payload = self.recv(from_root, stage)?;
                unwrap(payload).ok_or(SyncError::Protocol { stage })
            }
        }
    }
}

impl Collective for ChannelCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world
    }

    fn gather_i64(
        &self,
        stage: &'static str,
        row: &[i64],
    ) -> Result<Option<Vec<Vec<i64>>>, SyncError> {
        self.gather(
            stage,
            row.to_vec(),
            Payload::Ints,
            |payload| match payload {
                Payload::Ints(row) => Some(row),
                Payload::Floats(_) => None,
            },
        )
    }

    fn gather_f64(
        &self,
        stage: &'static str,
        row: &[f64],
    ) -> Result<Option<Vec<Vec<f64>>>, SyncError> {
        self.gather(
            stage,
            row.to_vec(),
            Payload::Floats,
            |payload| match payload {
                Payload::Floats(row) => Some(row),
                Payload::Ints(_) => None,
            },
        )
    }

    fn broadcast_i64(
        &self,
        stage: &'static str,
        row: Option<Vec<i64>>,
    ) -> Result<Vec<i64>, SyncError> {
        self.broadcast(stage, row, Payload::Ints, |payload| match payload {
            Payload::Ints(row) => Some(row),
            Payload::Floats(_) => None,
        })
    }

    fn broadcast_f64(
        &self,
        stage: &'static str,
        row: Option<Vec<f64>>,
    ) -> Result<Vec<f64>, SyncError> {
        self.broadcast(stage, row, Payload::Floats, |payload| match payload {
            Payload::Floats(row) => Some(row),
            Payload::Ints(_) => None,
        })
    }
}
