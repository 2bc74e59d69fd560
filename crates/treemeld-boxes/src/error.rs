use thiserror::Error;

/// Error type for board construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoxesError {
    #[error("board must have at least one box, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },

    #[error("{width}x{height} board needs {edges} edges, more than the {max} supported")]
    TooManyEdges {
        width: usize,
        height: usize,
        edges: usize,
        max: usize,
    },
}
