use std::fmt;

use crate::tree::ids::{ActionId, NodeId, StateKey};

/// Error type for tree construction, lookup, and merge operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Attempted to access a node id that does not exist in the arena.
    MissingNode { node_id: NodeId },
    /// Attempted to access an action link that does not exist for a node.
    MissingLink { node_id: NodeId, action: ActionId },
    /// Could not select an action from a node (no links).
    SelectionFailed { node_id: NodeId },
    /// Attempted to merge two trees whose roots describe different states.
    RootMismatch { ours: StateKey, theirs: StateKey },
    /// Attempted to re-link an action to a different child than it already has.
    ChildConflict { node_id: NodeId, action: ActionId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MissingNode { node_id } => {
                write!(f, "missing node with id {}", node_id.index())
            }
            TreeError::MissingLink { node_id, action } => write!(
                f,
                "missing link for action {} on node {}",
                action.index(),
                node_id.index()
            ),
            TreeError::SelectionFailed { node_id } => {
                write!(f, "failed to select an action on node {}", node_id.index())
            }
            TreeError::RootMismatch { ours, theirs } => write!(
                f,
                "cannot merge trees rooted at different states ({} vs {})",
                ours.value(),
                theirs.value()
            ),
            TreeError::ChildConflict { node_id, action } => write!(
                f,
                "action {} on node {} already links a different child",
                action.index(),
                node_id.index()
            ),
        }
    }
}

impl std::error::Error for TreeError {}
