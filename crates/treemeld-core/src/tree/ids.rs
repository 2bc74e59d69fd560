/// A wrapper for an integer index used to address nodes in the tree arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the raw index without exposing the internal value for mutation.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    /// Allow for explicit conversion from usize to NodeId
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}

/// Canonical transposition key for a game state.
/// The game collaborator owns the encoding; equality is by canonical form,
/// so symmetric states that canonicalize to the same key share one node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(u64);

impl StateKey {
    /// Return the internal numeric representation of this key.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StateKey {
    /// Allow for explicit conversion from u64 to StateKey.
    fn from(value: u64) -> Self {
        StateKey(value)
    }
}

/// A game-level action identifier, as enumerated by the game collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

impl ActionId {
    /// Get the raw action id.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    /// Allow for explicit conversion from usize to ActionId
    fn from(value: usize) -> Self {
        ActionId(value)
    }
}
