use crate::tree::ids::NodeId;

/// Slotted storage for tree nodes. Allocation reuses freed slots so node ids
/// stay dense even when branches are evicted from the transposition table.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a new item and return its id, reusing a freed slot if available.
    pub fn insert(&mut self, item: T) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(item);
                NodeId::from(index)
            }
            None => {
                let id = NodeId::from(self.slots.len());
                self.slots.push(Some(item));
                id
            }
        }
    }

    /// Retrieve an item from the arena.
    pub fn get(&self, node_id: NodeId) -> Option<&T> {
        self.slots.get(node_id.index()).and_then(|slot| slot.as_ref())
    }

    /// Retrieve an item from the arena as a mutable borrow.
    pub fn get_mut(&mut self, node_id: NodeId) -> Option<&mut T> {
        self.slots
            .get_mut(node_id.index())
            .and_then(|slot| slot.as_mut())
    }

    /// Free a slot and return its item.
    pub fn remove(&mut self, node_id: NodeId) -> Option<T> {
        let item = self.slots.get_mut(node_id.index()).and_then(Option::take);
        if item.is_some() {
            self.free.push(node_id.index());
        }
        item
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Iterate over live items with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (NodeId::from(index), item)))
    }
}
