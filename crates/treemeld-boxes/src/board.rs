use treemeld_core::{ActionId, Game, StateKey};

use crate::error::BoxesError;

/// Hard cap on board size: the position must fit one edge per bit of a u64.
pub const MAX_EDGES: usize = 64;

/// Dots and Boxes on a `width x height` grid of boxes.
///
/// The position is the set of drawn edges, packed into a u64 bitmask, so the
/// same position reached through different move orders carries the same key.
/// Closing a box scores a point for the mover, who then moves again.
///
/// Edges are numbered horizontals first, row by row from the top, then
/// verticals row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotsAndBoxes {
    width: usize,
    height: usize,
    edges: usize,
}

impl DotsAndBoxes {
    pub fn new(width: usize, height: usize) -> Result<Self, BoxesError> {
        if width == 0 || height == 0 {
            return Err(BoxesError::EmptyBoard { width, height });
        }
        let edges = width * (height + 1) + (width + 1) * height;
        if edges > MAX_EDGES {
            return Err(BoxesError::TooManyEdges {
                width,
                height,
                edges,
                max: MAX_EDGES,
            });
        }
        Ok(DotsAndBoxes {
            width,
            height,
            edges,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_edges(&self) -> usize {
        self.edges
    }

    fn horizontal(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    fn vertical(&self, row: usize, col: usize) -> usize {
        self.width * (self.height + 1) + row * (self.width + 1) + col
    }

    /// The four edges around box `(row, col)`.
    fn box_edges(&self, row: usize, col: usize) -> [usize; 4] {
        [
            self.horizontal(row, col),
            self.horizontal(row + 1, col),
            self.vertical(row, col),
            self.vertical(row, col + 1),
        ]
    }

    /// The one or two boxes an edge borders.
    fn adjacent_boxes(&self, edge: usize) -> [Option<(usize, usize)>; 2] {
        let horizontals = self.width * (self.height + 1);
        if edge < horizontals {
            let row = edge / self.width;
            let col = edge % self.width;
            [
                (row < self.height).then_some((row, col)),
                (row > 0).then(|| (row - 1, col)),
            ]
        } else {
            let index = edge - horizontals;
            let row = index / (self.width + 1);
            let col = index % (self.width + 1);
            [
                (col < self.width).then_some((row, col)),
                (col > 0).then(|| (row, col - 1)),
            ]
        }
    }

    fn box_complete(&self, state: u64, row: usize, col: usize) -> bool {
        self.box_edges(row, col)
            .iter()
            .all(|&edge| state & (1 << edge) != 0)
    }

    /// How many boxes drawing `edge` would close. The edge is not yet drawn,
    /// so any box it borders cannot already be complete.
    fn closes(&self, state: u64, edge: usize) -> u32 {
        let after = state | (1 << edge);
        self.adjacent_boxes(edge)
            .into_iter()
            .flatten()
            .filter(|&(row, col)| self.box_complete(after, row, col))
            .count() as u32
    }

    /// Total boxes closed in a position.
    pub fn completed_boxes(&self, state: u64) -> usize {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| (row, col)))
            .filter(|&(row, col)| self.box_complete(state, row, col))
            .count()
    }
}

impl Game for DotsAndBoxes {
    type State = u64;

    fn initial_state(&self) -> u64 {
        0
    }

    fn legal_actions(&self, state: &u64) -> Vec<ActionId> {
        (0..self.edges)
            .filter(|&edge| state & (1 << edge) == 0)
            .map(ActionId::from)
            .collect()
    }

    fn apply(&self, state: &u64, action: ActionId) -> u64 {
        state | (1 << action.index())
    }

    fn canonical_key(&self, state: &u64) -> StateKey {
        StateKey::from(*state)
    }

    fn score_delta(&self, state: &u64, action: ActionId) -> u32 {
        self.closes(*state, action.index())
    }

    fn is_terminal(&self, state: &u64) -> bool {
        state.count_ones() as usize == self.edges
    }
}
