mod board;
mod error;

pub use board::{DotsAndBoxes, MAX_EDGES};
pub use error::BoxesError;
