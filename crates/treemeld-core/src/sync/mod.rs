//! Cross-worker statistics exchange.
//!
//! Workers periodically pause at a shared round-root, flatten the top three
//! levels of their local statistics into fixed combinatorial layouts, average
//! them through rank 0, and rebuild the levels from the group result. The
//! wire format carries no states or keys; both sides derive every array
//! position from the round-root's action count alone.

pub mod combinatorics;
pub mod encode;
pub mod reduce;
pub mod round;
pub mod transport;

#[cfg(test)]
mod tests;
