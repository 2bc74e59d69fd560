mod arena;
pub mod error;
pub mod ids;
pub mod links;
pub mod node;
pub mod search_tree;

#[cfg(test)]
mod tests;
