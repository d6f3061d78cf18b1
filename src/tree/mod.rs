//! Storage of the [UCT] search tree: an open-addressed table identifying
//! positions and an arena of [`Node`] records aligned with its slots.
//!
//! Nodes refer to their children by slot index rather than by reference, which
//! keeps the whole tree in two flat arrays that are allocated once and reused
//! between moves.
//!
//! [UCT]: https://www.chessprogramming.org/UCT

mod index;
mod node;
mod retention;
mod table;

pub use index::hash_to_index;
pub use node::{ChildRef, Node};
pub use table::{Entry, NodeTable};

/// Positional hash of a board, usually a Zobrist key maintained by the rules.
pub type Key = u64;

/// Index of a slot in [`NodeTable`] and of the corresponding [`Node`] in the
/// arena.
pub type NodeIndex = usize;

/// Slot of a child that has not been expanded into the table yet.
pub const NOT_EXPANDED: NodeIndex = usize::MAX;
