//! **graphmat** is a mutable labeled property-graph store backed by
//! sparse boolean matrices, in the style of GraphBLAS-based graph
//! engines: nodes are dense integer ids, edges are nonzero entries in
//! per-relation adjacency matrices, and node labels are diagonal entries
//! in per-label matrices.
//!
//! The store is deliberately narrow: it owns node storage, label
//! matrices, relation matrices, and an aggregate adjacency matrix, and
//! keeps them mutually consistent through insertion, labeling, edge
//! creation, edge deletion, and batch node deletion with id compaction.
//! Query languages, persistence, and property storage are host
//! concerns and live outside this crate.
//!
//! The primary type is [`Graph`].

mod block;
mod compact;
mod error;
mod graph;
mod guard;
mod matrix;
mod node_iter;
mod pool;

pub use block::{Node, NODEBLOCK_CAP};
pub use error::GraphError;
pub use graph::Graph;
pub use matrix::{BoolMatrix, RowMajorBoolMatrix};
pub use node_iter::NodeIter;

/// Dense, nonnegative node identifier. Not stable across [`Graph::delete_nodes`].
pub type NodeId = usize;

/// Index into the graph's relation matrices.
pub type RelationIndex = isize;

/// Index into the graph's label matrices.
pub type LabelIndex = isize;

/// Sentinel meaning "do not attach a label".
pub const NO_LABEL: LabelIndex = -1;

/// Sentinel meaning "untyped edge" / "every relation".
pub const NO_RELATION: RelationIndex = -1;

/// Initial capacity reserved for the relation-matrix handle array.
pub const GRAPH_DEFAULT_RELATION_CAP: usize = 4;

/// Initial capacity reserved for the label-matrix handle array.
pub const GRAPH_DEFAULT_LABEL_CAP: usize = 4;
