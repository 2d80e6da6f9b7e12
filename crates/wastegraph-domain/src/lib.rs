//! WasteGraph Domain Layer
//!
//! Core model and algorithms for a waste-collection road network. The crate
//! performs no I/O: storage is reached through the traits in [`traits`],
//! implemented by infrastructure crates (wastegraph-store).
//!
//! ## Key Concepts
//!
//! - **Node**: a collection point with a position and a capacity
//! - **Edge**: an undirected road, persisted as two directed records
//! - **Constraint**: a time-bounded cost penalty on a node pair
//! - **Effective cost**: base weight plus the constraint total, or a
//!   transient override for a single path query
//!
//! ## Algorithms
//!
//! - [`assemble`]: builds the in-memory [`Graph`] from store rows
//! - [`shortest_path`]: constraint-aware Dijkstra
//! - [`greedy_coloring`]: greedy coloring over a fixed palette
//! - [`remove_node_preserving_paths`]: smart deletion with shortcut edges

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod coloring;
pub mod constraint;
pub mod edge;
pub mod error;
pub mod graph;
pub mod history;
pub mod node;
pub mod path;
pub mod topology;
pub mod traits;

// Re-exports for convenience
pub use assembler::assemble;
pub use coloring::{greedy_coloring, Coloring, PALETTE_SIZE};
pub use constraint::{Constraint, NewConstraint};
pub use edge::{edge_key, AdjacentEdge, Edge};
pub use error::GraphError;
pub use graph::{Adjacency, Graph, GraphDocument};
pub use history::{ConstraintOverrides, NewPathRecord, PathHistory};
pub use node::Node;
pub use path::{shortest_path, validate_overrides, ShortestPath};
pub use topology::{remove_node_preserving_paths, SmartDeletion};
