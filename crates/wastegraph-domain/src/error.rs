//! Error types for in-memory graph operations

use thiserror::Error;

/// Errors raised by the graph model and the algorithms running over it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A path endpoint is not part of the graph
    #[error("Unknown node: '{0}'")]
    UnknownNode(String),

    /// An edge references a node the graph does not contain
    #[error("Edge {from}-{to} references a missing node")]
    MissingEndpoint {
        /// Origin node id
        from: String,
        /// Destination node id
        to: String,
    },
}
