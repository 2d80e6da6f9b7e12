//! Trait definitions for external interactions
//!
//! These traits define the boundary between the graph model and storage.
//! Infrastructure implementations live in other crates (wastegraph-store).

use crate::{
    assemble, Constraint, Edge, Graph, NewConstraint, NewPathRecord, Node, PathHistory,
    SmartDeletion,
};

/// Row-level access to the persisted road network
pub trait GraphStore {
    /// Error type for store operations
    type Error;

    /// Insert a new node
    fn insert_node(&mut self, node: Node) -> Result<Node, Self::Error>;

    /// Get a node by id
    fn get_node(&self, id: &str) -> Result<Option<Node>, Self::Error>;

    /// All nodes, ordered by id
    fn list_nodes(&self) -> Result<Vec<Node>, Self::Error>;

    /// Delete a node and its incident edges; `false` if it did not exist
    fn delete_node(&mut self, id: &str) -> Result<bool, Self::Error>;

    /// Delete a node after inserting shortcut edges between its neighbors
    ///
    /// Returns `None` if the node did not exist. Implementations must apply
    /// the whole operation atomically.
    fn smart_delete_node(&mut self, id: &str) -> Result<Option<SmartDeletion>, Self::Error>;

    /// Create or overwrite the symmetric edge `source`–`target`
    fn upsert_edge(&mut self, edge: Edge) -> Result<Edge, Self::Error>;

    /// Every directed edge row, ordered by (source, target)
    fn list_edges(&self) -> Result<Vec<Edge>, Self::Error>;

    /// Delete both directions of an edge; `false` if none existed
    fn delete_edge(&mut self, source: &str, target: &str) -> Result<bool, Self::Error>;

    /// Set the baseline constraint of both directions; `false` if no edge
    fn set_edge_constraint(
        &mut self,
        source: &str,
        target: &str,
        value: f64,
    ) -> Result<bool, Self::Error>;

    /// Create a constraint as of `now`
    fn insert_constraint(
        &mut self,
        constraint: NewConstraint,
        now: u64,
    ) -> Result<Constraint, Self::Error>;

    /// Constraints matching a query, newest first
    fn list_constraints(&self, query: &ConstraintQuery) -> Result<Vec<Constraint>, Self::Error>;

    /// Toggle a constraint's active flag; `false` if it did not exist
    fn set_constraint_active(&mut self, id: i64, active: bool) -> Result<bool, Self::Error>;

    /// Append a path calculation to the history log
    fn record_path(&mut self, record: NewPathRecord) -> Result<i64, Self::Error>;

    /// Most recent history records, newest first
    fn path_history(&self, limit: usize) -> Result<Vec<PathHistory>, Self::Error>;

    /// Get one history record
    fn get_path_record(&self, id: i64) -> Result<Option<PathHistory>, Self::Error>;

    /// Remove every node and edge
    fn clear_graph(&mut self) -> Result<(), Self::Error>;

    /// Assemble the in-memory graph with the constraints valid at `now`
    fn load_graph(&self, now: u64) -> Result<Graph, Self::Error> {
        let nodes = self.list_nodes()?;
        let edges = self.list_edges()?;
        let constraints = self.list_constraints(&ConstraintQuery::valid_at(now))?;
        Ok(assemble(nodes, edges, &constraints, now))
    }
}

/// Query criteria for retrieving constraints
#[derive(Debug, Clone, Default)]
pub struct ConstraintQuery {
    /// Only constraints valid at this instant
    pub valid_at: Option<u64>,

    /// Only constraints on this undirected pair
    pub pair: Option<(String, String)>,
}

impl ConstraintQuery {
    /// Every constraint, valid or not
    pub fn all() -> Self {
        Self::default()
    }

    /// Constraints valid at `now`
    pub fn valid_at(now: u64) -> Self {
        Self {
            valid_at: Some(now),
            ..Default::default()
        }
    }

    /// Restrict to the undirected pair `{a, b}`
    pub fn for_pair(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.pair = Some((a.into(), b.into()));
        self
    }
}

/// Local edits needed by smart node deletion
///
/// Implemented by a store inside a single transaction so a failure part-way
/// through leaves nothing behind.
pub trait TopologyEdit {
    /// Error type for edit operations
    type Error;

    /// Whether the node exists
    fn node_exists(&self, id: &str) -> Result<bool, Self::Error>;

    /// Neighbors of a node with the raw base weight of each outgoing edge
    fn neighbor_weights(&self, id: &str) -> Result<Vec<(String, f64)>, Self::Error>;

    /// Base weight of the directed edge `source`→`target`, if any
    fn edge_weight(&self, source: &str, target: &str) -> Result<Option<f64>, Self::Error>;

    /// Overwrite the weight of both directions of an existing edge
    fn set_edge_weight(&mut self, a: &str, b: &str, weight: f64) -> Result<(), Self::Error>;

    /// Insert a new symmetric edge
    fn insert_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<(), Self::Error>;

    /// Delete a node together with its incident edges
    fn remove_node(&mut self, id: &str) -> Result<bool, Self::Error>;
}
