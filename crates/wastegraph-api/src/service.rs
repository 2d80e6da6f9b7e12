//! Graph service
//!
//! Orchestrates store access and the pure algorithms: every request locks
//! the store, assembles what it needs and runs to completion under the lock.
//! Path queries write their result to the history log on the way out.

use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};
use wastegraph_domain::traits::{ConstraintQuery, GraphStore};
use wastegraph_domain::{
    greedy_coloring, shortest_path, validate_overrides, Coloring, Constraint,
    ConstraintOverrides, Edge, GraphDocument, GraphError, NewConstraint, NewPathRecord, Node,
    PathHistory, ShortestPath, SmartDeletion,
};
use wastegraph_store::StoreError;

/// Errors surfaced by the service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Persistence failure or rejected write
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Path endpoint absent from the graph
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Request parameters rejected before touching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A previous holder of the store lock panicked
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Parameters of a shortest-path request
#[derive(Debug, Clone)]
pub struct PathQuery {
    /// Start node
    pub source: String,
    /// End node
    pub destination: String,
    /// Directed edge key → constraint replacing the stored one for this call
    pub overrides: ConstraintOverrides,
    /// Append a successful result to the history log
    pub save_to_history: bool,
    /// Note stored with the history record
    pub user_notes: Option<String>,
}

impl PathQuery {
    /// Query without overrides that is saved to history
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            overrides: ConstraintOverrides::new(),
            save_to_history: true,
            user_notes: None,
        }
    }
}

/// Result of a shortest-path request
#[derive(Debug, Clone)]
pub struct PathOutcome {
    /// The query as executed
    pub query: PathQuery,
    /// Path and distance
    pub result: ShortestPath,
    /// Id of the history record, when one was written
    pub history_id: Option<i64>,
}

/// Result of replaying a history record
#[derive(Debug, Clone)]
pub struct Replay {
    /// Fresh computation against the current graph
    pub outcome: PathOutcome,
    /// The record being replayed
    pub original: PathHistory,
}

/// Counts reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSize {
    /// Number of nodes
    pub nodes: usize,
    /// Number of undirected edges
    pub edges: usize,
}

/// Current time as Unix seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Store-backed graph operations shared by all request handlers
pub struct GraphService<S> {
    store: Mutex<S>,
    history_limit: usize,
}

impl<S> GraphService<S>
where
    S: GraphStore<Error = StoreError>,
{
    /// Wrap a store; `history_limit` is the default page size of the history log
    pub fn new(store: S, history_limit: usize) -> Self {
        Self {
            store: Mutex::new(store),
            history_limit,
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, S>, ServiceError> {
        self.store.lock().map_err(|_| ServiceError::LockPoisoned)
    }

    /// Node and edge counts of the current graph
    pub fn size(&self) -> Result<GraphSize, ServiceError> {
        let graph = self.store()?.load_graph(current_timestamp())?;
        Ok(GraphSize {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        })
    }

    /// The assembled graph in its external representation
    pub fn graph(&self) -> Result<GraphDocument, ServiceError> {
        let graph = self.store()?.load_graph(current_timestamp())?;
        Ok(graph.to_document())
    }

    /// Remove every node, edge and constraint
    pub fn clear_graph(&self) -> Result<(), ServiceError> {
        self.store()?.clear_graph()?;
        info!("graph cleared");
        Ok(())
    }

    /// Create a node
    pub fn create_node(&self, node: Node) -> Result<Node, ServiceError> {
        let node = self.store()?.insert_node(node)?;
        info!(node = %node.id, "node created");
        Ok(node)
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Result<Node, ServiceError> {
        self.store()?
            .get_node(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Node '{}'", id)))
    }

    /// Delete a node and its incident edges without repair
    pub fn delete_node(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store()?.delete_node(id)? {
            return Err(ServiceError::NotFound(format!("Node '{}'", id)));
        }
        info!(node = %id, "node deleted");
        Ok(())
    }

    /// Delete a node after inserting shortcut edges between its neighbors
    pub fn smart_delete_node(&self, id: &str) -> Result<SmartDeletion, ServiceError> {
        let report = self
            .store()?
            .smart_delete_node(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Node '{}'", id)))?;
        info!(
            node = %id,
            created = report.shortcuts_created,
            updated = report.shortcuts_updated,
            "node smart-deleted"
        );
        Ok(report)
    }

    /// Create or overwrite a symmetric edge
    pub fn upsert_edge(&self, edge: Edge) -> Result<Edge, ServiceError> {
        let edge = self.store()?.upsert_edge(edge)?;
        info!(source = %edge.source, target = %edge.target, weight = edge.weight, "edge saved");
        Ok(edge)
    }

    /// Delete both directions of an edge
    pub fn delete_edge(&self, source: &str, target: &str) -> Result<(), ServiceError> {
        if !self.store()?.delete_edge(source, target)? {
            return Err(ServiceError::NotFound(format!("Edge {}-{}", source, target)));
        }
        info!(%source, %target, "edge deleted");
        Ok(())
    }

    /// Set the baseline constraint stored on both directions of an edge
    pub fn set_edge_constraint(
        &self,
        source: &str,
        target: &str,
        value: f64,
    ) -> Result<(), ServiceError> {
        if !self.store()?.set_edge_constraint(source, target, value)? {
            return Err(ServiceError::NotFound(format!("Edge {}-{}", source, target)));
        }
        info!(%source, %target, value, "edge constraint set");
        Ok(())
    }

    /// Constraints valid now, newest first
    pub fn valid_constraints(&self) -> Result<Vec<Constraint>, ServiceError> {
        let now = current_timestamp();
        Ok(self.store()?.list_constraints(&ConstraintQuery::valid_at(now))?)
    }

    /// Every constraint, newest first
    pub fn all_constraints(&self) -> Result<Vec<Constraint>, ServiceError> {
        Ok(self.store()?.list_constraints(&ConstraintQuery::all())?)
    }

    /// Create a constraint starting now
    pub fn create_constraint(&self, constraint: NewConstraint) -> Result<Constraint, ServiceError> {
        let created = self
            .store()?
            .insert_constraint(constraint, current_timestamp())?;
        info!(
            id = created.id,
            source = %created.source,
            target = %created.target,
            value = created.constraint_value,
            "constraint created"
        );
        Ok(created)
    }

    /// Set a constraint's active flag
    pub fn set_constraint_active(&self, id: i64, active: bool) -> Result<(), ServiceError> {
        if !self.store()?.set_constraint_active(id, active)? {
            return Err(ServiceError::NotFound(format!("Constraint {}", id)));
        }
        info!(id, active, "constraint toggled");
        Ok(())
    }

    /// Valid constraints on the pair `{source, target}` and their sum
    pub fn edge_constraints(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(f64, Vec<Constraint>), ServiceError> {
        let query = ConstraintQuery::valid_at(current_timestamp()).for_pair(source, target);
        let constraints = self.store()?.list_constraints(&query)?;
        let total = constraints.iter().map(|c| c.constraint_value).sum();
        Ok((total, constraints))
    }

    /// Run the constraint-aware shortest-path search
    ///
    /// A failure to write the history record is logged and otherwise ignored.
    pub fn find_shortest_path(&self, query: PathQuery) -> Result<PathOutcome, ServiceError> {
        validate_overrides(&query.overrides).map_err(ServiceError::InvalidInput)?;

        let now = current_timestamp();
        let mut store = self.store()?;
        let graph = store.load_graph(now)?;
        let result = shortest_path(
            &graph.adjacency(),
            &query.source,
            &query.destination,
            &query.overrides,
        )?;

        debug!(
            source = %query.source,
            destination = %query.destination,
            hops = result.path.len(),
            distance = result.distance,
            "shortest path computed"
        );

        let history_id = if query.save_to_history && result.is_reachable() {
            let record = NewPathRecord {
                source: query.source.clone(),
                destination: query.destination.clone(),
                path: result.path.clone(),
                distance: result.distance,
                constraints_snapshot: query.overrides.clone(),
                user_notes: query.user_notes.clone(),
                calculated_at: now,
            };
            match store.record_path(record) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "could not save path to history");
                    None
                }
            }
        } else {
            None
        };

        Ok(PathOutcome {
            query,
            result,
            history_id,
        })
    }

    /// Most recent history records; `limit` defaults to the configured page size
    pub fn path_history(&self, limit: Option<usize>) -> Result<Vec<PathHistory>, ServiceError> {
        let limit = limit.unwrap_or(self.history_limit);
        Ok(self.store()?.path_history(limit)?)
    }

    /// Recompute a recorded path with its snapshotted overrides
    ///
    /// The replay itself is not written to history.
    pub fn replay(&self, id: i64) -> Result<Replay, ServiceError> {
        let original = self
            .store()?
            .get_path_record(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("History record {}", id)))?;

        let query = PathQuery {
            source: original.source.clone(),
            destination: original.destination.clone(),
            overrides: original.constraints_snapshot.clone(),
            save_to_history: false,
            user_notes: Some(format!("Replay of calculation #{}", id)),
        };
        let outcome = self.find_shortest_path(query)?;

        Ok(Replay { outcome, original })
    }

    /// Greedy coloring of the current graph
    pub fn color_graph(&self) -> Result<Coloring, ServiceError> {
        let graph = self.store()?.load_graph(current_timestamp())?;
        let coloring = greedy_coloring(&graph.adjacency());

        let uncolored = graph.node_count() - coloring.assignment.len();
        if uncolored > 0 {
            warn!(uncolored, "palette exhausted; some nodes left uncolored");
        }
        Ok(coloring)
    }
}
