//! WasteGraph Storage Layer
//!
//! Implements the GraphStore trait on top of SQLite.
//!
//! # Architecture
//!
//! - `nodes`, `edges`, `constraints` and `path_history` tables (see `schema.sql`)
//! - Every undirected road is two directed `edges` rows, written together
//! - Foreign keys cascade node deletion to edges and constraints
//! - Multi-statement writes run inside a single transaction
//!
//! # Examples
//!
//! ```no_run
//! use wastegraph_store::SqliteStore;
//!
//! let store = SqliteStore::new("wastegraph.db").unwrap();
//! // Store is now ready for graph operations
//! ```

#![warn(missing_docs)]

mod editor;

use editor::ConnectionEditor;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use wastegraph_domain::traits::{ConstraintQuery, GraphStore};
use wastegraph_domain::{
    remove_node_preserving_paths, Constraint, ConstraintOverrides, Edge, NewConstraint,
    NewPathRecord, Node, PathHistory, SmartDeletion,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON column could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity fields violate an invariant
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Edge or constraint references a node that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Node id already taken
    #[error("Node already exists: {0}")]
    Duplicate(String),
}

/// SQLite-based implementation of GraphStore
///
/// The store owns its connection; open it once at startup and drop it at
/// shutdown.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between threads
/// behind a `Mutex`, which also serializes every mutation.
pub struct SqliteStore {
    conn: Connection,
}

const NODE_COLUMNS: &str = "id, x, y, capacity";
const EDGE_COLUMNS: &str = "source, target, weight, constraint_value";
const CONSTRAINT_COLUMNS: &str =
    "id, source, target, constraint_value, is_active, reason, created_at, expiry_days, expires_at";
const HISTORY_COLUMNS: &str =
    "id, source, destination, path, distance, constraints_snapshot, user_notes, calculated_at";

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wastegraph_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("wastegraph.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a fresh in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        // Cascading deletes depend on this pragma, which is per-connection
        self.conn.pragma_update(None, "foreign_keys", "ON")?;

        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;

        Ok(())
    }

    fn node_exists(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
        Ok(conn
            .query_row("SELECT 1 FROM nodes WHERE id = ?1", params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false))
    }

    fn require_nodes(conn: &Connection, a: &str, b: &str) -> Result<(), StoreError> {
        for id in [a, b] {
            if !Self::node_exists(conn, id)? {
                return Err(StoreError::InvalidReference(format!(
                    "Node '{}' does not exist",
                    id
                )));
            }
        }
        Ok(())
    }

    fn row_to_node(row: &Row<'_>) -> rusqlite::Result<Node> {
        Ok(Node {
            id: row.get(0)?,
            x: row.get(1)?,
            y: row.get(2)?,
            capacity: row.get(3)?,
        })
    }

    fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<Edge> {
        Ok(Edge {
            source: row.get(0)?,
            target: row.get(1)?,
            weight: row.get(2)?,
            constraint_value: row.get(3)?,
        })
    }

    fn row_to_constraint(row: &Row<'_>) -> rusqlite::Result<Constraint> {
        let expires_at: Option<i64> = row.get(8)?;
        Ok(Constraint {
            id: row.get(0)?,
            source: row.get(1)?,
            target: row.get(2)?,
            constraint_value: row.get(3)?,
            is_active: row.get(4)?,
            reason: row.get(5)?,
            created_at: row.get::<_, i64>(6)? as u64,
            expiry_days: row.get(7)?,
            expires_at: expires_at.map(|t| t as u64),
        })
    }

    fn row_to_history(row: &Row<'_>) -> rusqlite::Result<PathHistory> {
        let path_json: String = row.get(3)?;
        let path: Vec<String> = serde_json::from_str(&path_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        let snapshot_json: String = row.get(5)?;
        let constraints_snapshot: ConstraintOverrides = serde_json::from_str(&snapshot_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(PathHistory {
            id: row.get(0)?,
            source: row.get(1)?,
            destination: row.get(2)?,
            path,
            distance: row.get(4)?,
            constraints_snapshot,
            user_notes: row.get(6)?,
            calculated_at: row.get::<_, i64>(7)? as u64,
        })
    }

    fn get_edge(&self, source: &str, target: &str) -> Result<Option<Edge>, StoreError> {
        let sql = format!(
            "SELECT {} FROM edges WHERE source = ?1 AND target = ?2",
            EDGE_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![source, target], Self::row_to_edge)
            .optional()?)
    }
}

impl GraphStore for SqliteStore {
    type Error = StoreError;

    fn insert_node(&mut self, node: Node) -> Result<Node, Self::Error> {
        node.validate().map_err(StoreError::InvalidInput)?;

        if Self::node_exists(&self.conn, &node.id)? {
            return Err(StoreError::Duplicate(node.id));
        }

        self.conn.execute(
            "INSERT INTO nodes (id, x, y, capacity) VALUES (?1, ?2, ?3, ?4)",
            params![&node.id, node.x, node.y, node.capacity],
        )?;

        Ok(node)
    }

    fn get_node(&self, id: &str) -> Result<Option<Node>, Self::Error> {
        let sql = format!("SELECT {} FROM nodes WHERE id = ?1", NODE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::row_to_node)
            .optional()?)
    }

    fn list_nodes(&self) -> Result<Vec<Node>, Self::Error> {
        let sql = format!("SELECT {} FROM nodes ORDER BY id", NODE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let nodes = stmt
            .query_map([], Self::row_to_node)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn delete_node(&mut self, id: &str) -> Result<bool, Self::Error> {
        let deleted = self
            .conn
            .execute("DELETE FROM nodes WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn smart_delete_node(&mut self, id: &str) -> Result<Option<SmartDeletion>, Self::Error> {
        // Dropping the transaction on an early return rolls every shortcut back
        let tx = self.conn.transaction()?;
        let report = {
            let mut editor = ConnectionEditor::new(&tx);
            remove_node_preserving_paths(&mut editor, id)?
        };
        tx.commit()?;

        if let Some(report) = &report {
            debug!(
                node = %report.deleted_node,
                created = report.shortcuts_created,
                updated = report.shortcuts_updated,
                "smart deletion committed"
            );
        }
        Ok(report)
    }

    fn upsert_edge(&mut self, edge: Edge) -> Result<Edge, Self::Error> {
        edge.validate().map_err(StoreError::InvalidInput)?;

        let tx = self.conn.transaction()?;
        Self::require_nodes(&tx, &edge.source, &edge.target)?;

        for (source, target) in [(&edge.source, &edge.target), (&edge.target, &edge.source)] {
            tx.execute(
                "INSERT INTO edges (source, target, weight, constraint_value)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(source, target) DO UPDATE SET weight = excluded.weight",
                params![source, target, edge.weight, edge.constraint_value],
            )?;
        }
        tx.commit()?;

        self.get_edge(&edge.source, &edge.target)?.ok_or_else(|| {
            StoreError::InvalidReference(format!(
                "Edge {}-{} vanished after write",
                edge.source, edge.target
            ))
        })
    }

    fn list_edges(&self) -> Result<Vec<Edge>, Self::Error> {
        let sql = format!("SELECT {} FROM edges ORDER BY source, target", EDGE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let edges = stmt
            .query_map([], Self::row_to_edge)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn delete_edge(&mut self, source: &str, target: &str) -> Result<bool, Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM edges
             WHERE (source = ?1 AND target = ?2) OR (source = ?2 AND target = ?1)",
            params![source, target],
        )?;
        Ok(deleted > 0)
    }

    fn set_edge_constraint(
        &mut self,
        source: &str,
        target: &str,
        value: f64,
    ) -> Result<bool, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(StoreError::InvalidInput(format!(
                "Edge constraint must be a non-negative number, got {}",
                value
            )));
        }
        let updated = self.conn.execute(
            "UPDATE edges SET constraint_value = ?3
             WHERE (source = ?1 AND target = ?2) OR (source = ?2 AND target = ?1)",
            params![source, target, value],
        )?;
        Ok(updated > 0)
    }

    fn insert_constraint(
        &mut self,
        constraint: NewConstraint,
        now: u64,
    ) -> Result<Constraint, Self::Error> {
        constraint.validate().map_err(StoreError::InvalidInput)?;
        Self::require_nodes(&self.conn, &constraint.source, &constraint.target)?;

        let pending = constraint.into_constraint(0, now);
        self.conn.execute(
            "INSERT INTO constraints
             (source, target, constraint_value, is_active, reason, created_at, expiry_days, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &pending.source,
                &pending.target,
                pending.constraint_value,
                pending.is_active,
                &pending.reason,
                pending.created_at as i64,
                pending.expiry_days,
                pending.expires_at.map(|t| t as i64),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Constraint { id, ..pending })
    }

    fn list_constraints(&self, query: &ConstraintQuery) -> Result<Vec<Constraint>, Self::Error> {
        let mut sql = format!("SELECT {} FROM constraints WHERE 1=1", CONSTRAINT_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(now) = query.valid_at {
            sql.push_str(" AND is_active = 1 AND (expires_at IS NULL OR expires_at > ?)");
            params.push(Box::new(now as i64));
        }

        if let Some((a, b)) = &query.pair {
            sql.push_str(" AND ((source = ? AND target = ?) OR (source = ? AND target = ?))");
            params.push(Box::new(a.clone()));
            params.push(Box::new(b.clone()));
            params.push(Box::new(b.clone()));
            params.push(Box::new(a.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let constraints = stmt
            .query_map(&param_refs[..], Self::row_to_constraint)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(constraints)
    }

    fn set_constraint_active(&mut self, id: i64, active: bool) -> Result<bool, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE constraints SET is_active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(updated > 0)
    }

    fn record_path(&mut self, record: NewPathRecord) -> Result<i64, Self::Error> {
        let path = serde_json::to_string(&record.path)?;
        let snapshot = serde_json::to_string(&record.constraints_snapshot)?;

        self.conn.execute(
            "INSERT INTO path_history
             (source, destination, path, distance, constraints_snapshot, user_notes, calculated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &record.source,
                &record.destination,
                path,
                record.distance,
                snapshot,
                &record.user_notes,
                record.calculated_at as i64,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn path_history(&self, limit: usize) -> Result<Vec<PathHistory>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM path_history ORDER BY calculated_at DESC, id DESC LIMIT ?1",
            HISTORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let history = stmt
            .query_map(params![limit as i64], Self::row_to_history)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    fn get_path_record(&self, id: i64) -> Result<Option<PathHistory>, Self::Error> {
        let sql = format!("SELECT {} FROM path_history WHERE id = ?1", HISTORY_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], Self::row_to_history)
            .optional()?)
    }

    fn clear_graph(&mut self) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM constraints", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        tx.commit()?;
        Ok(())
    }
}
