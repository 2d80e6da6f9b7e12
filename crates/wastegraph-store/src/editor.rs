//! Transaction-scoped topology edits for smart node deletion

use crate::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use wastegraph_domain::traits::TopologyEdit;

/// Applies topology edits through a borrowed connection
///
/// Callers hand in an open transaction; nothing is committed here.
pub(crate) struct ConnectionEditor<'c> {
    conn: &'c Connection,
}

impl<'c> ConnectionEditor<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TopologyEdit for ConnectionEditor<'_> {
    type Error = StoreError;

    fn node_exists(&self, id: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM nodes WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn neighbor_weights(&self, id: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT target, weight FROM edges WHERE source = ?1 ORDER BY target")?;
        let neighbors = stmt
            .query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(neighbors)
    }

    fn edge_weight(&self, source: &str, target: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT weight FROM edges WHERE source = ?1 AND target = ?2",
                params![source, target],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_edge_weight(&mut self, a: &str, b: &str, weight: f64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE edges SET weight = ?3
             WHERE (source = ?1 AND target = ?2) OR (source = ?2 AND target = ?1)",
            params![a, b, weight],
        )?;
        Ok(())
    }

    fn insert_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<(), StoreError> {
        for (source, target) in [(a, b), (b, a)] {
            self.conn.execute(
                "INSERT INTO edges (source, target, weight, constraint_value)
                 VALUES (?1, ?2, ?3, 0)",
                params![source, target, weight],
            )?;
        }
        Ok(())
    }

    fn remove_node(&mut self, id: &str) -> Result<bool, StoreError> {
        // Incident edges and constraints go with it through ON DELETE CASCADE
        let deleted = self
            .conn
            .execute("DELETE FROM nodes WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
