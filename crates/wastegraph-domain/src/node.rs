//! Node module - collection points of the road network

use serde::{Deserialize, Serialize};

/// A collection point (depot, bin cluster, junction)
///
/// Nodes are immutable once created; they are only inserted or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: String,

    /// Horizontal position
    #[serde(default)]
    pub x: f64,

    /// Vertical position
    #[serde(default)]
    pub y: f64,

    /// Collection capacity (non-negative)
    #[serde(default)]
    pub capacity: f64,
}

impl Node {
    /// Create a new node
    pub fn new(id: impl Into<String>, x: f64, y: f64, capacity: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            capacity,
        }
    }

    /// Check field invariants before the node is persisted
    ///
    /// # Errors
    /// Returns a description of the first violated invariant
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Node id cannot be empty".to_string());
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(format!("Node '{}' has a non-finite position", self.id));
        }
        if !self.capacity.is_finite() || self.capacity < 0.0 {
            return Err(format!(
                "Node '{}' capacity must be a non-negative number, got {}",
                self.id, self.capacity
            ));
        }
        Ok(())
    }
}
