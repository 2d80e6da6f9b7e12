//! Path history - snapshots of completed shortest-path calculations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transient constraint overrides keyed by `"<source>-<target>"`
///
/// Each value replaces the stored constraint of that directed edge for a
/// single path query.
pub type ConstraintOverrides = BTreeMap<String, f64>;

/// A recorded path calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathHistory {
    /// Store-assigned identifier
    pub id: i64,

    /// Start node
    pub source: String,

    /// End node
    pub destination: String,

    /// Node ids from source to destination inclusive
    pub path: Vec<String>,

    /// Total effective cost of `path`
    pub distance: f64,

    /// Overrides in effect when the path was computed
    pub constraints_snapshot: ConstraintOverrides,

    /// Free-text note
    pub user_notes: Option<String>,

    /// Calculation instant (Unix seconds)
    pub calculated_at: u64,
}

/// A calculation about to be appended to the history log
#[derive(Debug, Clone, PartialEq)]
pub struct NewPathRecord {
    /// Start node
    pub source: String,

    /// End node
    pub destination: String,

    /// Node ids from source to destination inclusive
    pub path: Vec<String>,

    /// Total effective cost of `path`
    pub distance: f64,

    /// Overrides in effect
    pub constraints_snapshot: ConstraintOverrides,

    /// Free-text note
    pub user_notes: Option<String>,

    /// Calculation instant (Unix seconds)
    pub calculated_at: u64,
}
