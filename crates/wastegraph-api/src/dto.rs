//! Request and response bodies of the HTTP API.
//!
//! Domain instants are Unix seconds; they are rendered here as RFC 3339
//! strings. Infinite distances become `null`.

use crate::service::{GraphSize, PathOutcome, Replay};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wastegraph_domain::{Coloring, Constraint, ConstraintOverrides, PathHistory, SmartDeletion};

/// Render Unix seconds as an RFC 3339 timestamp
pub fn to_rfc3339(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn finite(distance: f64) -> Option<f64> {
    distance.is_finite().then_some(distance)
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What happened
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the store answers
    pub status: String,
    /// Node count
    pub nodes: usize,
    /// Undirected edge count
    pub edges: usize,
}

impl From<GraphSize> for HealthResponse {
    fn from(size: GraphSize) -> Self {
        Self {
            status: "healthy".to_string(),
            nodes: size.nodes,
            edges: size.edges,
        }
    }
}

/// Body of `PUT /edge/{source}/{target}/constraint`
#[derive(Debug, Deserialize)]
pub struct EdgeConstraintRequest {
    /// New baseline constraint
    pub constraint_value: f64,
}

/// Body of `PUT /constraints/{id}/toggle`
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// Desired state
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for ToggleRequest {
    fn default() -> Self {
        Self {
            is_active: default_active(),
        }
    }
}

/// A constraint with rendered timestamps and its validity right now
#[derive(Debug, Serialize, Deserialize)]
pub struct ConstraintView {
    /// Row id
    pub id: i64,
    /// One endpoint
    pub source: String,
    /// Other endpoint
    pub target: String,
    /// Added cost
    pub constraint_value: f64,
    /// Active flag
    pub is_active: bool,
    /// Reason given at creation
    pub reason: Option<String>,
    /// Creation instant
    pub created_at: String,
    /// Lifetime requested at creation
    pub expiry_days: Option<u32>,
    /// Expiry instant
    pub expires_at: Option<String>,
    /// Past its expiry instant
    pub is_expired: bool,
    /// Active and not expired
    pub is_valid: bool,
}

impl ConstraintView {
    /// Render `constraint` as seen at `now`
    pub fn at(constraint: Constraint, now: u64) -> Self {
        Self {
            is_expired: constraint.is_expired_at(now),
            is_valid: constraint.is_valid_at(now),
            id: constraint.id,
            source: constraint.source,
            target: constraint.target,
            constraint_value: constraint.constraint_value,
            is_active: constraint.is_active,
            reason: constraint.reason,
            created_at: to_rfc3339(constraint.created_at),
            expiry_days: constraint.expiry_days,
            expires_at: constraint.expires_at.map(to_rfc3339),
        }
    }
}

/// Valid constraints on one pair
#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeConstraintsResponse {
    /// First endpoint as requested
    pub source: String,
    /// Second endpoint as requested
    pub target: String,
    /// Sum of the valid constraint values
    pub total_constraint: f64,
    /// The constraints themselves, newest first
    pub constraints: Vec<ConstraintView>,
}

/// Query string of `GET /algo/dijkstra`
#[derive(Debug, Deserialize)]
pub struct DijkstraParams {
    /// Start node
    pub src: Option<String>,
    /// End node
    pub dst: Option<String>,
    /// JSON object of directed edge key → override value
    pub constraints: Option<String>,
    /// Save to history (default true)
    pub save: Option<bool>,
    /// Note stored with the history record
    pub notes: Option<String>,
}

/// Shortest-path result
#[derive(Debug, Serialize, Deserialize)]
pub struct PathResponse {
    /// Node ids from source to destination, empty when unreachable
    pub path: Vec<String>,
    /// Total cost, `null` when unreachable
    pub distance: Option<f64>,
    /// Start node
    pub source: String,
    /// End node
    pub destination: String,
    /// Overrides used for this call
    pub custom_constraints_applied: ConstraintOverrides,
    /// History record written for this call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<i64>,
}

impl From<PathOutcome> for PathResponse {
    fn from(outcome: PathOutcome) -> Self {
        Self {
            distance: finite(outcome.result.distance),
            path: outcome.result.path,
            source: outcome.query.source,
            destination: outcome.query.destination,
            custom_constraints_applied: outcome.query.overrides,
            history_id: outcome.history_id,
        }
    }
}

/// Query string of `GET /history/paths`
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Number of records
    pub limit: Option<usize>,
}

/// One history record
#[derive(Debug, Serialize, Deserialize)]
pub struct PathHistoryView {
    /// Row id
    pub id: i64,
    /// Start node
    pub source: String,
    /// End node
    pub destination: String,
    /// Resulting path
    pub path: Vec<String>,
    /// Resulting distance
    pub distance: Option<f64>,
    /// Overrides in effect
    pub constraints_snapshot: ConstraintOverrides,
    /// Note
    pub user_notes: Option<String>,
    /// When the path was computed
    pub calculated_at: String,
}

impl From<PathHistory> for PathHistoryView {
    fn from(record: PathHistory) -> Self {
        Self {
            id: record.id,
            source: record.source,
            destination: record.destination,
            path: record.path,
            distance: finite(record.distance),
            constraints_snapshot: record.constraints_snapshot,
            user_notes: record.user_notes,
            calculated_at: to_rfc3339(record.calculated_at),
        }
    }
}

/// Replay result: the new computation plus the original record
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplayResponse {
    /// Fresh computation
    #[serde(flatten)]
    pub result: PathResponse,
    /// Record being replayed
    pub original_calculation: PathHistoryView,
}

impl From<Replay> for ReplayResponse {
    fn from(replay: Replay) -> Self {
        Self {
            result: replay.outcome.into(),
            original_calculation: replay.original.into(),
        }
    }
}

/// Smart deletion report
#[derive(Debug, Serialize, Deserialize)]
pub struct SmartDeleteResponse {
    /// Removed node
    pub deleted_node: String,
    /// Shortcuts inserted
    pub shortcuts_created: usize,
    /// Existing edges shortened
    pub shortcuts_updated: usize,
    /// Created plus updated
    pub total_shortcuts: usize,
    /// Neighbors of the removed node
    pub neighbors_count: usize,
    /// Human-readable summary
    pub message: String,
}

impl From<SmartDeletion> for SmartDeleteResponse {
    fn from(report: SmartDeletion) -> Self {
        Self {
            total_shortcuts: report.total_shortcuts(),
            message: report.summary(),
            deleted_node: report.deleted_node,
            shortcuts_created: report.shortcuts_created,
            shortcuts_updated: report.shortcuts_updated,
            neighbors_count: report.neighbors_count,
        }
    }
}

/// Greedy coloring result
#[derive(Debug, Serialize, Deserialize)]
pub struct ColoringResponse {
    /// Node → color
    pub coloring: BTreeMap<String, usize>,
    /// Color → node count
    pub stats: BTreeMap<usize, usize>,
    /// Highest color used plus one
    pub chromatic_number: usize,
}

impl From<Coloring> for ColoringResponse {
    fn from(coloring: Coloring) -> Self {
        Self {
            stats: coloring.stats(),
            chromatic_number: coloring.chromatic_estimate(),
            coloring: coloring.assignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_rendering() {
        assert_eq!(to_rfc3339(0), "1970-01-01T00:00:00+00:00");
        assert_eq!(to_rfc3339(1_700_000_000), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_unreachable_distance_serializes_as_null() {
        let response = PathResponse {
            path: vec![],
            distance: finite(f64::INFINITY),
            source: "A".to_string(),
            destination: "B".to_string(),
            custom_constraints_applied: ConstraintOverrides::new(),
            history_id: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["distance"].is_null());
        assert!(json.get("history_id").is_none());
    }

    #[test]
    fn test_constraint_view_flags() {
        let constraint = wastegraph_domain::NewConstraint::new("A", "B", 2.0)
            .with_expiry_days(1)
            .into_constraint(7, 1_000);

        let fresh = ConstraintView::at(constraint.clone(), 1_000 + 60);
        assert!(fresh.is_valid);
        assert!(!fresh.is_expired);

        let stale = ConstraintView::at(constraint, 1_000 + 86_400);
        assert!(!stale.is_valid);
        assert!(stale.is_expired);
        assert_eq!(stale.expires_at.as_deref(), Some("1970-01-02T00:16:40+00:00"));
    }
}
