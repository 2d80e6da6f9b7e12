//! Edge module - road segments between collection points

use serde::{Deserialize, Serialize};

/// Build the directional key used for transient constraint overrides
///
/// # Examples
///
/// ```
/// use wastegraph_domain::edge_key;
///
/// assert_eq!(edge_key("DEPOT", "A"), "DEPOT-A");
/// ```
pub fn edge_key(source: &str, target: &str) -> String {
    format!("{}-{}", source, target)
}

/// One direction of a road segment
///
/// The network is undirected: every road is persisted as two `Edge` records
/// (A→B and B→A) carrying the same weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Origin node id
    pub source: String,

    /// Destination node id
    pub target: String,

    /// Base travel cost (non-negative)
    pub weight: f64,

    /// Always-applied constraint stored with the edge
    #[serde(default)]
    pub constraint_value: f64,
}

impl Edge {
    /// Create an edge with no baseline constraint
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            constraint_value: 0.0,
        }
    }

    /// Set the baseline constraint
    pub fn with_constraint(mut self, constraint_value: f64) -> Self {
        self.constraint_value = constraint_value;
        self
    }

    /// The opposite direction of this edge
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            weight: self.weight,
            constraint_value: self.constraint_value,
        }
    }

    /// Override key for this direction
    pub fn key(&self) -> String {
        edge_key(&self.source, &self.target)
    }

    /// Total cost, with `custom` replacing the stored constraint when given
    pub fn total_cost(&self, custom: Option<f64>) -> f64 {
        self.weight + custom.unwrap_or(self.constraint_value)
    }

    /// Check field invariants before the edge is persisted
    ///
    /// # Errors
    /// Returns a description of the first violated invariant
    pub fn validate(&self) -> Result<(), String> {
        if self.source.is_empty() || self.target.is_empty() {
            return Err("Edge endpoints cannot be empty".to_string());
        }
        if self.source == self.target {
            return Err(format!("Edge cannot connect '{}' to itself", self.source));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(format!(
                "Edge weight must be a non-negative number, got {}",
                self.weight
            ));
        }
        if !self.constraint_value.is_finite() || self.constraint_value < 0.0 {
            return Err(format!(
                "Edge constraint must be a non-negative number, got {}",
                self.constraint_value
            ));
        }
        Ok(())
    }
}

/// An adjacency-list entry: `(neighbor, base_weight, constraint)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacentEdge {
    /// Neighbor reached through this edge
    pub neighbor: String,

    /// Base weight of the edge
    pub weight: f64,

    /// Constraint total applied on top of the base weight
    pub constraint: f64,
}

impl AdjacentEdge {
    /// Create an adjacency entry
    pub fn new(neighbor: impl Into<String>, weight: f64, constraint: f64) -> Self {
        Self {
            neighbor: neighbor.into(),
            weight,
            constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost_uses_stored_constraint() {
        let edge = Edge::new("A", "B", 2.0).with_constraint(1.5);
        assert_eq!(edge.total_cost(None), 3.5);
    }

    #[test]
    fn test_custom_constraint_replaces_stored_one() {
        let edge = Edge::new("A", "B", 2.0).with_constraint(1.5);
        assert_eq!(edge.total_cost(Some(10.0)), 12.0);
        assert_eq!(edge.total_cost(Some(0.0)), 2.0);
    }

    #[test]
    fn test_reversed_keeps_weight() {
        let edge = Edge::new("A", "B", 2.0).with_constraint(0.5);
        let rev = edge.reversed();
        assert_eq!(rev.source, "B");
        assert_eq!(rev.target, "A");
        assert_eq!(rev.weight, 2.0);
        assert_eq!(rev.constraint_value, 0.5);
        assert_eq!(rev.key(), "B-A");
    }

    #[test]
    fn test_validation() {
        assert!(Edge::new("A", "B", 0.0).validate().is_ok());
        assert!(Edge::new("A", "A", 1.0).validate().is_err());
        assert!(Edge::new("A", "B", -1.0).validate().is_err());
        assert!(Edge::new("A", "B", f64::NAN).validate().is_err());
        assert!(Edge::new("A", "B", 1.0).with_constraint(-2.0).validate().is_err());
    }
}
