//! Graph assembly from persisted rows
//!
//! Folds the constraints valid at a given instant into each edge's
//! constraint component. Constraint lookup is symmetric: a constraint
//! recorded as (A, B) also applies to the B→A direction.

use crate::{Constraint, Edge, Graph, Node};
use std::collections::HashMap;

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Build an in-memory graph from store rows
///
/// Each directed edge ends up with a constraint equal to its stored baseline
/// plus the sum of the constraints valid at `now` for its node pair.
///
/// If several rows describe the same direction, the first one encountered is
/// kept and the rest are skipped. Rows whose endpoints are not among `nodes`
/// are skipped as well.
///
/// # Examples
///
/// ```
/// use wastegraph_domain::{assemble, Edge, Node};
///
/// let nodes = vec![Node::new("A", 0.0, 0.0, 0.0), Node::new("B", 1.0, 0.0, 0.0)];
/// let edges = vec![Edge::new("A", "B", 2.0), Edge::new("B", "A", 2.0)];
/// let graph = assemble(nodes, edges, &[], 0);
///
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub fn assemble<N, E>(nodes: N, edges: E, constraints: &[Constraint], now: u64) -> Graph
where
    N: IntoIterator<Item = Node>,
    E: IntoIterator<Item = Edge>,
{
    let mut totals: HashMap<(String, String), f64> = HashMap::new();
    for constraint in constraints.iter().filter(|c| c.is_valid_at(now)) {
        *totals
            .entry(pair_key(&constraint.source, &constraint.target))
            .or_insert(0.0) += constraint.constraint_value;
    }

    let mut graph = Graph::new();
    for node in nodes {
        graph.add_node(node);
    }

    for mut edge in edges {
        if !graph.contains_node(&edge.target) {
            continue;
        }
        if let Some(total) = totals.get(&pair_key(&edge.source, &edge.target)) {
            edge.constraint_value += total;
        }
        graph.insert_directed(edge);
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewConstraint;
    use crate::constraint::SECONDS_PER_DAY;

    const NOW: u64 = 1_700_000_000;

    fn nodes() -> Vec<Node> {
        ["DEPOT", "A", "B"]
            .into_iter()
            .map(|id| Node::new(id, 0.0, 0.0, 0.0))
            .collect()
    }

    fn symmetric(a: &str, b: &str, w: f64) -> Vec<Edge> {
        vec![Edge::new(a, b, w), Edge::new(b, a, w)]
    }

    #[test]
    fn test_constraints_fold_into_both_directions() {
        let edges = symmetric("DEPOT", "A", 2.0);
        let constraints = vec![
            NewConstraint::new("A", "DEPOT", 3.0).into_constraint(1, NOW),
            NewConstraint::new("DEPOT", "A", 1.0).into_constraint(2, NOW),
        ];
        let graph = assemble(nodes(), edges, &constraints, NOW);

        assert_eq!(graph.edge("DEPOT", "A").map(|e| e.constraint_value), Some(4.0));
        assert_eq!(graph.edge("A", "DEPOT").map(|e| e.constraint_value), Some(4.0));
        assert_eq!(graph.edge("A", "DEPOT").map(|e| e.weight), Some(2.0));
    }

    #[test]
    fn test_invalid_constraints_are_ignored() {
        let mut inactive = NewConstraint::new("DEPOT", "A", 5.0).into_constraint(1, NOW);
        inactive.is_active = false;
        let expired = NewConstraint::new("DEPOT", "A", 7.0)
            .with_expiry_days(1)
            .into_constraint(2, NOW - 2 * SECONDS_PER_DAY);

        let graph = assemble(nodes(), symmetric("DEPOT", "A", 2.0), &[inactive, expired], NOW);
        assert_eq!(graph.edge("DEPOT", "A").map(|e| e.constraint_value), Some(0.0));
    }

    #[test]
    fn test_baseline_constraint_is_kept() {
        let edges = vec![
            Edge::new("DEPOT", "A", 2.0).with_constraint(0.5),
            Edge::new("A", "DEPOT", 2.0).with_constraint(0.5),
        ];
        let constraints = vec![NewConstraint::new("DEPOT", "A", 1.0).into_constraint(1, NOW)];
        let graph = assemble(nodes(), edges, &constraints, NOW);
        assert_eq!(graph.edge("DEPOT", "A").map(|e| e.constraint_value), Some(1.5));
    }

    // Duplicate rows for one direction: first seen wins.
    #[test]
    fn test_duplicate_direction_keeps_first_row() {
        let edges = vec![
            Edge::new("DEPOT", "A", 2.0),
            Edge::new("DEPOT", "A", 9.0),
            Edge::new("A", "DEPOT", 2.0),
        ];
        let graph = assemble(nodes(), edges, &[], NOW);
        assert_eq!(graph.edges_from("DEPOT").len(), 1);
        assert_eq!(graph.edge("DEPOT", "A").map(|e| e.weight), Some(2.0));
    }

    #[test]
    fn test_rows_with_unknown_endpoints_are_skipped() {
        let edges = vec![Edge::new("DEPOT", "GHOST", 1.0), Edge::new("GHOST", "DEPOT", 1.0)];
        let graph = assemble(nodes(), edges, &[], NOW);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 3);
    }
}
