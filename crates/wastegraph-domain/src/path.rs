//! Constraint-aware shortest path (Dijkstra)
//!
//! The effective cost of a directed edge is its base weight plus its
//! constraint. A transient override keyed `"<source>-<target>"` replaces the
//! constraint of that single direction for one call; nothing is written back.

use crate::{edge_key, Adjacency, ConstraintOverrides, GraphError};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Result of a path query
///
/// An unreachable destination is a normal outcome: empty path, infinite distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    /// Node ids from source to destination inclusive (empty when unreachable)
    pub path: Vec<String>,

    /// Total effective cost (`f64::INFINITY` when unreachable)
    pub distance: f64,
}

impl ShortestPath {
    /// The "no path" outcome
    pub fn unreachable() -> Self {
        Self {
            path: Vec::new(),
            distance: f64::INFINITY,
        }
    }

    /// Whether a path was found
    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Heap entry; ordered so the cheapest (then smallest id) pops first
#[derive(Debug, PartialEq)]
struct Candidate<'a> {
    cost: f64,
    node: &'a str,
}

impl Eq for Candidate<'_> {}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Check that every override is a finite, non-negative number
///
/// # Errors
/// Returns a description naming the first offending key
pub fn validate_overrides(overrides: &ConstraintOverrides) -> Result<(), String> {
    match overrides
        .iter()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        Some((key, value)) => Err(format!(
            "Override for '{}' must be a non-negative number, got {}",
            key, value
        )),
        None => Ok(()),
    }
}

/// Find the cheapest path from `source` to `destination`
///
/// Among equally cheap candidates the smallest node id is settled first.
/// Negative overrides are not rejected here (see [`validate_overrides`]); the
/// search still terminates, but the distance is then not guaranteed minimal.
///
/// # Errors
/// Returns `UnknownNode` if either endpoint is not a key of `adjacency`
///
/// # Examples
///
/// ```
/// use wastegraph_domain::{shortest_path, AdjacentEdge, Adjacency, ConstraintOverrides};
///
/// let mut adj = Adjacency::new();
/// adj.insert("A".into(), vec![AdjacentEdge::new("B", 2.0, 0.0)]);
/// adj.insert("B".into(), vec![AdjacentEdge::new("A", 2.0, 0.0)]);
///
/// let result = shortest_path(&adj, "A", "B", &ConstraintOverrides::new()).unwrap();
/// assert_eq!(result.path, vec!["A", "B"]);
/// assert_eq!(result.distance, 2.0);
/// ```
pub fn shortest_path(
    adjacency: &Adjacency,
    source: &str,
    destination: &str,
    overrides: &ConstraintOverrides,
) -> Result<ShortestPath, GraphError> {
    let (source, _) = adjacency
        .get_key_value(source)
        .ok_or_else(|| GraphError::UnknownNode(source.to_string()))?;
    let (destination, _) = adjacency
        .get_key_value(destination)
        .ok_or_else(|| GraphError::UnknownNode(destination.to_string()))?;

    let mut dist: HashMap<&str, f64> = HashMap::new();
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut settled: HashSet<&str> = HashSet::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(Candidate { cost: 0.0, node: source });

    while let Some(Candidate { cost, node }) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == destination.as_str() {
            break;
        }
        let Some(edges) = adjacency.get(node) else {
            continue;
        };
        for edge in edges {
            // A settled node keeps its parent, so the parent chain stays acyclic
            if settled.contains(edge.neighbor.as_str()) {
                continue;
            }
            let constraint = overrides
                .get(&edge_key(node, &edge.neighbor))
                .copied()
                .unwrap_or(edge.constraint);
            let next = cost + edge.weight + constraint;
            let known = dist.get(edge.neighbor.as_str()).copied().unwrap_or(f64::INFINITY);
            if next < known {
                dist.insert(&edge.neighbor, next);
                parent.insert(&edge.neighbor, node);
                heap.push(Candidate {
                    cost: next,
                    node: &edge.neighbor,
                });
            }
        }
    }

    let Some(&distance) = dist.get(destination.as_str()) else {
        return Ok(ShortestPath::unreachable());
    };

    let mut path = vec![destination.clone()];
    let mut current = destination.as_str();
    while let Some(&previous) = parent.get(current) {
        path.push(previous.to_string());
        current = previous;
    }
    path.reverse();

    Ok(ShortestPath { path, distance })
}
