//! Greedy graph coloring
//!
//! Nodes are processed in adjacency order (sorted by id); each takes the
//! smallest color not already held by a colored neighbor. The palette is
//! fixed, so a node whose neighbors already use every color is left
//! uncolored. That is acceptable only for networks whose maximum degree is
//! below `PALETTE_SIZE`.

use crate::Adjacency;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Number of candidate colors, numbered from 0
pub const PALETTE_SIZE: usize = 20;

/// Outcome of a coloring run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coloring {
    /// Node id → color index
    pub assignment: BTreeMap<String, usize>,
}

impl Coloring {
    /// Color index → number of nodes bearing it
    pub fn stats(&self) -> BTreeMap<usize, usize> {
        let mut stats = BTreeMap::new();
        for color in self.assignment.values() {
            *stats.entry(*color).or_insert(0) += 1;
        }
        stats
    }

    /// One plus the highest color index used (0 when nothing is colored)
    pub fn chromatic_estimate(&self) -> usize {
        self.assignment.values().max().map_or(0, |max| max + 1)
    }

    /// Color of a node, if it received one
    pub fn color_of(&self, node: &str) -> Option<usize> {
        self.assignment.get(node).copied()
    }
}

/// Color the graph greedily
///
/// # Examples
///
/// ```
/// use wastegraph_domain::{greedy_coloring, AdjacentEdge, Adjacency};
///
/// let mut adj = Adjacency::new();
/// adj.insert("A".into(), vec![AdjacentEdge::new("B", 1.0, 0.0)]);
/// adj.insert("B".into(), vec![AdjacentEdge::new("A", 1.0, 0.0)]);
///
/// let coloring = greedy_coloring(&adj);
/// assert_eq!(coloring.color_of("A"), Some(0));
/// assert_eq!(coloring.color_of("B"), Some(1));
/// assert_eq!(coloring.chromatic_estimate(), 2);
/// ```
pub fn greedy_coloring(adjacency: &Adjacency) -> Coloring {
    let mut coloring = Coloring::default();

    for (node, edges) in adjacency {
        let taken: HashSet<usize> = edges
            .iter()
            .filter_map(|edge| coloring.assignment.get(&edge.neighbor).copied())
            .collect();

        if let Some(color) = (0..PALETTE_SIZE).find(|c| !taken.contains(c)) {
            coloring.assignment.insert(node.clone(), color);
        }
    }

    coloring
}
