//! Smart node deletion
//!
//! Removing a collection point must not make the remaining network worse
//! between its neighbors. For every pair of neighbors {u, v} of the removed
//! node n, a shortcut u–v of weight w(n,u) + w(n,v) is inserted, or an
//! existing u–v edge is shortened to that value if it is longer.
//!
//! Shortcuts use raw base weights only. Constraints on the two merged edges
//! are not carried into the shortcut.
//!
//! This is a local repair: it guarantees that each neighbor pair keeps a
//! route no longer than the two-hop route through the removed node. It does
//! not re-establish global shortest paths that ran through other nodes.

use crate::traits::TopologyEdit;
use serde::Serialize;

/// Report of a smart deletion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartDeletion {
    /// Id of the removed node
    pub deleted_node: String,

    /// New shortcut edges inserted
    pub shortcuts_created: usize,

    /// Existing edges shortened
    pub shortcuts_updated: usize,

    /// Number of neighbors the node had
    pub neighbors_count: usize,
}

impl SmartDeletion {
    /// Created plus updated shortcuts
    pub fn total_shortcuts(&self) -> usize {
        self.shortcuts_created + self.shortcuts_updated
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        if self.neighbors_count == 0 {
            format!("Isolated node {} deleted (no neighbors)", self.deleted_node)
        } else {
            format!(
                "Node {} deleted ({} shortcuts created, {} improved)",
                self.deleted_node, self.shortcuts_created, self.shortcuts_updated
            )
        }
    }
}

/// Delete `node` after repairing the paths between its neighbors
///
/// Returns `Ok(None)` if the node does not exist. The caller is responsible
/// for running `editor` inside a transaction.
pub fn remove_node_preserving_paths<E: TopologyEdit>(
    editor: &mut E,
    node: &str,
) -> Result<Option<SmartDeletion>, E::Error> {
    if !editor.node_exists(node)? {
        return Ok(None);
    }

    let neighbors = editor.neighbor_weights(node)?;
    let mut report = SmartDeletion {
        deleted_node: node.to_string(),
        shortcuts_created: 0,
        shortcuts_updated: 0,
        neighbors_count: neighbors.len(),
    };

    for (i, (u, weight_u)) in neighbors.iter().enumerate() {
        for (v, weight_v) in &neighbors[i + 1..] {
            if u == v {
                continue;
            }
            let candidate = weight_u + weight_v;
            match editor.edge_weight(u, v)? {
                Some(existing) if candidate < existing => {
                    editor.set_edge_weight(u, v, candidate)?;
                    report.shortcuts_updated += 1;
                }
                Some(_) => {}
                None => {
                    editor.insert_edge(u, v, candidate)?;
                    report.shortcuts_created += 1;
                }
            }
        }
    }

    editor.remove_node(node)?;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shortest_path, ConstraintOverrides, Edge, Graph, Node};
    use std::collections::{BTreeMap, BTreeSet};

    /// Directed-edge map standing in for a store transaction
    #[derive(Default)]
    struct MemoryEditor {
        nodes: BTreeSet<String>,
        edges: BTreeMap<(String, String), f64>,
        fail_on_insert: bool,
    }

    impl MemoryEditor {
        fn with_edges(nodes: &[&str], edges: &[(&str, &str, f64)]) -> Self {
            let mut editor = Self {
                nodes: nodes.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            };
            for (a, b, w) in edges {
                editor.edges.insert((a.to_string(), b.to_string()), *w);
                editor.edges.insert((b.to_string(), a.to_string()), *w);
            }
            editor
        }

        fn graph(&self) -> Graph {
            let mut graph = Graph::new();
            for id in &self.nodes {
                graph.add_node(Node::new(id.as_str(), 0.0, 0.0, 0.0));
            }
            for ((a, b), w) in &self.edges {
                graph.add_edge(Edge::new(a.as_str(), b.as_str(), *w)).unwrap();
            }
            graph
        }

        fn weight(&self, a: &str, b: &str) -> Option<f64> {
            self.edges.get(&(a.to_string(), b.to_string())).copied()
        }
    }

    impl TopologyEdit for MemoryEditor {
        type Error = String;

        fn node_exists(&self, id: &str) -> Result<bool, String> {
            Ok(self.nodes.contains(id))
        }

        fn neighbor_weights(&self, id: &str) -> Result<Vec<(String, f64)>, String> {
            Ok(self
                .edges
                .iter()
                .filter(|((s, _), _)| s == id)
                .map(|((_, t), w)| (t.clone(), *w))
                .collect())
        }

        fn edge_weight(&self, source: &str, target: &str) -> Result<Option<f64>, String> {
            Ok(self.weight(source, target))
        }

        fn set_edge_weight(&mut self, a: &str, b: &str, weight: f64) -> Result<(), String> {
            self.edges.insert((a.to_string(), b.to_string()), weight);
            self.edges.insert((b.to_string(), a.to_string()), weight);
            Ok(())
        }

        fn insert_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<(), String> {
            if self.fail_on_insert {
                return Err("disk full".to_string());
            }
            self.set_edge_weight(a, b, weight)
        }

        fn remove_node(&mut self, id: &str) -> Result<bool, String> {
            self.edges.retain(|(s, t), _| s != id && t != id);
            Ok(self.nodes.remove(id))
        }
    }

    fn depot_network() -> MemoryEditor {
        MemoryEditor::with_edges(
            &["DEPOT", "A", "B", "C"],
            &[("DEPOT", "A", 2.0), ("DEPOT", "B", 2.3), ("A", "C", 1.8), ("B", "C", 2.7)],
        )
    }

    fn distance(editor: &MemoryEditor, from: &str, to: &str) -> f64 {
        shortest_path(&editor.graph().adjacency(), from, to, &ConstraintOverrides::new())
            .unwrap()
            .distance
    }

    #[test]
    fn test_smart_delete_creates_depot_shortcut() {
        let mut editor = depot_network();
        let before = distance(&editor, "DEPOT", "C");

        let report = remove_node_preserving_paths(&mut editor, "A").unwrap().unwrap();

        assert_eq!(report.deleted_node, "A");
        assert_eq!(report.shortcuts_created, 1);
        assert_eq!(report.shortcuts_updated, 0);
        assert_eq!(report.neighbors_count, 2);
        assert!((editor.weight("DEPOT", "C").unwrap() - 3.8).abs() < 1e-9);
        assert!((editor.weight("C", "DEPOT").unwrap() - 3.8).abs() < 1e-9);
        assert!(!editor.nodes.contains("A"));
        assert!((distance(&editor, "DEPOT", "C") - before).abs() < 1e-9);
    }

    #[test]
    fn test_existing_longer_edge_is_shortened() {
        let mut editor = MemoryEditor::with_edges(
            &["N", "U", "V"],
            &[("N", "U", 1.0), ("N", "V", 1.5), ("U", "V", 9.0)],
        );
        let report = remove_node_preserving_paths(&mut editor, "N").unwrap().unwrap();

        assert_eq!(report.shortcuts_created, 0);
        assert_eq!(report.shortcuts_updated, 1);
        assert_eq!(report.total_shortcuts(), 1);
        assert_eq!(editor.weight("U", "V"), Some(2.5));
        assert_eq!(editor.weight("V", "U"), Some(2.5));
    }

    #[test]
    fn test_existing_shorter_edge_is_kept() {
        let mut editor = MemoryEditor::with_edges(
            &["N", "U", "V"],
            &[("N", "U", 1.0), ("N", "V", 1.5), ("U", "V", 2.0)],
        );
        let report = remove_node_preserving_paths(&mut editor, "N").unwrap().unwrap();

        assert_eq!(report.total_shortcuts(), 0);
        assert_eq!(editor.weight("U", "V"), Some(2.0));
    }

    #[test]
    fn test_every_neighbor_pair_is_considered() {
        let mut editor = MemoryEditor::with_edges(
            &["HUB", "P", "Q", "R", "S"],
            &[("HUB", "P", 1.0), ("HUB", "Q", 2.0), ("HUB", "R", 3.0), ("HUB", "S", 4.0)],
        );
        let report = remove_node_preserving_paths(&mut editor, "HUB").unwrap().unwrap();

        assert_eq!(report.neighbors_count, 4);
        assert_eq!(report.shortcuts_created, 6);
        assert_eq!(editor.weight("P", "S"), Some(5.0));
        assert_eq!(editor.weight("Q", "R"), Some(5.0));
    }

    #[test]
    fn test_isolated_node_is_deleted_without_shortcuts() {
        let mut editor = MemoryEditor::with_edges(&["LONELY", "A", "B"], &[("A", "B", 1.0)]);
        let report = remove_node_preserving_paths(&mut editor, "LONELY").unwrap().unwrap();

        assert_eq!(report.neighbors_count, 0);
        assert_eq!(report.total_shortcuts(), 0);
        assert!(report.summary().contains("no neighbors"));
        assert!(!editor.nodes.contains("LONELY"));
    }

    #[test]
    fn test_missing_node_is_not_found() {
        let mut editor = depot_network();
        assert_eq!(remove_node_preserving_paths(&mut editor, "GHOST"), Ok(None));
        assert_eq!(editor.nodes.len(), 4);
    }

    #[test]
    fn test_error_aborts_before_node_removal() {
        let mut editor = depot_network();
        editor.fail_on_insert = true;
        assert!(remove_node_preserving_paths(&mut editor, "A").is_err());
        assert!(editor.nodes.contains("A"));
    }
}
