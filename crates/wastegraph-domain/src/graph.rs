//! In-memory graph view
//!
//! A `Graph` is rebuilt from the store on every read and never persisted.
//! Both maps are ordered by node id so every algorithm that walks them
//! (coloring in particular) is deterministic.

use crate::{AdjacentEdge, Edge, GraphError, Node};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered adjacency: `node → [(neighbor, weight, constraint)]`
pub type Adjacency = BTreeMap<String, Vec<AdjacentEdge>>;

/// The road network held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Vec<Edge>>,
}

/// External representation of a graph: every undirected edge listed once
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// All nodes, ordered by id
    pub nodes: Vec<Node>,

    /// One direction of every edge
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a node
    pub fn add_node(&mut self, node: Node) {
        self.edges.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add an undirected edge as two directed entries
    ///
    /// Directions already present are left untouched.
    ///
    /// # Errors
    /// Returns `MissingEndpoint` if either node is absent
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            return Err(GraphError::MissingEndpoint {
                from: edge.source,
                to: edge.target,
            });
        }
        let reverse = edge.reversed();
        self.insert_directed(edge);
        self.insert_directed(reverse);
        Ok(())
    }

    /// Insert one directed entry unless that direction already exists
    ///
    /// Returns `false` when the entry was skipped as a duplicate or because
    /// its source node is unknown.
    pub(crate) fn insert_directed(&mut self, edge: Edge) -> bool {
        match self.edges.get_mut(&edge.source) {
            Some(list) if list.iter().any(|e| e.target == edge.target) => false,
            Some(list) => {
                list.push(edge);
                true
            }
            None => false,
        }
    }

    /// Whether the graph contains a node
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterate nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Outgoing edges of a node
    pub fn edges_from(&self, id: &str) -> &[Edge] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up one direction of an edge
    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges_from(source).iter().find(|e| e.target == target)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.undirected_edges().count()
    }

    /// Adjacency list for the path finder and the coloring engine
    pub fn adjacency(&self) -> Adjacency {
        self.edges
            .iter()
            .map(|(id, list)| {
                let entries = list
                    .iter()
                    .map(|e| AdjacentEdge::new(e.target.clone(), e.weight, e.constraint_value))
                    .collect();
                (id.clone(), entries)
            })
            .collect()
    }

    fn undirected_edges(&self) -> impl Iterator<Item = &Edge> {
        let mut seen = BTreeSet::new();
        self.edges.values().flatten().filter(move |&e| {
            let pair = if e.source <= e.target {
                (e.source.as_str(), e.target.as_str())
            } else {
                (e.target.as_str(), e.source.as_str())
            };
            seen.insert(pair)
        })
    }

    /// Export nodes and undirected edges
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.undirected_edges().cloned().collect(),
        }
    }

    /// Rebuild a graph from its external representation
    ///
    /// # Errors
    /// Returns `MissingEndpoint` if an edge references an unlisted node
    pub fn from_document(document: GraphDocument) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in document.nodes {
            graph.add_node(node);
        }
        for edge in document.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        for id in ["DEPOT", "A", "B", "C"] {
            graph.add_node(Node::new(id, 0.0, 0.0, 10.0));
        }
        graph.add_edge(Edge::new("DEPOT", "A", 2.0)).unwrap();
        graph.add_edge(Edge::new("DEPOT", "B", 2.3).with_constraint(1.0)).unwrap();
        graph.add_edge(Edge::new("A", "C", 1.8)).unwrap();
        graph.add_edge(Edge::new("B", "C", 2.7)).unwrap();
        graph
    }

    fn undirected_set(doc: &GraphDocument) -> BTreeSet<(String, String, String)> {
        doc.edges
            .iter()
            .map(|e| {
                let (a, b) = if e.source <= e.target {
                    (e.source.clone(), e.target.clone())
                } else {
                    (e.target.clone(), e.source.clone())
                };
                (a, b, format!("{}/{}", e.weight, e.constraint_value))
            })
            .collect()
    }

    #[test]
    fn test_edges_are_symmetric() {
        let graph = sample();
        assert_eq!(graph.edge("A", "DEPOT").map(|e| e.weight), Some(2.0));
        assert_eq!(graph.edge("DEPOT", "A").map(|e| e.weight), Some(2.0));
        assert_eq!(graph.edge("C", "B").map(|e| e.constraint_value), Some(0.0));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_add_edge_requires_nodes() {
        let mut graph = sample();
        let err = graph.add_edge(Edge::new("A", "Z", 1.0)).unwrap_err();
        assert!(matches!(err, GraphError::MissingEndpoint { .. }));
    }

    #[test]
    fn test_adjacency_is_ordered_by_node_id() {
        let keys: Vec<_> = sample().adjacency().into_keys().collect();
        assert_eq!(keys, vec!["A", "B", "C", "DEPOT"]);
    }

    #[test]
    fn test_isolated_node_has_empty_adjacency() {
        let mut graph = sample();
        graph.add_node(Node::new("LONELY", 5.0, 5.0, 0.0));
        assert_eq!(graph.adjacency().get("LONELY"), Some(&Vec::new()));
    }

    #[test]
    fn test_document_lists_each_edge_once() {
        let doc = sample().to_document();
        assert_eq!(doc.nodes.len(), 4);
        assert_eq!(doc.edges.len(), 4);
    }

    #[test]
    fn test_document_roundtrip_through_json() {
        let graph = sample();
        let doc = graph.to_document();
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: GraphDocument = serde_json::from_str(&json).unwrap();
        let rebuilt = Graph::from_document(parsed).unwrap();

        let rebuilt_doc = rebuilt.to_document();
        assert_eq!(rebuilt_doc.nodes, doc.nodes);
        assert_eq!(undirected_set(&rebuilt_doc), undirected_set(&doc));
        assert_eq!(rebuilt, graph);
    }
}
