//! Attributed graph built on petgraph's StableGraph
//!
//! Nodes are addressed by a unique string key (the label-free identity the
//! caller knows them by) and by a stable [`NodeId`]. Directed and undirected,
//! simple and multi graphs share one representation: edges are always stored
//! as arcs, and [`GraphKind`] decides how they are interpreted.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::attrs::{EdgeAttrs, NodeAttrs};
use crate::error::GraphError;

pub type NodeId = NodeIndex;
pub type EdgeId = EdgeIndex;

/// How edges of an [`AttrGraph`] are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphKind {
    #[default]
    Undirected,
    Directed,
    MultiUndirected,
    MultiDirected,
}

impl GraphKind {
    pub fn is_directed(self) -> bool {
        matches!(self, GraphKind::Directed | GraphKind::MultiDirected)
    }

    pub fn is_multi(self) -> bool {
        matches!(self, GraphKind::MultiUndirected | GraphKind::MultiDirected)
    }

    fn directed(self) -> Self {
        match self {
            GraphKind::Undirected | GraphKind::Directed => GraphKind::Directed,
            GraphKind::MultiUndirected | GraphKind::MultiDirected => GraphKind::MultiDirected,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphNode {
    key: String,
    attrs: NodeAttrs,
}

/// A graph whose nodes and edges carry render attributes
#[derive(Debug, Clone, Default)]
pub struct AttrGraph {
    graph: StableGraph<GraphNode, EdgeAttrs>,
    keys: HashMap<String, NodeId>,
    kind: GraphKind,
    /// Graph-level attributes, e.g. `show_labels` for the diffusion demo
    pub graph_data: Map<String, Value>,
}

impl AttrGraph {
    pub fn new(kind: GraphKind) -> Self {
        Self {
            graph: StableGraph::default(),
            keys: HashMap::new(),
            kind,
            graph_data: Map::new(),
        }
    }

    /// Record a display name under `graph_data["name"]`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.graph_data.insert("name".to_string(), Value::String(name.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.graph_data.get("name").and_then(Value::as_str)
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Add a node by key, returning the existing id if the key is known
    pub fn add_node(&mut self, key: impl Into<String>) -> NodeId {
        let key = key.into();
        if let Some(id) = self.keys.get(&key) {
            return *id;
        }
        let id = self.graph.add_node(GraphNode {
            key: key.clone(),
            attrs: NodeAttrs::default(),
        });
        self.keys.insert(key, id);
        id
    }

    /// Add an edge between two keys, creating missing endpoints
    ///
    /// Simple graphs never hold parallel edges: adding an edge that already
    /// exists returns it unchanged.
    pub fn add_edge(&mut self, a: impl Into<String>, b: impl Into<String>) -> EdgeId {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.add_edge_ids(a, b)
    }

    pub fn add_edge_ids(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        if !self.kind.is_multi() {
            if let Some(existing) = self.find_edge(a, b) {
                return existing;
            }
        }
        self.graph.add_edge(a, b, EdgeAttrs::default())
    }

    /// Find an edge joining two nodes, honoring direction for directed kinds
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.graph.find_edge(a, b).or_else(|| {
            if self.kind.is_directed() {
                None
            } else {
                self.graph.find_edge(b, a)
            }
        })
    }

    pub fn node_id(&self, key: &str) -> Result<NodeId, GraphError> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Key of a node (empty for ids that are not in the graph)
    pub fn key(&self, id: NodeId) -> &str {
        self.graph.node_weight(id).map(|n| n.key.as_str()).unwrap_or("")
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeAttrs> {
        self.graph.node_weight(id).map(|n| &n.attrs)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeAttrs> {
        self.graph.node_weight_mut(id).map(|n| &mut n.attrs)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeAttrs> {
        self.graph.edge_weight(id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut EdgeAttrs> {
        self.graph.edge_weight_mut(id)
    }

    pub fn endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph.edge_endpoints(id)
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_indices().collect()
    }

    /// Edge ids in insertion order
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.graph.edge_indices().collect()
    }

    /// Neighbors of a node, each listed once
    ///
    /// Undirected kinds look both ways along stored arcs; directed kinds only
    /// follow outgoing arcs. A node with a self-loop is its own neighbor.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let iter: Box<dyn Iterator<Item = NodeId>> = if self.kind.is_directed() {
            Box::new(self.graph.neighbors_directed(id, Direction::Outgoing))
        } else {
            Box::new(self.graph.neighbors_undirected(id))
        };
        let mut out: Vec<NodeId> = Vec::new();
        for n in iter {
            if !out.contains(&n) {
                out.push(n);
            }
        }
        out.sort();
        out
    }

    /// Number of edge endpoints at a node, counting parallel edges
    pub fn degree(&self, id: NodeId) -> usize {
        self.graph.edges_directed(id, Direction::Outgoing).count()
            + self.graph.edges_directed(id, Direction::Incoming).count()
    }

    /// Position of an edge among all edges joining the same pair of nodes
    ///
    /// Returns `(slot, count)`; simple graphs always give `(0, 1)` unless a
    /// directed graph holds both `a -> b` and `b -> a`.
    pub fn parallel_slot(&self, id: EdgeId) -> (usize, usize) {
        let Some((a, b)) = self.graph.edge_endpoints(id) else {
            return (0, 1);
        };
        let mut siblings: Vec<EdgeId> = self
            .graph
            .edges(a)
            .filter(|e| e.target() == b)
            .map(|e| e.id())
            .collect();
        if a != b {
            siblings.extend(self.graph.edges(b).filter(|e| e.target() == a).map(|e| e.id()));
        }
        siblings.sort();
        siblings.dedup();
        let slot = siblings.iter().position(|e| *e == id).unwrap_or(0);
        (slot, siblings.len().max(1))
    }

    /// Directed copy of this graph
    ///
    /// Every undirected edge becomes a pair of opposite arcs carrying the same
    /// attributes. Directed graphs are cloned as-is.
    pub fn to_directed(&self) -> AttrGraph {
        if self.kind.is_directed() {
            return self.clone();
        }
        let mut out = AttrGraph::new(self.kind.directed());
        out.graph_data = self.graph_data.clone();
        for id in self.node_ids() {
            let new_id = out.add_node(self.key(id));
            if let (Some(src), Some(dst)) = (self.node(id), out.node_mut(new_id)) {
                *dst = src.clone();
            }
        }
        for id in self.edge_ids() {
            let Some((a, b)) = self.endpoints(id) else { continue };
            let attrs = self.edge(id).cloned().unwrap_or_default();
            let (ka, kb) = (self.key(a).to_string(), self.key(b).to_string());
            let forward = out.add_edge(ka.clone(), kb.clone());
            if let Some(e) = out.edge_mut(forward) {
                *e = attrs.clone();
            }
            if a != b {
                let backward = out.add_edge(kb, ka);
                if let Some(e) = out.edge_mut(backward) {
                    *e = attrs;
                }
            }
        }
        out
    }

    /// Copy of this graph with node keys replaced by `0..n` in insertion order
    pub fn relabel_to_integers(&self) -> AttrGraph {
        let mut out = AttrGraph::new(self.kind);
        out.graph_data = self.graph_data.clone();
        let mut mapping = HashMap::new();
        for (i, id) in self.node_ids().into_iter().enumerate() {
            let new_id = out.add_node(i.to_string());
            if let (Some(src), Some(dst)) = (self.node(id), out.node_mut(new_id)) {
                *dst = src.clone();
            }
            mapping.insert(id, new_id);
        }
        for id in self.edge_ids() {
            let Some((a, b)) = self.endpoints(id) else { continue };
            let new_edge = out.add_edge_ids(mapping[&a], mapping[&b]);
            if let (Some(src), Some(dst)) = (self.edge(id), out.edge_mut(new_edge)) {
                *dst = src.clone();
            }
        }
        out
    }

    /// Index of a multigraph edge among the earlier edges joining the same
    /// nodes, counted per direction in directed kinds
    pub fn multi_key(&self, id: EdgeId) -> usize {
        let Some((a, b)) = self.endpoints(id) else { return 0 };
        let directed = self.kind.is_directed();
        self.graph
            .edge_indices()
            .take_while(|e| *e != id)
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter(|&(x, y)| (x, y) == (a, b) || (!directed && (x, y) == (b, a)))
            .count()
    }

    /// Display string for an edge, `(a, b)` or `(a, b, k)` in multigraphs
    pub fn edge_key(&self, id: EdgeId) -> String {
        let Some((a, b)) = self.endpoints(id) else { return String::new() };
        if self.kind.is_multi() {
            format!("({}, {}, {})", self.key(a), self.key(b), self.multi_key(id))
        } else {
            format!("({}, {})", self.key(a), self.key(b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_graph() {
        let g = AttrGraph::new(GraphKind::Directed).with_name("frucht");
        assert_eq!(g.name(), Some("frucht"));
        assert_eq!(AttrGraph::new(GraphKind::Directed).name(), None);
    }

    #[test]
    fn test_simple_graph_ignores_parallel_edges() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        let e1 = g.add_edge("a", "b");
        let e2 = g.add_edge("b", "a");
        assert_eq!(e1, e2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_directed_graph_keeps_reverse_arc() {
        let mut g = AttrGraph::new(GraphKind::Directed);
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        assert_eq!(g.edge_count(), 2);

        let a = g.node_id("a").unwrap();
        let b = g.node_id("b").unwrap();
        assert_eq!(g.neighbors(a), vec![b]);
    }

    #[test]
    fn test_multigraph_parallel_slots() {
        let mut g = AttrGraph::new(GraphKind::MultiUndirected);
        let e0 = g.add_edge("a", "b");
        let e1 = g.add_edge("b", "a");
        let e2 = g.add_edge("a", "b");
        let lone = g.add_edge("b", "c");

        assert_eq!(g.parallel_slot(e0), (0, 3));
        assert_eq!(g.parallel_slot(e1), (1, 3));
        assert_eq!(g.parallel_slot(e2), (2, 3));
        assert_eq!(g.parallel_slot(lone), (0, 1));
        assert_eq!(g.degree(g.node_id("b").unwrap()), 4);
    }

    #[test]
    fn test_self_loop_is_own_neighbor() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        g.add_edge("a", "a");
        g.add_edge("a", "b");
        let a = g.node_id("a").unwrap();
        let b = g.node_id("b").unwrap();
        assert_eq!(g.neighbors(a), vec![a, b]);
        assert_eq!(g.neighbors(b), vec![a]);
    }

    #[test]
    fn test_edge_keys_name_parallel_index() {
        let mut g = AttrGraph::new(GraphKind::MultiUndirected);
        let e0 = g.add_edge("a", "b");
        let e1 = g.add_edge("b", "a");
        let other = g.add_edge("b", "c");
        assert_eq!(g.edge_key(e0), "(a, b, 0)");
        assert_eq!(g.edge_key(e1), "(b, a, 1)");
        assert_eq!(g.edge_key(other), "(b, c, 0)");

        let mut d = AttrGraph::new(GraphKind::MultiDirected);
        d.add_edge("a", "b");
        let back = d.add_edge("b", "a");
        let again = d.add_edge("a", "b");
        assert_eq!(d.edge_key(back), "(b, a, 0)");
        assert_eq!(d.edge_key(again), "(a, b, 1)");

        let mut simple = AttrGraph::new(GraphKind::Undirected);
        let e = simple.add_edge("a", "b");
        assert_eq!(simple.edge_key(e), "(a, b)");
    }

    #[test]
    fn test_undirected_neighbors_are_unique() {
        let mut g = AttrGraph::new(GraphKind::MultiUndirected);
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        g.add_edge("c", "a");
        let a = g.node_id("a").unwrap();
        assert_eq!(g.neighbors(a).len(), 2);
    }

    #[test]
    fn test_to_directed_doubles_edges_and_keeps_attrs() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        let e = g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.edge_mut(e).unwrap().label = Some("ab".to_string());

        let d = g.to_directed();
        assert_eq!(d.kind(), GraphKind::Directed);
        assert_eq!(d.edge_count(), 4);
        let a = d.node_id("a").unwrap();
        let b = d.node_id("b").unwrap();
        let back = d.find_edge(b, a).unwrap();
        assert_eq!(d.edge(back).unwrap().label.as_deref(), Some("ab"));
    }

    #[test]
    fn test_relabel_to_integers() {
        let mut g = AttrGraph::new(GraphKind::Undirected);
        g.add_edge("(0, 0)", "(0, 1)");
        let id = g.node_id("(0, 1)").unwrap();
        g.node_mut(id).unwrap().set_data("val", 1);

        let r = g.relabel_to_integers();
        assert!(r.contains("0") && r.contains("1"));
        assert!(!r.contains("(0, 0)"));
        let one = r.node_id("1").unwrap();
        assert_eq!(r.node(one).unwrap().data_i64("val"), 1);
        assert_eq!(r.edge_count(), 1);
    }

    #[test]
    fn test_unknown_node() {
        let g = AttrGraph::new(GraphKind::Undirected);
        assert!(matches!(g.node_id("missing"), Err(GraphError::UnknownNode(k)) if k == "missing"));
    }
}
