use crate::formats::{Csv, EdgeList};
use crate::{Error, NodeId, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read-only adjacency view consumed by the walker and the trainer.
///
/// Nodes are addressed by dense `u32` indices in `0..node_count()`, which is
/// also the row order of the exported embedding matrix.
pub trait Adjacency {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Neighbors reachable in one hop from `node`.
    ///
    /// Directed graphs yield outgoing neighbors only. Order is stable for a
    /// given construction sequence.
    fn neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_;

    /// Whether edges are followed in one direction only.
    fn is_directed(&self) -> bool;
}

/// Summary statistics for a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub isolated_count: usize,
    pub max_degree: usize,
    pub directed: bool,
}

/// A simple graph over string node identifiers.
///
/// Backed by petgraph's `DiGraph`. Undirected edges are stored as a pair of
/// arcs so that neighbor lookup is always an outgoing scan. Parallel edges
/// are collapsed: adding `a-b` twice (or `b-a` after `a-b` on an undirected
/// graph) is a no-op.
///
/// # Example
///
/// ```rust
/// use deepwalk_core::{Adjacency, Graph};
///
/// let mut g = Graph::new(false);
/// g.add_edge("A", "B");
/// g.add_edge("B", "C");
///
/// assert_eq!(g.node_count(), 3);
/// assert_eq!(g.edge_count(), 2);
/// assert_eq!(g.neighbors(1).count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
    directed: bool,
    edge_count: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            directed,
            edge_count: 0,
        }
    }

    /// Create a graph with estimated capacity.
    pub fn with_capacity(directed: bool, nodes: usize, edges: usize) -> Self {
        let arcs = if directed { edges } else { edges * 2 };
        Self {
            graph: DiGraph::with_capacity(nodes, arcs),
            index: HashMap::with_capacity(nodes),
            directed,
            edge_count: 0,
        }
    }

    /// Build a graph from an iterator of edges.
    pub fn from_edges<I, A, B>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<NodeId>,
        B: Into<NodeId>,
    {
        let mut g = Self::new(directed);
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    /// Load a graph from disk.
    ///
    /// `.csv` files are read with [`Csv`], anything else as a whitespace
    /// separated [`EdgeList`].
    pub fn from_path(path: impl AsRef<Path>, directed: bool) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let graph = if is_csv {
            Csv::read(reader, directed)?
        } else {
            EdgeList::read(reader, directed)?
        };
        tracing::debug!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded graph"
        );
        Ok(graph)
    }

    /// Add a node if absent, returning its dense index.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> u32 {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            return idx.index() as u32;
        }
        let idx = self.graph.add_node(id.clone());
        self.index.insert(id, idx);
        idx.index() as u32
    }

    /// Add an edge, creating endpoints as needed.
    ///
    /// Returns `false` when the edge was already present.
    pub fn add_edge(&mut self, a: impl Into<NodeId>, b: impl Into<NodeId>) -> bool {
        let a = NodeIndex::new(self.add_node(a) as usize);
        let b = NodeIndex::new(self.add_node(b) as usize);

        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        if !self.directed && a != b {
            self.graph.add_edge(b, a, ());
        }
        self.edge_count += 1;
        true
    }

    /// Node identifiers in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.graph.node_weights()
    }

    /// Identifier for a dense node index.
    pub fn node_id(&self, idx: u32) -> Option<&NodeId> {
        self.graph.node_weight(NodeIndex::new(idx as usize))
    }

    /// Dense index for a node identifier.
    pub fn index_of(&self, id: &NodeId) -> Option<u32> {
        self.index.get(id).map(|idx| idx.index() as u32)
    }

    /// Dense index for a node identifier, or [`Error::UnknownNode`].
    pub fn require(&self, id: &NodeId) -> Result<u32> {
        self.index_of(id)
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    /// Number of logical edges (an undirected edge counts once).
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of neighbors of `node` (0 for out-of-range indices).
    pub fn degree(&self, node: u32) -> usize {
        if node as usize >= self.graph.node_count() {
            return 0;
        }
        self.graph
            .neighbors_directed(NodeIndex::new(node as usize), Direction::Outgoing)
            .count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut isolated_count = 0;
        let mut max_degree = 0;
        for idx in 0..self.graph.node_count() as u32 {
            let d = self.degree(idx);
            if d == 0 {
                isolated_count += 1;
            }
            max_degree = max_degree.max(d);
        }
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.edge_count,
            isolated_count,
            max_degree,
            directed: self.directed,
        }
    }

    /// Borrow the underlying petgraph structure.
    pub fn as_petgraph(&self) -> &DiGraph<NodeId, ()> {
        &self.graph
    }
}

impl Adjacency for Graph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        self.graph
            .neighbors_directed(NodeIndex::new(node as usize), Direction::Outgoing)
            .map(|n| n.index() as u32)
    }

    fn is_directed(&self) -> bool {
        self.directed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_neighbors_symmetric() {
        let g = Graph::from_edges(false, [("A", "B"), ("B", "C")]);
        let mut b: Vec<u32> = g.neighbors(1).collect();
        b.sort_unstable();
        assert_eq!(b, vec![0, 2]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(g.neighbors(2).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_directed_neighbors_outgoing_only() {
        let g = Graph::from_edges(true, [("A", "B"), ("B", "C")]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(g.neighbors(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(g.neighbors(2).count(), 0);
    }

    #[test]
    fn test_duplicate_edges_collapsed() {
        let mut g = Graph::new(false);
        assert!(g.add_edge("A", "B"));
        assert!(!g.add_edge("A", "B"));
        assert!(!g.add_edge("B", "A"));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(0), 1);
    }

    #[test]
    fn test_directed_reverse_edge_is_distinct() {
        let mut g = Graph::new(true);
        assert!(g.add_edge("A", "B"));
        assert!(g.add_edge("B", "A"));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_self_loop_appears_once() {
        let g = Graph::from_edges(false, [("A", "A")]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_node_order_is_insertion_order() {
        let mut g = Graph::new(false);
        g.add_node("z");
        g.add_edge("y", "x");
        let ids: Vec<&str> = g.nodes().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
        assert_eq!(g.index_of(&NodeId::from("x")), Some(2));
        assert_eq!(g.node_id(1).map(NodeId::as_str), Some("y"));
    }

    #[test]
    fn test_stats_counts_isolated() {
        let mut g = Graph::from_edges(false, [("A", "B")]);
        g.add_node("lonely");
        let stats = g.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.isolated_count, 1);
        assert_eq!(stats.max_degree, 1);
        assert!(!stats.directed);
    }

    #[test]
    fn test_require_unknown_node() {
        let g = Graph::from_edges(false, [("A", "B")]);
        assert!(matches!(
            g.require(&NodeId::from("Q")),
            Err(Error::UnknownNode(ref id)) if id == "Q"
        ));
    }
}
