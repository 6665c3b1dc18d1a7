//! Plain edge-list format.
//!
//! One edge per line: `source target [ignored...]`, separated by whitespace.
//! A line with a single token declares an isolated node. Blank lines and
//! lines starting with `#` or `%` are skipped.

use crate::{Error, Graph, Result};
use std::io::BufRead;

/// Whitespace separated edge-list handler.
pub struct EdgeList;

impl EdgeList {
    /// Read a graph from an edge list.
    pub fn read<R: BufRead>(reader: R, directed: bool) -> Result<Graph> {
        let mut graph = Graph::new(directed);

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some(a), Some(b)) => {
                    graph.add_edge(a, b);
                }
                (Some(a), None) => {
                    graph.add_node(a);
                }
                _ => {
                    return Err(Error::Parse {
                        line: lineno + 1,
                        message: format!("expected `source target`, got {line:?}"),
                    })
                }
            }
        }

        Ok(graph)
    }

    /// Parse an edge list from a string.
    pub fn parse(input: &str, directed: bool) -> Result<Graph> {
        Self::read(input.as_bytes(), directed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Adjacency, NodeId};

    #[test]
    fn test_edgelist_basic() {
        let g = EdgeList::parse("# header\n1 2\n2\t3 0.7\n\n% note\n4\n", false).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 2);
        let four = g.index_of(&NodeId::from("4")).unwrap();
        assert_eq!(g.degree(four), 0);
    }

    #[test]
    fn test_edgelist_directed() {
        let g = EdgeList::parse("a b\n", true).unwrap();
        assert!(g.is_directed());
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 0);
    }
}
