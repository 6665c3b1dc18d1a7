#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]

//! Graph substrate for DeepWalk.
//!
//! - [`Graph`] - petgraph-backed graph over string [`NodeId`]s
//! - [`Adjacency`] - the read-only view the walker and trainer consume
//! - [`formats`] - edge-list and CSV loaders
//! - [`algo::random_walk`] - uniform truncated random walks
//!
//! # Node indices
//!
//! Every node gets a dense `u32` index in insertion order. Walks, tree leaves
//! and rows of the exported embedding matrix all use this index, so the
//! mapping back to identifiers is just [`Graph::node_id`].
//!
//! # Example
//!
//! ```rust
//! use deepwalk_core::algo::random_walk::{generate_walks, WalkConfig};
//! use deepwalk_core::Graph;
//!
//! let g = Graph::from_edges(false, [("A", "B"), ("B", "C")]);
//! let walks = generate_walks(&g, &WalkConfig {
//!     walks_per_node: 1,
//!     steps_per_walk: 3,
//!     seed: Some(42),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(walks.len(), 3);
//! ```

pub mod algo;
mod error;
pub mod formats;
mod graph;
mod node;

pub use error::{Error, Result};
pub use graph::{Adjacency, Graph, GraphStats};
pub use node::NodeId;

// Re-export petgraph for callers that need the raw structure
pub use petgraph;
