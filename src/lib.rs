//! `deepwalk`: node embeddings from uniform random walks.
//!
//! A thin facade over the workspace crates:
//!
//! - [`deepwalk_core`] - graph storage, loaders and the random walker
//! - [`deepwalk_nn`] - hierarchical-softmax tree and skip-gram training
//!
//! ```rust
//! use deepwalk::{DeepWalk, DeepWalkConfig, Graph};
//!
//! let graph = Graph::from_edges(false, [("A", "B"), ("B", "C"), ("C", "A")]);
//! let dw = DeepWalk::new(DeepWalkConfig {
//!     n_dims: 4,
//!     seed: Some(7),
//!     ..Default::default()
//! })
//! .unwrap();
//! let embeddings = dw.fit(&graph).unwrap();
//! assert_eq!(embeddings.vectors().shape(), &[3, 4]);
//! ```

pub use deepwalk_core::formats;
pub use deepwalk_core::algo::random_walk::{generate_walks, RandomWalker, Walk, WalkConfig};
pub use deepwalk_core::{Adjacency, Graph, GraphStats, NodeId};
pub use deepwalk_nn::{
    BinaryTree, DeepWalk, DeepWalkConfig, LrSchedule, NodeEmbeddings, SkipGram, SkipGramConfig,
    TrainStats, TreeRef, TreeShape, TreeShapeKind,
};

/// Errors from graph loading and walk generation.
pub type GraphError = deepwalk_core::Error;

/// Errors from training and export; wraps [`GraphError`].
pub type Error = deepwalk_nn::Error;

pub type Result<T> = std::result::Result<T, Error>;
