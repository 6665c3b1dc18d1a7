//! Error types for deepwalk-nn.

use thiserror::Error;

/// Error type for tree construction and training.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (dimensions, window, counts, learning rate).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Node index outside the tree's leaf set.
    #[error("unknown node {node}: tree has {num_leaves} leaves")]
    UnknownNode { node: u32, num_leaves: usize },

    /// A walk references a node outside the tree's leaf set.
    #[error("walk {walk}, position {position}: unknown node {node} (tree has {num_leaves} leaves)")]
    UnknownWalkNode {
        walk: usize,
        position: usize,
        node: u32,
        num_leaves: usize,
    },

    /// Internal-node index outside the tree.
    #[error("unknown internal node {index}: tree has {num_internal} internal nodes")]
    UnknownInternal { index: u32, num_internal: usize },

    /// Training was asked to run without any walks.
    #[error("empty corpus: no walks to train on")]
    EmptyCorpus,

    /// Graph or walk error.
    #[error(transparent)]
    Graph(#[from] deepwalk_core::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `.npy` serialization error.
    #[error("npy error: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// Config file parse error.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Rayon pool construction error.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
