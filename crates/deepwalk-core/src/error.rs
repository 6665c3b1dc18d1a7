//! Error types for deepwalk-core.

use thiserror::Error;

/// Error type for graph construction, loading and walk generation.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed line in an edge-list file.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Invalid walk configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Node not present in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The graph has no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,
}

/// Result type for deepwalk-core operations.
pub type Result<T> = std::result::Result<T, Error>;
