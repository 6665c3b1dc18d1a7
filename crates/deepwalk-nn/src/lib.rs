#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]

//! DeepWalk node embeddings with hierarchical-softmax skip-gram.
//!
//! # Pipeline
//!
//! ```text
//! Graph ──► RandomWalker ──► walks ─┐
//!   │                               ├──► SkipGram::train ──► leaf vectors ──► .npy
//!   └────► BinaryTree (N leaves) ───┘
//! ```
//!
//! - [`BinaryTree`] - hierarchical softmax structure; owns every vector
//! - [`SkipGram`] - windowed (target, context) updates along tree paths
//! - [`DeepWalk`] - the staged pipeline driven by a [`DeepWalkConfig`]
//! - [`NodeEmbeddings`] - the trained `[N, D]` matrix keyed by node id
//!
//! Training is single-threaded and deterministic by default. Parallel walk
//! generation and Hogwild training are both opt-in.

mod arena;
pub mod config;
mod error;
mod hogwild;
pub mod pipeline;
pub mod skipgram;
pub mod tree;
pub mod vecops;

pub use arena::VectorArena;
pub use config::{DeepWalkConfig, TreeShapeKind};
pub use error::{Error, Result};
pub use pipeline::{DeepWalk, NodeEmbeddings};
pub use skipgram::{LrSchedule, PassStats, SkipGram, SkipGramConfig, TrainStats};
pub use tree::{BinaryTree, Path, PathIndex, TreeRef, TreeShape, UpdateView};
