//! Graph algorithms.
//!
//! - [`random_walk`] - uniform truncated random walks (DeepWalk corpus)

pub mod random_walk;
