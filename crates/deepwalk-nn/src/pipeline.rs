//! End-to-end DeepWalk: walks → tree → skip-gram → embeddings.

use crate::config::{DeepWalkConfig, TreeShapeKind};
use crate::skipgram::{SkipGram, TrainStats};
use crate::tree::{BinaryTree, TreeShape};
use crate::{Error, Result};
use deepwalk_core::algo::random_walk::{generate_walks, visit_counts, Walk, WalkConfig};
use deepwalk_core::{Adjacency, Graph, NodeId};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Mixed into the run seed so leaf initialization does not share the walk stream.
const TREE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configured DeepWalk run.
///
/// The seed is fixed at construction (drawn from the OS if the config has
/// none), so every stage below is reproducible for a given instance.
///
/// # Example
///
/// ```rust
/// use deepwalk_core::Graph;
/// use deepwalk_nn::{DeepWalk, DeepWalkConfig};
///
/// let g = Graph::from_edges(false, [("A", "B"), ("B", "C"), ("C", "A")]);
/// let dw = DeepWalk::new(DeepWalkConfig {
///     n_dims: 4,
///     seed: Some(1),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let emb = dw.fit(&g).unwrap();
/// assert_eq!(emb.vectors().shape(), &[3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct DeepWalk {
    config: DeepWalkConfig,
    seed: u64,
}

impl DeepWalk {
    pub fn new(config: DeepWalkConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        if config.seed.is_none() {
            tracing::info!(seed, "no seed configured, drew one");
        }
        Ok(Self { config, seed })
    }

    pub fn config(&self) -> &DeepWalkConfig {
        &self.config
    }

    /// Seed in effect for this run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Load a graph honoring the configured directedness.
    pub fn load_graph(&self, path: impl AsRef<Path>) -> Result<Graph> {
        Ok(Graph::from_path(path, self.config.directed)?)
    }

    /// Stage 1: the walk corpus.
    pub fn walks<G: Adjacency + Sync>(&self, graph: &G) -> Result<Vec<Walk>> {
        let config = WalkConfig {
            seed: Some(self.seed),
            ..self.config.walk_config()
        };
        Ok(generate_walks(graph, &config)?)
    }

    /// Stage 2: the hierarchical-softmax tree over `num_nodes` leaves.
    ///
    /// `walks` is only consulted for Huffman trees.
    pub fn build_tree(&self, num_nodes: usize, walks: &[Walk]) -> Result<BinaryTree> {
        if num_nodes == 0 {
            return Err(deepwalk_core::Error::EmptyGraph.into());
        }
        let shape = match self.config.tree_shape {
            TreeShapeKind::Balanced => TreeShape::Balanced,
            TreeShapeKind::Huffman => TreeShape::Huffman(visit_counts(walks, num_nodes)),
        };
        BinaryTree::with_shape(num_nodes, self.config.n_dims, &shape, self.seed ^ TREE_SEED_SALT)
    }

    /// Stage 3: skip-gram training.
    pub fn train(&self, tree: &mut BinaryTree, walks: &[Walk]) -> Result<TrainStats> {
        SkipGram::new(self.config.skipgram_config())?.train(tree, walks)
    }

    /// All stages over any [`Adjacency`]; rows follow node index order.
    pub fn fit_adjacency<G: Adjacency + Sync>(&self, graph: &G) -> Result<(Array2<f32>, TrainStats)> {
        let walks = self.walks(graph)?;
        let mut tree = self.build_tree(graph.node_count(), &walks)?;
        let stats = self.train(&mut tree, &walks)?;
        tracing::info!(
            nodes = tree.num_leaves(),
            dim = tree.dim(),
            examples = stats.examples,
            mean_loss = stats.mean_loss(),
            "trained embeddings"
        );
        Ok((tree.get_node_embeddings(), stats))
    }

    pub fn fit_with_stats(&self, graph: &Graph) -> Result<(NodeEmbeddings, TrainStats)> {
        let (vectors, stats) = self.fit_adjacency(graph)?;
        let ids = graph.nodes().cloned().collect();
        Ok((NodeEmbeddings::new(ids, vectors)?, stats))
    }

    pub fn fit(&self, graph: &Graph) -> Result<NodeEmbeddings> {
        self.fit_with_stats(graph).map(|(emb, _)| emb)
    }
}

/// Trained node embeddings: row `i` of `vectors` belongs to `ids[i]`.
#[derive(Debug, Clone)]
pub struct NodeEmbeddings {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    vectors: Array2<f32>,
}

impl NodeEmbeddings {
    pub fn new(ids: Vec<NodeId>, vectors: Array2<f32>) -> Result<Self> {
        if ids.len() != vectors.nrows() {
            return Err(Error::InvalidConfig(format!(
                "{} ids for {} embedding rows",
                ids.len(),
                vectors.nrows()
            )));
        }
        let index = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
        Ok(Self { ids, index, vectors })
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// `[N, D]` matrix.
    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    pub fn into_vectors(self) -> Array2<f32> {
        self.vectors
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn get(&self, id: &NodeId) -> Option<ArrayView1<'_, f32>> {
        self.index.get(id).map(|&i| self.vectors.row(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, ArrayView1<'_, f32>)> {
        self.ids.iter().zip(self.vectors.rows())
    }

    /// Write the matrix as a `.npy` array of shape `[N, D]`.
    pub fn write_npy(&self, path: impl AsRef<Path>) -> Result<()> {
        ndarray_npy::write_npy(path, &self.vectors)?;
        Ok(())
    }

    /// Write node ids, one per line, in row order.
    pub fn write_ids(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for id in &self.ids {
            writeln!(out, "{id}")?;
        }
        out.flush()?;
        Ok(())
    }
}
