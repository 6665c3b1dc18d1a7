//! Uniform random walk generation (DeepWalk).
//!
//! Every node starts `walks_per_node` walks. Each step moves to a uniformly
//! chosen neighbor of the current node; a node without neighbors ends the
//! walk early, so a walk from an isolated node has length 1.
//!
//! ## Determinism
//!
//! - `seed: Some(s)` - walks are reproducible.
//! - `seed: None` - the generator is seeded from the OS.
//!
//! Sequential generation draws every walk from one `XorShiftRng`. Parallel
//! generation (rayon, opt-in) seeds one generator per start node with
//! `seed + node`, so its output is reproducible and independent of the
//! thread count but differs from the sequential stream.

use crate::{Adjacency, Error, Result};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A walk: node indices in visiting order.
pub type Walk = Vec<u32>;

/// Configuration for random walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Number of walks to start from each node.
    pub walks_per_node: usize,
    /// Maximum length of each walk, including the start node.
    pub steps_per_walk: usize,
    /// Random seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Generate walks on the rayon pool.
    pub parallel: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            walks_per_node: 5,
            steps_per_walk: 10,
            seed: None,
            parallel: false,
        }
    }
}

impl WalkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.walks_per_node == 0 {
            return Err(Error::InvalidConfig(
                "walks_per_node must be > 0".to_string(),
            ));
        }
        if self.steps_per_walk == 0 {
            return Err(Error::InvalidConfig(
                "steps_per_walk must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate walks for all nodes in the graph.
pub fn generate_walks<G: Adjacency + Sync>(graph: &G, config: &WalkConfig) -> Result<Vec<Walk>> {
    let mut walker = RandomWalker::new(graph, config.seed);
    if config.parallel {
        walker.process_parallel(config.walks_per_node, config.steps_per_walk)?;
    } else {
        walker.process(config.walks_per_node, config.steps_per_walk)?;
    }
    Ok(walker.into_traces())
}

/// Uniform random walker over an [`Adjacency`].
///
/// Owns the corpus (`traces`) it produces.
pub struct RandomWalker<'a, G> {
    graph: &'a G,
    seed: u64,
    traces: Vec<Walk>,
}

impl<'a, G: Adjacency> RandomWalker<'a, G> {
    /// Create a walker. `seed: None` makes runs non-reproducible.
    pub fn new(graph: &'a G, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            graph,
            seed,
            traces: Vec::new(),
        }
    }

    /// Seed actually in use (drawn from the OS when none was given).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `walks_per_node` walks from every node, in node order.
    ///
    /// Replaces any previously generated corpus.
    pub fn process(&mut self, walks_per_node: usize, steps_per_walk: usize) -> Result<()> {
        self.check(walks_per_node, steps_per_walk)?;

        let n = self.graph.node_count();
        let mut rng = XorShiftRng::seed_from_u64(self.seed);
        let mut buf = Vec::new();
        let mut traces = Vec::with_capacity(n * walks_per_node);

        for start in 0..n as u32 {
            for _ in 0..walks_per_node {
                traces.push(self.walk_from(start, steps_per_walk, &mut rng, &mut buf));
            }
        }

        self.log_corpus(&traces, steps_per_walk);
        self.traces = traces;
        Ok(())
    }

    /// Parallel variant of [`RandomWalker::process`].
    ///
    /// Output keeps node-major order; only the random stream differs.
    pub fn process_parallel(&mut self, walks_per_node: usize, steps_per_walk: usize) -> Result<()>
    where
        G: Sync,
    {
        self.check(walks_per_node, steps_per_walk)?;

        let n = self.graph.node_count();
        let traces: Vec<Walk> = (0..n as u32)
            .into_par_iter()
            .flat_map_iter(|start| {
                let mut rng = XorShiftRng::seed_from_u64(self.seed.wrapping_add(u64::from(start)));
                let mut buf = Vec::new();
                (0..walks_per_node)
                    .map(|_| self.walk_from(start, steps_per_walk, &mut rng, &mut buf))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.log_corpus(&traces, steps_per_walk);
        self.traces = traces;
        Ok(())
    }

    /// Single uniform walk - O(deg) per step for neighbor collection.
    fn walk_from<R: Rng>(
        &self,
        start: u32,
        steps_per_walk: usize,
        rng: &mut R,
        buf: &mut Vec<u32>,
    ) -> Walk {
        let mut walk = Vec::with_capacity(steps_per_walk);
        walk.push(start);

        let mut curr = start;
        for _ in 1..steps_per_walk {
            buf.clear();
            buf.extend(self.graph.neighbors(curr));
            match buf.choose(rng) {
                Some(&next) => {
                    walk.push(next);
                    curr = next;
                }
                None => break,
            }
        }
        walk
    }

    fn check(&self, walks_per_node: usize, steps_per_walk: usize) -> Result<()> {
        WalkConfig {
            walks_per_node,
            steps_per_walk,
            seed: Some(self.seed),
            parallel: false,
        }
        .validate()?;
        if self.graph.node_count() == 0 {
            return Err(Error::EmptyGraph);
        }
        Ok(())
    }

    fn log_corpus(&self, traces: &[Walk], steps_per_walk: usize) {
        let truncated = traces.iter().filter(|w| w.len() < steps_per_walk).count();
        tracing::debug!(
            walks = traces.len(),
            steps = traces.iter().map(Vec::len).sum::<usize>(),
            truncated,
            seed = self.seed,
            "generated random walks"
        );
    }

    /// The generated corpus.
    pub fn traces(&self) -> &[Walk] {
        &self.traces
    }

    /// Consume the walker, returning the corpus.
    pub fn into_traces(self) -> Vec<Walk> {
        self.traces
    }

    /// Occurrences of each node across the corpus.
    pub fn visit_counts(&self) -> Vec<u64> {
        visit_counts(&self.traces, self.graph.node_count())
    }
}

/// Occurrences of each node index across `walks`.
///
/// Indices `>= num_nodes` are ignored.
pub fn visit_counts(walks: &[Walk], num_nodes: usize) -> Vec<u64> {
    let mut counts = vec![0u64; num_nodes];
    for &node in walks.iter().flatten() {
        if let Some(c) = counts.get_mut(node as usize) {
            *c += 1;
        }
    }
    counts
}
