//! Skip-gram training with hierarchical softmax (DeepWalk).
//!
//! # The Core Insight
//!
//! Nodes appearing in similar random walk contexts should have similar
//! embeddings. Walks are "sentences," nodes are "words," and each node is
//! asked to predict its neighbors within a window.
//!
//! # Objective
//!
//! For a walk `[n_0, ..., n_{L-1}]` and window `k`, every `(n_i, n_j)` with
//! `0 < |i - j| <= k` is an example: `n_i` is the target, `n_j` the context.
//! The context's probability is factored along its tree path (see
//! [`crate::tree`]):
//!
//! ```text
//! L = -Σ_{(n, bit) ∈ path(ctx)} log σ(s · v_n · u),   s = +1 if bit = 0 else -1
//! ```
//!
//! Bit 0 (left) is the positive label: `σ(v_n · u)` is the probability of
//! branching left.
//!
//! # Update
//!
//! ```text
//! grad = 0
//! for (n, bit) in path(ctx):
//!     f = σ(clamp(v_n · u, ±6))
//!     g = lr * ((1 - bit) - f)
//!     grad += g * v_n
//!     v_n  += g * u          // applied immediately
//! u += grad
//! ```
//!
//! Internal vectors change in place, so a later node on the same path (or a
//! later example sharing an ancestor) sees the updated value. This is plain
//! online SGD and must stay that way for results to match a sequential
//! reference.
//!
//! # Example
//!
//! ```rust
//! use deepwalk_nn::{BinaryTree, SkipGram, SkipGramConfig};
//!
//! let mut tree = BinaryTree::new(4, 8, 42).unwrap();
//! let walks = vec![vec![0, 1, 2, 3], vec![3, 2, 1, 0]];
//!
//! let mut model = SkipGram::new(SkipGramConfig {
//!     window_size: 2,
//!     ..Default::default()
//! })
//! .unwrap();
//! let stats = model.train(&mut tree, &walks).unwrap();
//! assert_eq!(stats.examples, 2 * 10);
//! ```
//!
//! # References
//!
//! - Perozzi, Al-Rfou & Skiena (2014). "DeepWalk: Online Learning of Social Representations."
//! - Mikolov et al. (2013). "Distributed Representations of Words and Phrases."
//! - Morin & Bengio (2005). "Hierarchical Probabilistic Neural Network Language Model."

use crate::tree::{BinaryTree, UpdateView};
use crate::vecops::{axpy, dot, sigmoid_clipped};
use crate::{hogwild, Error, Result};
use serde::{Deserialize, Serialize};

/// Learning-rate schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LrSchedule {
    /// Same learning rate for every example.
    #[default]
    Constant,
    /// Linear decay from `learning_rate` to `min_learning_rate` over all
    /// examples of all epochs.
    Linear,
}

/// Skip-gram trainer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipGramConfig {
    /// Context window size (each side).
    pub window_size: usize,
    /// Initial learning rate. Zero is accepted and leaves every vector unchanged.
    pub learning_rate: f32,
    /// Floor for [`LrSchedule::Linear`].
    pub min_learning_rate: f32,
    /// Passes over the corpus.
    pub epochs: usize,
    pub schedule: LrSchedule,
    /// Fraction of clipped sigmoid evaluations per epoch above which a
    /// numeric-instability warning is logged.
    pub clip_warn_ratio: f64,
    /// Lock-free parallel training. Not reproducible.
    pub hogwild: bool,
    /// Worker threads for hogwild training (`None` = rayon default).
    pub threads: Option<usize>,
}

impl Default for SkipGramConfig {
    fn default() -> Self {
        Self {
            window_size: 2,
            learning_rate: 0.025,
            min_learning_rate: 0.0001,
            epochs: 1,
            schedule: LrSchedule::Constant,
            clip_warn_ratio: 0.01,
            hogwild: false,
            threads: None,
        }
    }
}

impl SkipGramConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window_size must be > 0".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if self.schedule == LrSchedule::Linear
            && !(0.0..=self.learning_rate).contains(&self.min_learning_rate)
        {
            return Err(Error::InvalidConfig(format!(
                "min_learning_rate must be in [0, {}], got {}",
                self.learning_rate, self.min_learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.clip_warn_ratio) {
            return Err(Error::InvalidConfig(format!(
                "clip_warn_ratio must be in [0, 1], got {}",
                self.clip_warn_ratio
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("threads must be > 0".to_string()));
        }
        Ok(())
    }

    /// Learning rate after `processed` of `total` examples.
    pub fn learning_rate_at(&self, processed: u64, total: u64) -> f32 {
        match self.schedule {
            LrSchedule::Constant => self.learning_rate,
            LrSchedule::Linear => {
                if total == 0 {
                    return self.learning_rate;
                }
                let progress = processed as f32 / total as f32;
                let lr = self.learning_rate
                    - (self.learning_rate - self.min_learning_rate) * progress;
                lr.max(self.min_learning_rate)
            }
        }
    }
}

/// Counters for one pass (or part of one).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassStats {
    /// (target, context) examples processed.
    pub examples: u64,
    /// Sigmoid evaluations (one per path step).
    pub sigmoid_evals: u64,
    /// Evaluations whose argument was clamped.
    pub clipped: u64,
    /// Summed binary cross-entropy over all path decisions.
    pub loss: f64,
}

impl PassStats {
    pub fn merge(mut self, other: Self) -> Self {
        self.examples += other.examples;
        self.sigmoid_evals += other.sigmoid_evals;
        self.clipped += other.clipped;
        self.loss += other.loss;
        self
    }

    pub fn clip_ratio(&self) -> f64 {
        if self.sigmoid_evals == 0 {
            0.0
        } else {
            self.clipped as f64 / self.sigmoid_evals as f64
        }
    }

    pub(crate) fn record(&mut self, f: f32, bit: u8, clipped: bool) {
        self.sigmoid_evals += 1;
        if clipped {
            self.clipped += 1;
        }
        let p = if bit == 0 { f } else { 1.0 - f };
        self.loss -= f64::from(p).ln();
    }
}

/// Summary of a [`SkipGram::train`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainStats {
    pub epochs: usize,
    pub examples: u64,
    pub sigmoid_evals: u64,
    pub clipped: u64,
    pub loss: f64,
    /// Learning rate used for the last example.
    pub final_learning_rate: f32,
    /// Epochs whose clip ratio exceeded `clip_warn_ratio`.
    pub instability_warnings: usize,
}

impl TrainStats {
    /// Mean loss per sigmoid evaluation.
    pub fn mean_loss(&self) -> f64 {
        if self.sigmoid_evals == 0 {
            0.0
        } else {
            self.loss / self.sigmoid_evals as f64
        }
    }

    pub fn clip_ratio(&self) -> f64 {
        if self.sigmoid_evals == 0 {
            0.0
        } else {
            self.clipped as f64 / self.sigmoid_evals as f64
        }
    }

    pub(crate) fn absorb_epoch(&mut self, epoch: usize, pass: PassStats, config: &SkipGramConfig) {
        self.epochs += 1;
        self.examples += pass.examples;
        self.sigmoid_evals += pass.sigmoid_evals;
        self.clipped += pass.clipped;
        self.loss += pass.loss;

        let ratio = pass.clip_ratio();
        if ratio > config.clip_warn_ratio {
            self.instability_warnings += 1;
            tracing::warn!(
                epoch,
                clipped = pass.clipped,
                evaluations = pass.sigmoid_evals,
                ratio,
                "numeric instability: sigmoid inputs clipped frequently, learning rate may be too high"
            );
        }
        tracing::debug!(
            epoch,
            examples = pass.examples,
            mean_loss = if pass.sigmoid_evals == 0 {
                0.0
            } else {
                pass.loss / pass.sigmoid_evals as f64
            },
            "finished epoch"
        );
    }
}

/// Hierarchical-softmax skip-gram trainer.
///
/// Owns no vectors: it mutates the [`BinaryTree`] passed to [`SkipGram::train`]
/// and keeps only the learning-rate schedule state.
#[derive(Debug, Clone)]
pub struct SkipGram {
    config: SkipGramConfig,
    current_lr: f32,
    examples_processed: u64,
    total_examples: u64,
}

impl SkipGram {
    pub fn new(config: SkipGramConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            current_lr: config.learning_rate,
            config,
            examples_processed: 0,
            total_examples: 0,
        })
    }

    pub fn config(&self) -> &SkipGramConfig {
        &self.config
    }

    pub fn current_learning_rate(&self) -> f32 {
        self.current_lr
    }

    pub fn examples_processed(&self) -> u64 {
        self.examples_processed
    }

    /// Set the example count the linear schedule decays over.
    ///
    /// [`SkipGram::train`] sets this itself; only needed when driving
    /// [`SkipGram::train_walk`] directly.
    pub fn set_total_examples(&mut self, total: u64) {
        self.total_examples = total;
    }

    /// Train on every walk for `epochs` passes.
    ///
    /// Fails with [`Error::EmptyCorpus`] on an empty corpus and with
    /// [`Error::UnknownWalkNode`] if any walk references a node outside the tree;
    /// both are checked before the first update.
    pub fn train(&mut self, tree: &mut BinaryTree, walks: &[Vec<u32>]) -> Result<TrainStats> {
        if walks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        validate_corpus(tree, walks)?;

        let per_epoch: u64 = walks
            .iter()
            .map(|w| count_examples(w.len(), self.config.window_size))
            .sum();
        self.total_examples = per_epoch * self.config.epochs as u64;
        self.examples_processed = 0;
        self.current_lr = self.config.learning_rate;

        tracing::info!(
            walks = walks.len(),
            examples = self.total_examples,
            epochs = self.config.epochs,
            window = self.config.window_size,
            lr = self.config.learning_rate,
            hogwild = self.config.hogwild,
            "training skip-gram"
        );

        if self.config.hogwild {
            let stats = hogwild::train(&self.config, tree, walks, self.total_examples)?;
            self.examples_processed = stats.examples;
            self.current_lr = stats.final_learning_rate;
            return Ok(stats);
        }

        let mut stats = TrainStats::default();
        let mut grad = vec![0.0f32; tree.dim()];
        for epoch in 0..self.config.epochs {
            let mut pass = PassStats::default();
            let mut view = tree.update_view();
            for walk in walks {
                pass = pass.merge(self.train_walk_unchecked(&mut view, walk, &mut grad));
            }
            stats.absorb_epoch(epoch, pass, &self.config);
        }
        stats.final_learning_rate = self.current_lr;
        Ok(stats)
    }

    /// Train on a single walk (one pass).
    ///
    /// A bad node is reported as walk 0.
    pub fn train_walk(&mut self, tree: &mut BinaryTree, walk: &[u32]) -> Result<PassStats> {
        check_walk(tree, 0, walk)?;
        let mut grad = vec![0.0f32; tree.dim()];
        let mut view = tree.update_view();
        Ok(self.train_walk_unchecked(&mut view, walk, &mut grad))
    }

    fn train_walk_unchecked(
        &mut self,
        view: &mut UpdateView<'_>,
        walk: &[u32],
        grad: &mut [f32],
    ) -> PassStats {
        let window = self.config.window_size;
        let mut pass = PassStats::default();

        for (pos, &target) in walk.iter().enumerate() {
            let start = pos.saturating_sub(window);
            let end = (pos + window + 1).min(walk.len());

            for ctx_pos in start..end {
                if ctx_pos == pos {
                    continue;
                }
                self.update_lr();
                hs_update(view, target, walk[ctx_pos], self.current_lr, grad, &mut pass);
                self.examples_processed += 1;
            }
        }
        pass
    }

    fn update_lr(&mut self) {
        self.current_lr = self
            .config
            .learning_rate_at(self.examples_processed, self.total_examples);
    }
}

/// One hierarchical-softmax step for `(target, context)`.
///
/// `grad` is scratch space of length `D`.
pub(crate) fn hs_update(
    view: &mut UpdateView<'_>,
    target: u32,
    context: u32,
    lr: f32,
    grad: &mut [f32],
    pass: &mut PassStats,
) {
    let path = view.paths.get(context as usize);
    pass.examples += 1;
    if path.is_empty() {
        return;
    }

    grad.fill(0.0);
    let u = view.leaves.row(target as usize);
    for (point, bit) in path.iter() {
        let v = view.internals.row_mut(point as usize);
        let (f, clipped) = sigmoid_clipped(dot(v, u));
        pass.record(f, bit, clipped);

        let g = lr * ((1.0 - f32::from(bit)) - f);
        axpy(g, v, grad);
        axpy(g, u, v);
    }
    axpy(1.0, grad, view.leaves.row_mut(target as usize));
}

/// Examples a walk of length `len` yields with window `window`.
pub fn count_examples(len: usize, window: usize) -> u64 {
    (0..len)
        .map(|i| (i.min(window) + (len - 1 - i).min(window)) as u64)
        .sum()
}

fn validate_corpus(tree: &BinaryTree, walks: &[Vec<u32>]) -> Result<()> {
    walks
        .iter()
        .enumerate()
        .try_for_each(|(w, walk)| check_walk(tree, w, walk))
}

fn check_walk(tree: &BinaryTree, walk_index: usize, walk: &[u32]) -> Result<()> {
    match walk.iter().enumerate().find(|&(_, &n)| !tree.contains_leaf(n)) {
        Some((position, &node)) => {
            tracing::error!(walk = walk_index, position, node, "walk references node outside the tree");
            Err(Error::UnknownWalkNode {
                walk: walk_index,
                position,
                node,
                num_leaves: tree.num_leaves(),
            })
        }
        None => Ok(()),
    }
}
