//! Lock-free parallel training (Hogwild).
//!
//! Opt-in via [`SkipGramConfig::hogwild`]. Vectors are copied into arenas of
//! `AtomicU32` (f32 bit patterns) and walks are processed on a rayon pool.
//! Element reads and writes are individually atomic but the read-modify-write
//! of a vector is not: concurrent examples sharing an ancestor may overwrite
//! each other's updates. That staleness is the accepted approximation of
//! Recht et al. (2011); results are not reproducible run to run.
//!
//! Everything is copied back into the tree when the last epoch finishes.

use crate::arena::VectorArena;
use crate::skipgram::{PassStats, SkipGramConfig, TrainStats};
use crate::tree::{BinaryTree, PathIndex};
use crate::vecops::{axpy, dot, sigmoid_clipped};
use crate::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

struct AtomicArena {
    dim: usize,
    data: Vec<AtomicU32>,
}

impl AtomicArena {
    fn from_arena(arena: &VectorArena) -> Self {
        Self {
            dim: arena.dim(),
            data: arena
                .as_slice()
                .iter()
                .map(|x| AtomicU32::new(x.to_bits()))
                .collect(),
        }
    }

    #[inline]
    fn load_row(&self, row: usize, out: &mut [f32]) {
        let base = row * self.dim;
        for (i, o) in out.iter_mut().enumerate() {
            *o = f32::from_bits(self.data[base + i].load(Ordering::Relaxed));
        }
    }

    #[inline]
    fn add_row(&self, row: usize, alpha: f32, x: &[f32]) {
        let base = row * self.dim;
        for (i, xi) in x.iter().enumerate() {
            let cell = &self.data[base + i];
            let cur = f32::from_bits(cell.load(Ordering::Relaxed));
            cell.store((cur + alpha * xi).to_bits(), Ordering::Relaxed);
        }
    }

    fn write_back(&self, arena: &mut VectorArena) {
        for (dst, src) in arena.as_mut_slice().iter_mut().zip(&self.data) {
            *dst = f32::from_bits(src.load(Ordering::Relaxed));
        }
    }
}

struct Scratch {
    u: Vec<f32>,
    v: Vec<f32>,
    grad: Vec<f32>,
}

/// Hogwild counterpart of the sequential loop in `SkipGram::train`.
///
/// The corpus has already been validated against the tree.
pub(crate) fn train(
    config: &SkipGramConfig,
    tree: &mut BinaryTree,
    walks: &[Vec<u32>],
    total_examples: u64,
) -> Result<TrainStats> {
    let dim = tree.dim();
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let view = tree.update_view();
    let paths: &PathIndex = view.paths;
    let leaves = AtomicArena::from_arena(view.leaves);
    let internals = AtomicArena::from_arena(view.internals);
    let processed = AtomicU64::new(0);

    tracing::debug!(threads = pool.current_num_threads(), "hogwild training");

    let mut stats = TrainStats::default();
    for epoch in 0..config.epochs {
        let pass = pool.install(|| {
            walks
                .par_iter()
                .map_init(
                    || Scratch {
                        u: vec![0.0; dim],
                        v: vec![0.0; dim],
                        grad: vec![0.0; dim],
                    },
                    |scratch, walk| {
                        train_walk(
                            config,
                            paths,
                            &leaves,
                            &internals,
                            walk,
                            &processed,
                            total_examples,
                            scratch,
                        )
                    },
                )
                .reduce(PassStats::default, PassStats::merge)
        });
        stats.absorb_epoch(epoch, pass, config);
    }

    leaves.write_back(view.leaves);
    internals.write_back(view.internals);
    let done = processed.load(Ordering::Relaxed);
    stats.final_learning_rate = config.learning_rate_at(done.saturating_sub(1), total_examples);
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn train_walk(
    config: &SkipGramConfig,
    paths: &PathIndex,
    leaves: &AtomicArena,
    internals: &AtomicArena,
    walk: &[u32],
    processed: &AtomicU64,
    total_examples: u64,
    scratch: &mut Scratch,
) -> PassStats {
    let window = config.window_size;
    let mut pass = PassStats::default();

    for (pos, &target) in walk.iter().enumerate() {
        let start = pos.saturating_sub(window);
        let end = (pos + window + 1).min(walk.len());

        for ctx_pos in start..end {
            if ctx_pos == pos {
                continue;
            }
            let done = processed.fetch_add(1, Ordering::Relaxed);
            let lr = config.learning_rate_at(done, total_examples);
            pass.examples += 1;

            let path = paths.get(walk[ctx_pos] as usize);
            if path.is_empty() {
                continue;
            }

            leaves.load_row(target as usize, &mut scratch.u);
            scratch.grad.fill(0.0);
            for (point, bit) in path.iter() {
                internals.load_row(point as usize, &mut scratch.v);
                let (f, clipped) = sigmoid_clipped(dot(&scratch.v, &scratch.u));
                pass.record(f, bit, clipped);

                let g = lr * ((1.0 - f32::from(bit)) - f);
                axpy(g, &scratch.v, &mut scratch.grad);
                internals.add_row(point as usize, g, &scratch.u);
            }
            leaves.add_row(target as usize, 1.0, &scratch.grad);
        }
    }
    pass
}
