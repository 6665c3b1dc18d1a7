//! Binary tree for hierarchical softmax.
//!
//! # The Idea
//!
//! A full softmax over N nodes costs O(N) per training example. Hierarchical
//! softmax places the nodes at the leaves of a binary tree and factors
//! `P(context | target)` into the product of binary decisions along the
//! root-to-leaf path:
//!
//! ```text
//! P(w | u) = Π_{(n, bit) ∈ path(w)} σ(±v_n · u)
//! ```
//!
//! so each example touches only O(log N) internal-node vectors.
//!
//! # Shapes
//!
//! - [`TreeShape::Balanced`] (default): heap layout over `2N - 1` slots.
//!   Slot `s` has children `2s + 1` (bit 0) and `2s + 2` (bit 1). Slots below
//!   `N - 1` are internal nodes, the rest are leaves in node order. Code
//!   lengths are `⌊log2 N⌋` or `⌈log2 N⌉`.
//! - [`TreeShape::Huffman`]: word2vec-style Huffman merge on per-node
//!   frequencies. The two lightest subtrees are merged repeatedly (lighter
//!   one on the left); ties break on creation order, leaves before internal
//!   nodes, so the shape is deterministic.
//!
//! # Initialization
//!
//! Leaf vectors are drawn uniformly from `[-0.5/D, 0.5/D)` with an
//! `XorShiftRng` seeded by the caller. Internal vectors start at zero.

use crate::arena::VectorArena;
use crate::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Distribution, Uniform};
use rand_xorshift::XorShiftRng;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Reference to a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeRef {
    /// Leaf for graph node index `u32`.
    Leaf(u32),
    /// Internal node index `u32`.
    Internal(u32),
}

/// Tree construction policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TreeShape {
    #[default]
    Balanced,
    /// Huffman tree over one frequency per leaf.
    Huffman(Vec<u64>),
}

/// Root-to-leaf path: internal node indices and the branch bit taken at each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path<'a> {
    points: &'a [u32],
    codes: &'a [u8],
}

impl<'a> Path<'a> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Internal node indices, root first.
    pub fn points(&self) -> &'a [u32] {
        self.points
    }

    /// Branch bits, root first (0 = left, 1 = right).
    pub fn codes(&self) -> &'a [u8] {
        self.codes
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + 'a {
        self.points.iter().copied().zip(self.codes.iter().copied())
    }
}

/// All leaf paths in CSR layout.
#[derive(Debug, Clone)]
pub struct PathIndex {
    offsets: Vec<usize>,
    points: Vec<u32>,
    codes: Vec<u8>,
}

impl PathIndex {
    /// Path of `leaf`. Panics if out of range.
    #[inline]
    pub fn get(&self, leaf: usize) -> Path<'_> {
        let (start, end) = (self.offsets[leaf], self.offsets[leaf + 1]);
        Path {
            points: &self.points[start..end],
            codes: &self.codes[start..end],
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disjoint borrows used by the training loops.
///
/// Paths are read-only; both vector arenas are mutable.
pub struct UpdateView<'a> {
    pub paths: &'a PathIndex,
    pub leaves: &'a mut VectorArena,
    pub internals: &'a mut VectorArena,
}

/// Hierarchical-softmax tree over `N` leaves.
///
/// Owns every leaf embedding, every internal decision vector and the path
/// index. Leaf `i` is graph node `i`.
#[derive(Debug, Clone)]
pub struct BinaryTree {
    leaves: VectorArena,
    internals: VectorArena,
    children: Vec<[TreeRef; 2]>,
    root: TreeRef,
    paths: PathIndex,
}

impl BinaryTree {
    /// Balanced tree with seeded leaf initialization.
    pub fn new(num_leaves: usize, dim: usize, seed: u64) -> Result<Self> {
        Self::with_shape(num_leaves, dim, &TreeShape::Balanced, seed)
    }

    /// Tree of the given shape with seeded leaf initialization.
    pub fn with_shape(num_leaves: usize, dim: usize, shape: &TreeShape, seed: u64) -> Result<Self> {
        if num_leaves == 0 {
            return Err(Error::InvalidConfig(
                "tree needs at least one leaf".to_string(),
            ));
        }
        if dim == 0 {
            return Err(Error::InvalidConfig("n_dims must be > 0".to_string()));
        }
        if num_leaves > u32::MAX as usize / 2 {
            return Err(Error::InvalidConfig(format!(
                "too many leaves for u32 indices: {num_leaves}"
            )));
        }

        let (children, root) = match shape {
            TreeShape::Balanced => balanced_children(num_leaves),
            TreeShape::Huffman(freqs) => {
                if freqs.len() != num_leaves {
                    return Err(Error::InvalidConfig(format!(
                        "huffman tree needs {num_leaves} frequencies, got {}",
                        freqs.len()
                    )));
                }
                huffman_children(freqs)
            }
        };
        let paths = build_paths(&children, root, num_leaves);

        let mut rng = XorShiftRng::seed_from_u64(seed);
        let bound = 0.5 / dim as f32;
        let dist = Uniform::new(-bound, bound)
            .map_err(|e| Error::InvalidConfig(format!("init range: {e}")))?;
        let leaves = VectorArena::from_fn(num_leaves, dim, || dist.sample(&mut rng));
        let internals = VectorArena::zeros(num_leaves - 1, dim);

        let tree = Self {
            leaves,
            internals,
            children,
            root,
            paths,
        };
        tracing::debug!(
            leaves = num_leaves,
            dim,
            max_code_len = tree.max_code_len(),
            "built hierarchical softmax tree"
        );
        Ok(tree)
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    pub fn num_internal(&self) -> usize {
        self.children.len()
    }

    /// Total node count, `2N - 1`.
    pub fn num_nodes(&self) -> usize {
        self.num_leaves() + self.num_internal()
    }

    pub fn dim(&self) -> usize {
        self.leaves.dim()
    }

    pub fn root(&self) -> TreeRef {
        self.root
    }

    pub fn contains_leaf(&self, node: u32) -> bool {
        (node as usize) < self.num_leaves()
    }

    /// `[left, right]` children of an internal node.
    pub fn children(&self, internal: u32) -> Result<[TreeRef; 2]> {
        self.children
            .get(internal as usize)
            .copied()
            .ok_or(Error::UnknownInternal {
                index: internal,
                num_internal: self.num_internal(),
            })
    }

    /// Root-to-leaf path for `node`.
    ///
    /// Empty for a single-leaf tree.
    pub fn path_to(&self, node: u32) -> Result<Path<'_>> {
        self.check_leaf(node)?;
        Ok(self.paths.get(node as usize))
    }

    /// Follow branch bits from the root.
    ///
    /// Returns `None` if a bit is applied at a leaf or is not 0/1.
    pub fn follow(&self, codes: &[u8]) -> Option<TreeRef> {
        let mut at = self.root;
        for &bit in codes {
            match at {
                TreeRef::Internal(i) if bit <= 1 => {
                    at = self.children[i as usize][bit as usize];
                }
                _ => return None,
            }
        }
        Some(at)
    }

    pub fn max_code_len(&self) -> usize {
        (0..self.num_leaves())
            .map(|i| self.paths.get(i).len())
            .max()
            .unwrap_or(0)
    }

    pub fn leaf_vector(&self, node: u32) -> Result<&[f32]> {
        self.check_leaf(node)?;
        Ok(self.leaves.row(node as usize))
    }

    pub fn leaf_vector_mut(&mut self, node: u32) -> Result<&mut [f32]> {
        self.check_leaf(node)?;
        Ok(self.leaves.row_mut(node as usize))
    }

    pub fn internal_vector(&self, index: u32) -> Result<&[f32]> {
        self.check_internal(index)?;
        Ok(self.internals.row(index as usize))
    }

    pub fn internal_vector_mut(&mut self, index: u32) -> Result<&mut [f32]> {
        self.check_internal(index)?;
        Ok(self.internals.row_mut(index as usize))
    }

    pub fn leaves(&self) -> &VectorArena {
        &self.leaves
    }

    pub fn internals(&self) -> &VectorArena {
        &self.internals
    }

    /// Split borrows for in-place training updates.
    pub fn update_view(&mut self) -> UpdateView<'_> {
        UpdateView {
            paths: &self.paths,
            leaves: &mut self.leaves,
            internals: &mut self.internals,
        }
    }

    /// Leaf embeddings as an `[N, D]` matrix, row `i` = node `i`.
    pub fn get_node_embeddings(&self) -> Array2<f32> {
        let dim = self.dim();
        let data = self.leaves.as_slice();
        Array2::from_shape_fn((self.num_leaves(), dim), |(i, j)| data[i * dim + j])
    }

    fn check_leaf(&self, node: u32) -> Result<()> {
        if self.contains_leaf(node) {
            Ok(())
        } else {
            Err(Error::UnknownNode {
                node,
                num_leaves: self.num_leaves(),
            })
        }
    }

    fn check_internal(&self, index: u32) -> Result<()> {
        if (index as usize) < self.num_internal() {
            Ok(())
        } else {
            Err(Error::UnknownInternal {
                index,
                num_internal: self.num_internal(),
            })
        }
    }
}

fn balanced_children(num_leaves: usize) -> (Vec<[TreeRef; 2]>, TreeRef) {
    if num_leaves == 1 {
        return (Vec::new(), TreeRef::Leaf(0));
    }
    let num_internal = num_leaves - 1;
    let slot = |s: usize| {
        if s < num_internal {
            TreeRef::Internal(s as u32)
        } else {
            TreeRef::Leaf((s - num_internal) as u32)
        }
    };
    let children = (0..num_internal)
        .map(|s| [slot(2 * s + 1), slot(2 * s + 2)])
        .collect();
    (children, TreeRef::Internal(0))
}

fn huffman_children(freqs: &[u64]) -> (Vec<[TreeRef; 2]>, TreeRef) {
    let n = freqs.len();
    if n == 1 {
        return (Vec::new(), TreeRef::Leaf(0));
    }

    // (weight, creation order, node); leaves are created first.
    let mut heap: BinaryHeap<Reverse<(u64, usize, TreeRefKey)>> = freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| Reverse((f, i, TreeRefKey::Leaf(i as u32))))
        .collect();

    let mut children = Vec::with_capacity(n - 1);
    while heap.len() > 1 {
        let (Some(Reverse((w0, _, left))), Some(Reverse((w1, _, right)))) = (heap.pop(), heap.pop())
        else {
            break;
        };
        let id = children.len() as u32;
        children.push([left.into(), right.into()]);
        heap.push(Reverse((
            w0.saturating_add(w1),
            n + id as usize,
            TreeRefKey::Internal(id),
        )));
    }
    let root = TreeRef::Internal((children.len() - 1) as u32);
    (children, root)
}

/// Orderable mirror of [`TreeRef`] for the Huffman heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TreeRefKey {
    Leaf(u32),
    Internal(u32),
}

impl From<TreeRefKey> for TreeRef {
    fn from(k: TreeRefKey) -> Self {
        match k {
            TreeRefKey::Leaf(i) => TreeRef::Leaf(i),
            TreeRefKey::Internal(i) => TreeRef::Internal(i),
        }
    }
}

fn build_paths(children: &[[TreeRef; 2]], root: TreeRef, num_leaves: usize) -> PathIndex {
    // Parent pointers: (parent internal index, bit) for every leaf / internal.
    let mut leaf_parent: Vec<Option<(u32, u8)>> = vec![None; num_leaves];
    let mut internal_parent: Vec<Option<(u32, u8)>> = vec![None; children.len()];
    for (p, pair) in children.iter().enumerate() {
        for (bit, child) in pair.iter().enumerate() {
            let link = Some((p as u32, bit as u8));
            match *child {
                TreeRef::Leaf(l) => leaf_parent[l as usize] = link,
                TreeRef::Internal(i) => internal_parent[i as usize] = link,
            }
        }
    }
    debug_assert!(match root {
        TreeRef::Internal(r) => internal_parent[r as usize].is_none(),
        TreeRef::Leaf(_) => children.is_empty(),
    });

    let mut offsets = Vec::with_capacity(num_leaves + 1);
    let mut points = Vec::new();
    let mut codes = Vec::new();
    let mut scratch = Vec::new();
    offsets.push(0);

    for leaf in 0..num_leaves {
        scratch.clear();
        let mut up = leaf_parent[leaf];
        while let Some((p, bit)) = up {
            scratch.push((p, bit));
            up = internal_parent[p as usize];
        }
        for &(p, bit) in scratch.iter().rev() {
            points.push(p);
            codes.push(bit);
        }
        offsets.push(points.len());
    }

    PathIndex {
        offsets,
        points,
        codes,
    }
}
