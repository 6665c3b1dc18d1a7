//! End-to-end pipeline tests against a plain f64 reference trainer.

use deepwalk::{
    DeepWalk, DeepWalkConfig, Error, Graph, NodeId, SkipGram, SkipGramConfig, TreeShapeKind, Walk,
};
use deepwalk_nn::BinaryTree;
use proptest::prelude::*;

/// Snapshot of a tree's parameters plus its paths, trained in f64.
struct Reference {
    dim: usize,
    leaves: Vec<Vec<f64>>,
    internals: Vec<Vec<f64>>,
    paths: Vec<Vec<(usize, u8)>>,
}

impl Reference {
    fn snapshot(tree: &BinaryTree) -> Self {
        let leaves = (0..tree.num_leaves() as u32)
            .map(|i| tree.leaf_vector(i).unwrap().iter().map(|&x| x as f64).collect())
            .collect();
        let internals = (0..tree.num_internal() as u32)
            .map(|i| tree.internal_vector(i).unwrap().iter().map(|&x| x as f64).collect())
            .collect();
        let paths = (0..tree.num_leaves() as u32)
            .map(|i| {
                tree.path_to(i)
                    .unwrap()
                    .iter()
                    .map(|(p, c)| (p as usize, c))
                    .collect()
            })
            .collect();
        Self {
            dim: tree.dim(),
            leaves,
            internals,
            paths,
        }
    }

    fn step(&mut self, target: usize, context: usize, lr: f64) {
        let mut grad = vec![0.0; self.dim];
        for &(point, code) in &self.paths[context] {
            let u = &self.leaves[target];
            let v = &mut self.internals[point];
            let x: f64 = v.iter().zip(u).map(|(a, b)| a * b).sum();
            let f = 1.0 / (1.0 + (-x.clamp(-6.0, 6.0)).exp());
            let g = lr * ((1.0 - code as f64) - f);
            for k in 0..self.dim {
                grad[k] += g * v[k];
                v[k] += g * u[k];
            }
        }
        for (u, g) in self.leaves[target].iter_mut().zip(&grad) {
            *u += g;
        }
    }

    fn train(&mut self, walks: &[Walk], window: usize, lr: f64) {
        for walk in walks {
            for (i, &target) in walk.iter().enumerate() {
                for (j, &context) in walk.iter().enumerate() {
                    if i != j && i.abs_diff(j) <= window {
                        self.step(target as usize, context as usize, lr);
                    }
                }
            }
        }
    }
}

fn abc() -> Graph {
    Graph::from_edges(false, [("A", "B"), ("B", "C")])
}

fn abc_config() -> DeepWalkConfig {
    DeepWalkConfig {
        walks_per_node: 1,
        steps_per_walk: 3,
        skipgram_window_size: 1,
        n_dims: 2,
        lr: 0.025,
        seed: Some(42),
        ..Default::default()
    }
}

#[test]
fn abc_walks_are_valid_paths() {
    let graph = abc();
    let dw = DeepWalk::new(abc_config()).unwrap();
    let walks = dw.walks(&graph).unwrap();

    assert_eq!(walks.len(), 3);
    for (start, walk) in walks.iter().enumerate() {
        assert_eq!(walk.len(), 3, "no dead ends in an undirected path");
        assert_eq!(walk[0] as usize, start);
        for pair in walk.windows(2) {
            assert_eq!(pair[0].abs_diff(pair[1]), 1, "A-B-C only links neighbours");
        }
    }
}

#[test]
fn abc_training_matches_reference() {
    let graph = abc();
    let dw = DeepWalk::new(abc_config()).unwrap();
    let walks = dw.walks(&graph).unwrap();
    let mut tree = dw.build_tree(3, &walks).unwrap();

    let mut reference = Reference::snapshot(&tree);
    reference.train(&walks, 1, 0.025);

    let stats = dw.train(&mut tree, &walks).unwrap();
    assert_eq!(stats.examples, 12);

    let emb = tree.get_node_embeddings();
    assert_eq!(emb.shape(), &[3, 2]);
    for (i, row) in reference.leaves.iter().enumerate() {
        for (k, &want) in row.iter().enumerate() {
            assert!(
                (emb[[i, k]] as f64 - want).abs() < 1e-5,
                "leaf {i}[{k}]: {} vs {want}",
                emb[[i, k]]
            );
        }
    }
    for (i, row) in reference.internals.iter().enumerate() {
        let got = tree.internal_vector(i as u32).unwrap();
        for (k, &want) in row.iter().enumerate() {
            assert!((got[k] as f64 - want).abs() < 1e-5);
        }
    }
}

#[test]
fn huffman_training_matches_reference() {
    let graph = Graph::from_edges(false, [("a", "b"), ("b", "c"), ("c", "d"), ("b", "e")]);
    let config = DeepWalkConfig {
        walks_per_node: 2,
        steps_per_walk: 5,
        skipgram_window_size: 2,
        n_dims: 4,
        tree_shape: TreeShapeKind::Huffman,
        seed: Some(3),
        ..Default::default()
    };
    let dw = DeepWalk::new(config).unwrap();
    let walks = dw.walks(&graph).unwrap();
    let mut tree = dw.build_tree(5, &walks).unwrap();

    let mut reference = Reference::snapshot(&tree);
    reference.train(&walks, 2, 0.025);
    dw.train(&mut tree, &walks).unwrap();

    let emb = tree.get_node_embeddings();
    for (i, row) in reference.leaves.iter().enumerate() {
        for (k, &want) in row.iter().enumerate() {
            assert!((emb[[i, k]] as f64 - want).abs() < 1e-4);
        }
    }
}

#[test]
fn fit_rows_follow_node_order() {
    let mut graph = Graph::new(false);
    graph.add_edge("x", "y");
    graph.add_node("lonely");

    let dw = DeepWalk::new(DeepWalkConfig {
        n_dims: 3,
        seed: Some(1),
        ..Default::default()
    })
    .unwrap();
    let embeddings = dw.fit(&graph).unwrap();

    let ids: Vec<&str> = embeddings.ids().iter().map(NodeId::as_str).collect();
    assert_eq!(ids, vec!["x", "y", "lonely"]);
    assert_eq!(embeddings.vectors().shape(), &[3, 3]);
    assert!(embeddings.get(&NodeId::from("lonely")).is_some());
}

#[test]
fn same_seed_same_embeddings() {
    let graph = abc();
    let a = DeepWalk::new(abc_config()).unwrap().fit(&graph).unwrap();
    let b = DeepWalk::new(abc_config()).unwrap().fit(&graph).unwrap();
    assert_eq!(a.vectors(), b.vectors());
}

#[test]
fn empty_graph_is_rejected() {
    let dw = DeepWalk::new(abc_config()).unwrap();
    assert!(dw.fit(&Graph::new(false)).is_err());
}

#[test]
fn empty_corpus_is_rejected() {
    let mut tree = BinaryTree::new(3, 2, 0).unwrap();
    let mut model = SkipGram::new(SkipGramConfig::default()).unwrap();
    let err = model.train(&mut tree, &[]).unwrap_err();
    assert!(matches!(err, Error::EmptyCorpus));
}

#[test]
fn npy_export_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emb.npy");

    let embeddings = DeepWalk::new(abc_config()).unwrap().fit(&abc()).unwrap();
    embeddings.write_npy(&path).unwrap();

    let loaded: ndarray::Array2<f32> = ndarray_npy::read_npy(&path).unwrap();
    assert_eq!(&loaded, embeddings.vectors());
}

fn small_graph() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..8, 0u8..8), 1..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn fit_is_reproducible_for_any_seed(edges in small_graph(), seed in any::<u64>()) {
        let graph = Graph::from_edges(
            false,
            edges.iter().map(|&(a, b)| (a.to_string(), b.to_string())),
        );
        let config = DeepWalkConfig {
            walks_per_node: 2,
            steps_per_walk: 6,
            n_dims: 4,
            seed: Some(seed),
            ..Default::default()
        };

        let a = DeepWalk::new(config.clone()).unwrap().fit(&graph).unwrap();
        let b = DeepWalk::new(config).unwrap().fit(&graph).unwrap();

        prop_assert_eq!(a.vectors().shape(), &[graph.stats().node_count, 4]);
        prop_assert!(a.vectors().iter().all(|v| v.is_finite()));
        prop_assert_eq!(a.vectors(), b.vectors());
        prop_assert_eq!(a.ids(), b.ids());
    }
}
