//! Property-based tests for the hierarchical-softmax tree and trainer.

use deepwalk_nn::{BinaryTree, SkipGram, SkipGramConfig, TreeRef, TreeShape};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_shape() -> impl Strategy<Value = (usize, TreeShape)> {
    (1usize..200).prop_flat_map(|n| {
        prop_oneof![
            Just((n, TreeShape::Balanced)),
            prop::collection::vec(0u64..1000, n).prop_map(move |f| (n, TreeShape::Huffman(f))),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tree_has_n_minus_one_internal_nodes((n, shape) in arb_shape()) {
        let tree = BinaryTree::with_shape(n, 3, &shape, 0).unwrap();
        prop_assert_eq!(tree.num_leaves(), n);
        prop_assert_eq!(tree.num_internal(), n - 1);
        prop_assert_eq!(tree.num_nodes(), 2 * n - 1);
    }

    #[test]
    fn codes_unique_and_prefix_free((n, shape) in arb_shape()) {
        let tree = BinaryTree::with_shape(n, 2, &shape, 0).unwrap();
        let codes: Vec<Vec<u8>> = (0..n as u32)
            .map(|i| tree.path_to(i).unwrap().codes().to_vec())
            .collect();
        let unique: HashSet<&Vec<u8>> = codes.iter().collect();
        prop_assert_eq!(unique.len(), n);
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    prop_assert!(!b.starts_with(a), "{:?} is a prefix of {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn following_path_reaches_leaf((n, shape) in arb_shape()) {
        let tree = BinaryTree::with_shape(n, 2, &shape, 0).unwrap();
        for i in 0..n as u32 {
            let path = tree.path_to(i).unwrap();
            prop_assert_eq!(tree.follow(path.codes()), Some(TreeRef::Leaf(i)));
        }
    }

    #[test]
    fn balanced_code_lengths_are_log2(n in 2usize..500) {
        let tree = BinaryTree::new(n, 1, 0).unwrap();
        let floor = usize::BITS as usize - 1 - n.leading_zeros() as usize;
        let ceil = if n.is_power_of_two() { floor } else { floor + 1 };
        for i in 0..n as u32 {
            let len = tree.path_to(i).unwrap().len();
            prop_assert!((floor..=ceil).contains(&len), "len {} for n {}", len, n);
        }
    }

    #[test]
    fn zero_learning_rate_never_changes_vectors(
        n in 1usize..20,
        walks in prop::collection::vec(prop::collection::vec(0u32..20, 1..10), 1..10),
        window in 1usize..5,
    ) {
        let walks: Vec<Vec<u32>> = walks
            .into_iter()
            .map(|w| w.into_iter().map(|x| x % n as u32).collect())
            .collect();
        let mut tree = BinaryTree::new(n, 4, 1).unwrap();
        for i in 0..tree.num_internal() as u32 {
            tree.internal_vector_mut(i).unwrap().fill(0.25);
        }
        let before = tree.clone();
        let mut model = SkipGram::new(SkipGramConfig {
            window_size: window,
            learning_rate: 0.0,
            ..Default::default()
        }).unwrap();
        model.train(&mut tree, &walks).unwrap();
        prop_assert_eq!(tree.leaves(), before.leaves());
        prop_assert_eq!(tree.internals(), before.internals());
    }
}
