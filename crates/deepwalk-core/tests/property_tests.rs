//! Property-based tests for graph construction and random walks.

use deepwalk_core::algo::random_walk::RandomWalker;
use deepwalk_core::{Adjacency, Graph};
use proptest::prelude::*;

prop_compose! {
    fn arb_graph()(
        n in 1usize..30,
        directed in any::<bool>(),
    )(
        edges in prop::collection::vec((0..n as u64, 0..n as u64), 0..60),
        n in Just(n),
        directed in Just(directed),
    ) -> Graph {
        let mut g = Graph::new(directed);
        for i in 0..n as u64 {
            g.add_node(i);
        }
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn walks_follow_existing_edges(
        g in arb_graph(),
        walks_per_node in 1usize..4,
        steps in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut walker = RandomWalker::new(&g, Some(seed));
        walker.process(walks_per_node, steps).unwrap();

        prop_assert_eq!(walker.traces().len(), g.node_count() * walks_per_node);
        for walk in walker.traces() {
            prop_assert!(!walk.is_empty());
            prop_assert!(walk.len() <= steps);
            for pair in walk.windows(2) {
                prop_assert!(g.neighbors(pair[0]).any(|n| n == pair[1]));
            }
            // A walk stops early only at a dead end.
            if walk.len() < steps {
                let last = *walk.last().unwrap();
                prop_assert_eq!(g.neighbors(last).count(), 0);
            }
        }
    }

    #[test]
    fn same_seed_same_walks(g in arb_graph(), seed in any::<u64>()) {
        let mut w1 = RandomWalker::new(&g, Some(seed));
        let mut w2 = RandomWalker::new(&g, Some(seed));
        w1.process(2, 6).unwrap();
        w2.process(2, 6).unwrap();
        prop_assert_eq!(w1.traces(), w2.traces());
    }

    #[test]
    fn undirected_adjacency_is_symmetric(g in arb_graph()) {
        if !g.is_directed() {
            for a in 0..g.node_count() as u32 {
                for b in g.neighbors(a) {
                    prop_assert!(g.neighbors(b).any(|n| n == a));
                }
            }
        }
    }
}
