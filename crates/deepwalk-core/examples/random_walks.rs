//! Random Walks Demo (DeepWalk style)
//!
//! ```bash
//! cargo run -p deepwalk-core --example random_walks
//! ```

use deepwalk_core::algo::random_walk::RandomWalker;
use deepwalk_core::Graph;

fn main() {
    println!("Random Walks Demo (DeepWalk)");
    println!("============================\n");

    // Two triangles joined by a bridge, plus an isolated node.
    let mut g = Graph::from_edges(
        false,
        [
            ("a1", "a2"),
            ("a2", "a3"),
            ("a3", "a1"),
            ("a3", "b1"),
            ("b1", "b2"),
            ("b2", "b3"),
            ("b3", "b1"),
        ],
    );
    g.add_node("island");

    let stats = g.stats();
    println!(
        "Graph: {} nodes, {} edges, {} isolated\n",
        stats.node_count, stats.edge_count, stats.isolated_count
    );

    let mut walker = RandomWalker::new(&g, Some(42));
    if let Err(e) = walker.process(2, 8) {
        eprintln!("walk generation failed: {e}");
        return;
    }

    for walk in walker.traces() {
        let ids: Vec<&str> = walk
            .iter()
            .filter_map(|&n| g.node_id(n))
            .map(|id| id.as_str())
            .collect();
        println!("  {}", ids.join(" -> "));
    }

    println!("\nVisit counts:");
    for (idx, count) in walker.visit_counts().iter().enumerate() {
        if let Some(id) = g.node_id(idx as u32) {
            println!("  {id:<8} {count}");
        }
    }
}
