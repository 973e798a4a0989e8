//! Test utilities for QGraph Collection

use qgraph_core::QGraph;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use crate::collection::GraphCollection;

/// Walkers, exploration and node count of every graph in [`sample_graphs`].
pub const SAMPLE_PARAMS: [(usize, f64, usize); 4] =
    [(1, 0.1, 12), (2, 0.5, 20), (1, 0.5, 8), (3, 0.9, 30)];

/// Four seeded graphs with distinct parameters.
pub fn sample_graphs() -> Vec<QGraph> {
    SAMPLE_PARAMS
        .iter()
        .zip(1u64..)
        .map(|(&(walkers, exploration, nodes), seed)| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut graph = QGraph::with_rng(walkers, exploration, &mut rng).unwrap();
            graph.grow_with(nodes - 1, &mut rng);
            graph
        })
        .collect()
}

pub fn sample_collection() -> GraphCollection {
    sample_graphs().into_iter().collect()
}

pub fn spec_record(walkers: usize, exploration: f64, nodes: usize) -> Value {
    json!({ "walkers": walkers, "exploration": exploration, "nodes": nodes })
}
