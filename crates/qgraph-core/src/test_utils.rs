//! Test utilities for QGraph Core

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::graph::QGraph;

/// Grow a graph to `nodes` nodes with a fixed seed.
pub fn grown(walkers: usize, exploration: f64, nodes: usize, seed: u64) -> QGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = QGraph::with_rng(walkers, exploration, &mut rng).unwrap();
    graph.grow_with(nodes - 1, &mut rng);
    graph
}

/// Triangle 0-1-2 with a pendant node 3 hanging off node 0.
pub fn triangle_with_tail() -> QGraph {
    QGraph::from_edges(1, 0.5, 4, &[(0, 1), (1, 2), (2, 0), (0, 3)]).unwrap()
}

/// Star with `leaves` leaves around node 0.
pub fn star(leaves: u32) -> QGraph {
    let edges: Vec<(u32, u32)> = (1..=leaves).map(|leaf| (0, leaf)).collect();
    QGraph::from_edges(2, 0.25, leaves + 1, &edges).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_have_expected_shape() {
        assert_eq!(grown(3, 0.4, 25, 7).node_count(), 25);
        assert_eq!(triangle_with_tail().edge_count(), 4);
        assert_eq!(star(5).node_count(), 6);
    }
}
