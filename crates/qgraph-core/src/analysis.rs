//! Lazily computed structural properties
//!
//! Every property sits in its own `OnceLock`, so the first reader pays for the
//! computation and every later reader (on any thread) gets the memoized value.

use std::collections::HashSet;
use std::sync::OnceLock;

use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};

/// The topology type every analysis runs over.
pub type Topology = UnGraph<(), ()>;

/// Memoized structural properties of one graph.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    diameter: OnceLock<usize>,
    clustering: OnceLock<f64>,
    degree_distribution: OnceLock<Vec<usize>>,
    leaf_fraction: OnceLock<f64>,
}

/// Plain snapshot of whatever has been computed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSnapshot {
    pub diameter: Option<usize>,
    pub clustering: Option<f64>,
    pub degree_distribution: Option<Vec<usize>>,
    pub leaf_fraction: Option<f64>,
}

impl Analysis {
    pub fn diameter(&self, graph: &Topology) -> usize {
        *self.diameter.get_or_init(|| {
            tracing::debug!(nodes = graph.node_count(), "computing diameter");
            diameter(graph)
        })
    }

    pub fn clustering_coefficient(&self, graph: &Topology) -> f64 {
        *self.clustering.get_or_init(|| average_clustering(graph))
    }

    pub fn degree_distribution(&self, graph: &Topology) -> &[usize] {
        self.degree_distribution
            .get_or_init(|| degree_histogram(graph))
    }

    pub fn leaf_fraction(&self, graph: &Topology) -> f64 {
        *self.leaf_fraction.get_or_init(|| leaf_fraction(graph))
    }

    /// Number of properties already computed (0 to 4).
    pub fn computed(&self) -> usize {
        [
            self.diameter.get().is_some(),
            self.clustering.get().is_some(),
            self.degree_distribution.get().is_some(),
            self.leaf_fraction.get().is_some(),
        ]
        .into_iter()
        .filter(|done| *done)
        .count()
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            diameter: self.diameter.get().copied(),
            clustering: self.clustering.get().copied(),
            degree_distribution: self.degree_distribution.get().cloned(),
            leaf_fraction: self.leaf_fraction.get().copied(),
        }
    }

    pub fn restore(snapshot: AnalysisSnapshot) -> Self {
        Analysis {
            diameter: seeded(snapshot.diameter),
            clustering: seeded(snapshot.clustering),
            degree_distribution: seeded(snapshot.degree_distribution),
            leaf_fraction: seeded(snapshot.leaf_fraction),
        }
    }
}

fn seeded<T>(value: Option<T>) -> OnceLock<T> {
    match value {
        Some(value) => OnceLock::from(value),
        None => OnceLock::new(),
    }
}

/// Longest shortest path between any two connected nodes.
pub fn diameter(graph: &Topology) -> usize {
    graph
        .node_indices()
        .filter_map(|start| {
            dijkstra(graph, start, None, |_| 1usize)
                .into_values()
                .max()
        })
        .max()
        .unwrap_or(0)
}

/// Mean local clustering coefficient; nodes with degree below two count as 0.
pub fn average_clustering(graph: &Topology) -> f64 {
    let count = graph.node_count();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = graph
        .node_indices()
        .map(|node| local_clustering(graph, node))
        .sum();
    total / count as f64
}

fn local_clustering(graph: &Topology, node: NodeIndex) -> f64 {
    let neighbours: Vec<NodeIndex> = graph
        .neighbors(node)
        .filter(|&other| other != node)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let degree = neighbours.len();
    if degree < 2 {
        return 0.0;
    }

    let mut links = 0usize;
    for (i, &a) in neighbours.iter().enumerate() {
        for &b in &neighbours[i + 1..] {
            if graph.contains_edge(a, b) {
                links += 1;
            }
        }
    }
    (2 * links) as f64 / (degree * (degree - 1)) as f64
}

/// Histogram of node degrees: entry `d` counts the nodes with degree `d`.
pub fn degree_histogram(graph: &Topology) -> Vec<usize> {
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors(node).count())
        .collect();
    let max = degrees.iter().copied().max().unwrap_or(0);
    let mut histogram = vec![0; max + 1];
    for degree in degrees {
        if let Some(slot) = histogram.get_mut(degree) {
            *slot += 1;
        }
    }
    histogram
}

/// Fraction of nodes with exactly one neighbour.
pub fn leaf_fraction(graph: &Topology) -> f64 {
    let count = graph.node_count();
    if count == 0 {
        return 0.0;
    }
    let leaves = graph
        .node_indices()
        .filter(|&node| graph.neighbors(node).count() == 1)
        .count();
    leaves as f64 / count as f64
}
