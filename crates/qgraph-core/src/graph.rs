//! Graph wrapper using petgraph::UnGraph grown by random walkers

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, AnalysisSnapshot, Topology};
use crate::error::GrowthError;
use crate::model::{GraphId, GrowthParams, Walker};
use crate::unit::GraphUnit;

/// A generated graph: an undirected simple graph grown one node at a time.
///
/// Walkers take turns. Each turn the active walker attaches a fresh node to
/// the node it sits on; with probability `exploration` it then steps onto
/// that fresh node, otherwise it links the fresh node back to where it came
/// from (closing a triangle) and wanders to a random neighbour.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord", into = "GraphRecord")]
pub struct QGraph {
    id: GraphId,
    params: GrowthParams,
    inner: Topology,
    crew: Vec<Walker>,
    turn: usize,
    analysis: Analysis,
}

impl std::fmt::Debug for QGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QGraph")
            .field("id", &self.id)
            .field("walkers", &self.params.walkers)
            .field("exploration", &self.params.exploration)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl QGraph {
    /// Create a graph with a single node and every walker parked on it.
    pub fn new(walkers: usize, exploration: f64) -> Result<Self, GrowthError> {
        Self::with_rng(walkers, exploration, &mut rand::thread_rng())
    }

    /// Like [`QGraph::new`], drawing the identity nonce from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        walkers: usize,
        exploration: f64,
        rng: &mut R,
    ) -> Result<Self, GrowthError> {
        let params = GrowthParams::new(walkers, exploration)?;
        let id = GraphId::new(&params, rng.next_u64());

        let mut inner = Topology::default();
        let origin = inner.add_node(());
        let origin = origin.index() as u32;

        Ok(QGraph {
            id,
            params,
            inner,
            crew: vec![Walker::parked(origin); walkers],
            turn: 0,
            analysis: Analysis::default(),
        })
    }

    /// Build a graph from an explicit edge list with walkers parked on node 0.
    pub fn from_edges(
        walkers: usize,
        exploration: f64,
        nodes: u32,
        edges: &[(u32, u32)],
    ) -> Result<Self, GrowthError> {
        let params = GrowthParams::new(walkers, exploration)?;
        let inner = build_topology(nodes, edges)?;
        let id = GraphId::new(&params, u64::from(nodes) ^ edges.len() as u64);
        Ok(QGraph {
            id,
            params,
            inner,
            crew: vec![Walker::parked(0); walkers],
            turn: 0,
            analysis: Analysis::default(),
        })
    }

    /// Add `count` nodes using the thread-local RNG.
    pub fn grow_by(&mut self, count: usize) {
        self.grow_with(count, &mut rand::thread_rng());
    }

    /// Add `count` nodes drawing every random choice from `rng`.
    pub fn grow_with<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        if count == 0 {
            return;
        }
        for _ in 0..count {
            self.step(rng);
        }
        // A grown graph is a different graph; drop anything computed before.
        self.analysis = Analysis::default();
        tracing::debug!(id = %self.id, nodes = self.inner.node_count(), "grew graph by {}", count);
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let slot = self.turn % self.crew.len();
        self.turn = (slot + 1) % self.crew.len();
        let Some(walker) = self.crew.get(slot).copied() else {
            return;
        };

        let here = NodeIndex::new(walker.position as usize);
        let fresh = self.inner.add_node(());
        self.inner.add_edge(here, fresh, ());

        let next = if rng.gen_bool(self.params.exploration) {
            fresh
        } else {
            if let Some(previous) = walker.previous {
                let previous = NodeIndex::new(previous as usize);
                if previous != here {
                    self.inner.add_edge(previous, fresh, ());
                }
            }
            let neighbours: Vec<NodeIndex> = self.inner.neighbors(here).collect();
            neighbours.choose(rng).copied().unwrap_or(fresh)
        };

        if let Some(walker) = self.crew.get_mut(slot) {
            walker.previous = Some(here.index() as u32);
            walker.position = next.index() as u32;
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Current walker positions, in turn order.
    pub fn crew(&self) -> &[Walker] {
        &self.crew
    }

    /// Access the memoized analysis (mostly useful to see what is computed).
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }
}

impl GraphUnit for QGraph {
    fn id(&self) -> GraphId {
        self.id
    }

    fn exploration(&self) -> f64 {
        self.params.exploration
    }

    fn walkers(&self) -> usize {
        self.params.walkers
    }

    fn nodes(&self) -> usize {
        self.inner.node_count()
    }

    fn diameter(&self) -> usize {
        self.analysis.diameter(&self.inner)
    }

    fn clustering_coefficient(&self) -> f64 {
        self.analysis.clustering_coefficient(&self.inner)
    }

    fn degree_distribution(&self) -> &[usize] {
        self.analysis.degree_distribution(&self.inner)
    }

    fn leaf_fraction(&self) -> f64 {
        self.analysis.leaf_fraction(&self.inner)
    }
}

fn build_topology(nodes: u32, edges: &[(u32, u32)]) -> Result<Topology, GrowthError> {
    if nodes == 0 {
        return Err(GrowthError::CorruptRecord("graph has no nodes".to_string()));
    }
    let mut inner = Topology::with_capacity(nodes as usize, edges.len());
    for _ in 0..nodes {
        inner.add_node(());
    }
    for &(source, target) in edges {
        if source >= nodes || target >= nodes {
            return Err(GrowthError::DanglingEdge {
                source_node: source,
                target_node: target,
                nodes,
            });
        }
        inner.add_edge(NodeIndex::new(source as usize), NodeIndex::new(target as usize), ());
    }
    Ok(inner)
}

/// Flat on-disk shape of a [`QGraph`], including any analysis computed so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphRecord {
    id: GraphId,
    walkers: usize,
    exploration: f64,
    nodes: u32,
    edges: Vec<(u32, u32)>,
    crew: Vec<Walker>,
    turn: usize,
    diameter: Option<usize>,
    clustering: Option<f64>,
    degree_distribution: Option<Vec<usize>>,
    leaf_fraction: Option<f64>,
}

impl From<QGraph> for GraphRecord {
    fn from(graph: QGraph) -> Self {
        let edges = graph
            .inner
            .edge_references()
            .map(|edge| (edge.source().index() as u32, edge.target().index() as u32))
            .collect();
        let snapshot = graph.analysis.snapshot();
        GraphRecord {
            id: graph.id,
            walkers: graph.params.walkers,
            exploration: graph.params.exploration,
            nodes: graph.inner.node_count() as u32,
            edges,
            crew: graph.crew,
            turn: graph.turn,
            diameter: snapshot.diameter,
            clustering: snapshot.clustering,
            degree_distribution: snapshot.degree_distribution,
            leaf_fraction: snapshot.leaf_fraction,
        }
    }
}

impl TryFrom<GraphRecord> for QGraph {
    type Error = GrowthError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let params = GrowthParams::new(record.walkers, record.exploration)?;
        let inner = build_topology(record.nodes, &record.edges)?;

        if record.crew.len() != params.walkers {
            return Err(GrowthError::CorruptRecord(format!(
                "{} walker positions recorded for {} walkers",
                record.crew.len(),
                params.walkers
            )));
        }
        let out_of_graph = record.crew.iter().any(|walker| {
            walker.position >= record.nodes
                || walker.previous.is_some_and(|previous| previous >= record.nodes)
        });
        if out_of_graph {
            return Err(GrowthError::CorruptRecord(
                "walker positioned outside the graph".to_string(),
            ));
        }

        let analysis = Analysis::restore(AnalysisSnapshot {
            diameter: record.diameter,
            clustering: record.clustering,
            degree_distribution: record.degree_distribution,
            leaf_fraction: record.leaf_fraction,
        });

        Ok(QGraph {
            id: record.id,
            params,
            inner,
            crew: record.crew,
            turn: record.turn % params.walkers,
            analysis,
        })
    }
}
