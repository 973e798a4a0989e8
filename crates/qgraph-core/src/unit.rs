//! Read-only view of a generated graph

use crate::model::GraphId;

/// The read side of a generated graph, as consumed by collections.
///
/// Structural properties are computed on first read and memoized by the
/// implementor; implementations must tolerate concurrent first reads.
pub trait GraphUnit: Send + Sync {
    /// Identity used for membership tests.
    fn id(&self) -> GraphId;

    fn exploration(&self) -> f64;

    fn walkers(&self) -> usize;

    fn nodes(&self) -> usize;

    fn diameter(&self) -> usize;

    fn clustering_coefficient(&self) -> f64;

    /// Entry `d` counts the nodes with degree `d`.
    fn degree_distribution(&self) -> &[usize];

    fn leaf_fraction(&self) -> f64;
}
