//! The graph collection: ordered, filterable, mergeable and persistable

use std::any::Any;
use std::fmt;
use std::ops::Add;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use qgraph_core::{GraphUnit, QGraph};

use crate::config::PlotSettings;
use crate::error::{CollectionError, Result};
use crate::persist;
use crate::plot::{Chart, PlotAxes};
use crate::property::{Property, PropertyValue};
use crate::summary::{SummaryCache, SummaryTable, write_grid};

/// An ordered sequence of generated graphs with a memoized summary table.
///
/// Graphs are shared: filtering or merging hands the same `Arc<QGraph>`s to
/// the new collection. Only [`GraphCollection::append`] and
/// [`GraphCollection::load`] change a collection's sequence in place.
#[derive(Debug, Default)]
pub struct GraphCollection {
    graphs: Vec<Arc<QGraph>>,
    summary: SummaryCache,
    filename: Option<PathBuf>,
}

impl GraphCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shared(graphs: Vec<Arc<QGraph>>) -> Self {
        GraphCollection {
            graphs,
            summary: SummaryCache::new(),
            filename: None,
        }
    }

    /// Open the collection stored at `path` and bind it to that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut collection = Self::new();
        collection.load(path)?;
        Ok(collection)
    }

    /// Number of graphs.
    pub fn size(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// The graph at `index`, or `OutOfRange`.
    pub fn item_at(&self, index: usize) -> Result<&Arc<QGraph>> {
        self.graphs.get(index).ok_or(CollectionError::OutOfRange {
            index,
            len: self.graphs.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<QGraph>> {
        self.graphs.iter()
    }

    /// True when `candidate` is a graph (owned or shared) whose identity
    /// matches one of ours; anything that is not a graph is never contained.
    pub fn contains(&self, candidate: &dyn Any) -> bool {
        let id = if let Some(graph) = candidate.downcast_ref::<QGraph>() {
            graph.id()
        } else if let Some(graph) = candidate.downcast_ref::<Arc<QGraph>>() {
            graph.id()
        } else {
            return false;
        };
        self.graphs.iter().any(|graph| graph.id() == id)
    }

    /// Add a graph at the end and drop the cached summary. The summary is
    /// re-derived on the next read, reusing each graph's memoized properties.
    pub fn append(&mut self, graph: impl Into<Arc<QGraph>>) {
        self.graphs.push(graph.into());
        self.summary.invalidate();
    }

    /// New collection with the graphs whose `property` is one of `values`.
    pub fn select<I>(&self, property: &str, values: I) -> Result<GraphCollection>
    where
        I: IntoIterator,
        I::Item: Into<PropertyValue>,
    {
        self.filtered(property, values, true)
    }

    /// New collection with the graphs whose `property` is none of `values`.
    pub fn exclude<I>(&self, property: &str, values: I) -> Result<GraphCollection>
    where
        I: IntoIterator,
        I::Item: Into<PropertyValue>,
    {
        self.filtered(property, values, false)
    }

    fn filtered<I>(&self, property: &str, values: I, keep: bool) -> Result<GraphCollection>
    where
        I: IntoIterator,
        I::Item: Into<PropertyValue>,
    {
        let property = Property::from_name(property)?;
        let values: Vec<PropertyValue> = values.into_iter().map(Into::into).collect();

        let graphs = self
            .graphs
            .iter()
            .filter(|graph| {
                let current = property.read::<QGraph>(graph);
                values.iter().any(|value| value.matches(&current)) == keep
            })
            .cloned()
            .collect();
        Ok(GraphCollection::from_shared(graphs))
    }

    /// Concatenate `self` and `other` into a new collection. When both
    /// summaries are already derived, the new summary is their concatenation.
    pub fn merge(&self, other: &GraphCollection) -> Result<GraphCollection> {
        let mut graphs = Vec::with_capacity(self.graphs.len() + other.graphs.len());
        graphs.extend(self.graphs.iter().cloned());
        graphs.extend(other.graphs.iter().cloned());

        let summary = match (self.summary.get(), other.summary.get()) {
            (Some(ours), Some(theirs)) => SummaryCache::seeded(ours.concat(theirs)?),
            _ => SummaryCache::new(),
        };

        Ok(GraphCollection {
            graphs,
            summary,
            filename: None,
        })
    }

    /// The summary table, derived on first read.
    ///
    /// When the collection is bound to a file, reading the summary also
    /// re-saves it there so freshly computed graph properties reach disk.
    pub fn summary(&mut self) -> Result<&SummaryTable> {
        self.summary
            .get_or_compute(self.graphs.iter().map(|graph| &**graph));
        self.sync_to_disk()?;
        Ok(self
            .summary
            .get_or_compute(self.graphs.iter().map(|graph| &**graph)))
    }

    /// Whether the summary is currently memoized.
    pub fn has_summary(&self) -> bool {
        self.summary.is_warm()
    }

    pub fn summary_cache(&self) -> &SummaryCache {
        &self.summary
    }

    /// Re-save to the bound file, if any.
    pub fn sync_to_disk(&self) -> Result<()> {
        match &self.filename {
            Some(path) => {
                tracing::debug!("Syncing collection to {}", path.display());
                persist::write_collection(path, self.graphs.iter().map(|graph| &**graph))
            }
            None => Ok(()),
        }
    }

    /// Write every graph to `path` (which must end in `.qgl`) and bind it.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        persist::write_collection(path, self.graphs.iter().map(|graph| &**graph))?;
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the whole sequence with the graphs stored at `path` and bind it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let graphs = persist::read_collection(path)?;
        self.graphs = graphs.into_iter().map(Arc::new).collect();
        self.summary.invalidate();
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// File this collection was last saved to or loaded from.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Line chart of two summary columns, optionally split by `hue`/`style`.
    pub fn lineplot(&mut self, axes: &PlotAxes, settings: &PlotSettings) -> Result<Chart> {
        let table = self.summary()?;
        Chart::line(table, axes, settings)
    }
}

impl FromIterator<QGraph> for GraphCollection {
    fn from_iter<T: IntoIterator<Item = QGraph>>(iter: T) -> Self {
        GraphCollection::from_shared(iter.into_iter().map(Arc::new).collect())
    }
}

impl<'a> IntoIterator for &'a GraphCollection {
    type Item = &'a Arc<QGraph>;
    type IntoIter = std::slice::Iter<'a, Arc<QGraph>>;

    fn into_iter(self) -> Self::IntoIter {
        self.graphs.iter()
    }
}

impl Add<&GraphCollection> for &GraphCollection {
    type Output = Result<GraphCollection>;

    fn add(self, other: &GraphCollection) -> Self::Output {
        self.merge(other)
    }
}

impl Add for GraphCollection {
    type Output = Result<GraphCollection>;

    fn add(self, other: GraphCollection) -> Self::Output {
        self.merge(&other)
    }
}

/// Cheap listing of exploration, walkers and nodes; never derives the summary.
impl fmt::Display for GraphCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .graphs
            .iter()
            .map(|graph| {
                vec![
                    graph.exploration().to_string(),
                    graph.walkers().to_string(),
                    graph.nodes().to_string(),
                ]
            })
            .collect();
        write_grid(f, &["exploration", "walkers", "nodes"], rows)
    }
}
