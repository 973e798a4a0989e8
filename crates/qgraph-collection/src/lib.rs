//! QGraph Collection — ordered, filterable, persistable sets of generated graphs
//!
//! A [`GraphCollection`] owns a sequence of shared [`QGraph`]s, derives a
//! memoized [`SummaryTable`] of their structural properties, grows new graphs
//! in parallel through a [`GenerationOrchestrator`] and persists itself to a
//! single `.qgl` file.

pub mod collection;
pub mod config;
pub mod error;
pub mod generate;
pub mod persist;
pub mod plot;
pub mod property;
pub mod summary;


#[cfg(test)]
pub mod test_utils;

pub use collection::GraphCollection;
pub use config::{DEFAULT_CONFIG_FILE, GenerationSettings, PlotSettings, Settings};
pub use error::{CollectionError, Result};
pub use generate::{
    CancellationToken, GenerationOrchestrator, GenerationReport, GenerationSpec,
    GenerationStatus, TaskFailure,
};
pub use persist::{COLLECTION_EXTENSION, check_extension};
pub use plot::{Chart, PlotAxes};
pub use property::{Property, PropertyValue};
pub use qgraph_core::{GraphId, GraphUnit, QGraph};
pub use summary::{COLUMNS, SummaryCache, SummaryRow, SummaryTable, walker_label};
