//! Summary table derivation and its per-collection cache

use std::fmt;

use qgraph_core::GraphUnit;
use serde::Serialize;

use crate::error::{CollectionError, Result};

/// Column names of every summary table, in order.
pub const COLUMNS: [&str; 7] = [
    "exploration",
    "walkers",
    "nodes",
    "diameter",
    "clustering",
    "degree distribution",
    "leaf fraction",
];

const WALKER_WORDS: [&str; 8] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight",
];

/// Walker counts 1–8 are spelled out so plots treat them as categories;
/// anything else falls back to its decimal form.
pub fn walker_label(walkers: usize) -> String {
    walkers
        .checked_sub(1)
        .and_then(|index| WALKER_WORDS.get(index))
        .map_or_else(|| walkers.to_string(), |word| (*word).to_string())
}

/// One summary row, describing one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub exploration: f64,
    pub walkers: String,
    pub nodes: usize,
    pub diameter: usize,
    pub clustering: f64,
    #[serde(rename = "degree distribution")]
    pub degree_distribution: Vec<usize>,
    #[serde(rename = "leaf fraction")]
    pub leaf_fraction: f64,
}

impl SummaryRow {
    /// Read every column from `unit`, forcing its analysis properties.
    pub fn from_unit<G: GraphUnit + ?Sized>(unit: &G) -> Self {
        SummaryRow {
            exploration: unit.exploration(),
            walkers: walker_label(unit.walkers()),
            nodes: unit.nodes(),
            diameter: unit.diameter(),
            clustering: unit.clustering_coefficient(),
            degree_distribution: unit.degree_distribution().to_vec(),
            leaf_fraction: unit.leaf_fraction(),
        }
    }

    fn cells(&self) -> Vec<String> {
        let distribution: Vec<String> = self
            .degree_distribution
            .iter()
            .map(ToString::to_string)
            .collect();
        vec![
            self.exploration.to_string(),
            self.walkers.clone(),
            self.nodes.to_string(),
            self.diameter.to_string(),
            format!("{:.6}", self.clustering),
            format!("[{}]", distribution.join(", ")),
            format!("{:.6}", self.leaf_fraction),
        ]
    }
}

/// Tabular projection of a collection, one row per graph in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn derive<'a, G, I>(units: I) -> Self
    where
        G: GraphUnit + ?Sized + 'a,
        I: IntoIterator<Item = &'a G>,
    {
        let rows = units.into_iter().map(SummaryRow::from_unit).collect();
        Self::with_columns(COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    }

    pub(crate) fn with_columns(columns: Vec<String>, rows: Vec<SummaryRow>) -> Self {
        SummaryTable { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Row-wise concatenation; both tables must carry the same columns.
    pub fn concat(&self, other: &SummaryTable) -> Result<SummaryTable> {
        if self.columns != other.columns {
            return Err(CollectionError::Construction(format!(
                "cannot concatenate summary tables with columns {:?} and {:?}",
                self.columns, other.columns
            )));
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(SummaryTable::with_columns(self.columns.clone(), rows))
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let rows = self.rows.iter().map(SummaryRow::cells).collect();
        write_grid(f, &headers, rows)
    }
}

/// Write an index-prefixed, right-aligned text grid.
pub(crate) fn write_grid(
    f: &mut fmt::Formatter<'_>,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> fmt::Result {
    let index_width = rows.len().saturating_sub(1).to_string().len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write!(f, "{:index_width$}", "")?;
    for (header, &width) in headers.iter().zip(&widths) {
        write!(f, "  {header:>width$}")?;
    }
    writeln!(f)?;

    for (index, row) in rows.iter().enumerate() {
        write!(f, "{index:<index_width$}")?;
        for (cell, &width) in row.iter().zip(&widths) {
            write!(f, "  {cell:>width$}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// Memoized summary table owned by exactly one collection.
///
/// The table is derived on demand and kept until the owner's sequence
/// changes; mutating a graph's properties in place does not refresh it.
#[derive(Debug, Default)]
pub struct SummaryCache {
    table: Option<SummaryTable>,
    computations: usize,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already derived table.
    pub fn seeded(table: SummaryTable) -> Self {
        SummaryCache {
            table: Some(table),
            computations: 0,
        }
    }

    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            tracing::debug!("summary table invalidated");
        }
    }

    pub fn is_warm(&self) -> bool {
        self.table.is_some()
    }

    pub fn get(&self) -> Option<&SummaryTable> {
        self.table.as_ref()
    }

    /// How many times this cache has derived a table.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn get_or_compute<'a, G, I>(&mut self, units: I) -> &SummaryTable
    where
        G: GraphUnit + ?Sized + 'a,
        I: IntoIterator<Item = &'a G>,
    {
        let computations = &mut self.computations;
        self.table.get_or_insert_with(|| {
            *computations += 1;
            let table = SummaryTable::derive(units);
            tracing::debug!(rows = table.len(), "summary table derived");
            table
        })
    }
}
