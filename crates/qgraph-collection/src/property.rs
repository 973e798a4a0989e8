//! Named graph properties for select/exclude filters

use std::fmt;
use std::str::FromStr;

use qgraph_core::GraphUnit;
use serde::Serialize;

use crate::error::{CollectionError, Result};

/// A graph property addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Exploration,
    Walkers,
    Nodes,
    Diameter,
    Clustering,
    DegreeDistribution,
    LeafFraction,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Property::Exploration,
        Property::Walkers,
        Property::Nodes,
        Property::Diameter,
        Property::Clustering,
        Property::DegreeDistribution,
        Property::LeafFraction,
    ];

    /// Resolve a property by its attribute name or its summary column name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "exploration" => Ok(Property::Exploration),
            "walkers" => Ok(Property::Walkers),
            "nodes" => Ok(Property::Nodes),
            "diameter" => Ok(Property::Diameter),
            "clustering_coefficient" | "clustering" => Ok(Property::Clustering),
            "degree_distribution" | "degree distribution" => Ok(Property::DegreeDistribution),
            "leaf_fraction" | "leaf fraction" => Ok(Property::LeafFraction),
            other => Err(CollectionError::AttributeMissing(other.to_string())),
        }
    }

    /// Column name this property occupies in the summary table.
    pub fn column(self) -> &'static str {
        match self {
            Property::Exploration => "exploration",
            Property::Walkers => "walkers",
            Property::Nodes => "nodes",
            Property::Diameter => "diameter",
            Property::Clustering => "clustering",
            Property::DegreeDistribution => "degree distribution",
            Property::LeafFraction => "leaf fraction",
        }
    }

    /// Read the current value from `unit`; analysis properties are computed
    /// on first read.
    pub fn read<G: GraphUnit + ?Sized>(self, unit: &G) -> PropertyValue {
        match self {
            Property::Exploration => PropertyValue::Real(unit.exploration()),
            Property::Walkers => PropertyValue::from(unit.walkers()),
            Property::Nodes => PropertyValue::from(unit.nodes()),
            Property::Diameter => PropertyValue::from(unit.diameter()),
            Property::Clustering => PropertyValue::Real(unit.clustering_coefficient()),
            Property::DegreeDistribution => {
                PropertyValue::Distribution(unit.degree_distribution().to_vec())
            }
            Property::LeafFraction => PropertyValue::Real(unit.leaf_fraction()),
        }
    }
}

impl FromStr for Property {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self> {
        Property::from_name(s)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Value of a property, as compared by filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Real(f64),
    Distribution(Vec<usize>),
}

impl PropertyValue {
    /// Filter equality: numbers compare by value regardless of kind,
    /// distributions compare element-wise, anything else never matches.
    pub fn matches(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => a == b,
            (PropertyValue::Distribution(a), PropertyValue::Distribution(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(value) => Some(*value as f64),
            PropertyValue::Real(value) => Some(*value),
            PropertyValue::Distribution(_) => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        PropertyValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Real(value)
    }
}

impl From<Vec<usize>> for PropertyValue {
    fn from(value: Vec<usize>) -> Self {
        PropertyValue::Distribution(value)
    }
}

/// Parses `3` as an integer, `0.25` as a real and `0/4/0/1` as a degree
/// distribution.
impl FromStr for PropertyValue {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Ok(PropertyValue::Integer(value));
        }
        if let Ok(value) = text.parse::<f64>() {
            return Ok(PropertyValue::Real(value));
        }
        if text.contains('/') {
            let counts = text
                .split('/')
                .map(|part| part.trim().parse::<usize>())
                .collect::<std::result::Result<Vec<_>, _>>();
            if let Ok(counts) = counts {
                return Ok(PropertyValue::Distribution(counts));
            }
        }
        Err(CollectionError::TypeMismatch {
            expected: "a number or a `/`-separated degree distribution",
            found: text.to_string(),
        })
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Real(value) => write!(f, "{value}"),
            PropertyValue::Distribution(counts) => {
                let parts: Vec<String> = counts.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
