//! Identity and growth parameters for generated graphs

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// Stable identity of a generated graph.
///
/// Assigned once at construction and carried through growth, clones and
/// persistence, so two handles compare equal exactly when they describe the
/// same generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct GraphId(pub u64);

impl GraphId {
    pub fn new(params: &GrowthParams, nonce: u64) -> Self {
        let mut hasher = DefaultHasher::new();
        params.walkers.hash(&mut hasher);
        params.exploration.to_bits().hash(&mut hasher);
        nonce.hash(&mut hasher);
        GraphId(hasher.finish())
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Parameters controlling how a graph grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Number of random walkers adding nodes in turn.
    pub walkers: usize,
    /// Probability that a walker steps onto the node it just created.
    pub exploration: f64,
}

impl GrowthParams {
    pub fn new(walkers: usize, exploration: f64) -> Result<Self, GrowthError> {
        if walkers == 0 {
            return Err(GrowthError::NoWalkers);
        }
        if !(0.0..=1.0).contains(&exploration) {
            return Err(GrowthError::ExplorationOutOfRange(exploration));
        }
        Ok(GrowthParams {
            walkers,
            exploration,
        })
    }
}

/// Position of a single walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walker {
    /// Node the walker currently sits on.
    pub position: u32,
    /// Node the walker arrived from, if it has moved at all.
    pub previous: Option<u32>,
}

impl Walker {
    pub fn parked(position: u32) -> Self {
        Walker {
            position,
            previous: None,
        }
    }
}
