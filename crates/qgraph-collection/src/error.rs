//! Error taxonomy for collection operations

use std::path::PathBuf;

use qgraph_core::GrowthError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectionError>;

#[derive(Debug, Error)]
pub enum CollectionError {
    /// A collection, table or graph could not be built from its inputs.
    #[error("cannot construct: {0}")]
    Construction(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("graphs have no property named `{0}`")]
    AttributeMissing(String),

    #[error("invalid format for {}: {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("index {index} out of range for a collection of {len} graphs")]
    OutOfRange { index: usize, len: usize },

    #[error("generation spec is missing required field `{0}`")]
    MissingField(&'static str),

    /// Cooperative cancellation; never escapes a generation run.
    #[error("generation interrupted after {appended} graphs")]
    Interrupted { appended: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

impl From<GrowthError> for CollectionError {
    fn from(error: GrowthError) -> Self {
        CollectionError::Construction(error.to_string())
    }
}
