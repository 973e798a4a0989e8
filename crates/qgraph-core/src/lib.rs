//! QGraph Core — random-walker graphs with lazily computed structure

pub mod analysis;
pub mod error;
pub mod graph;
pub mod model;
pub mod unit;


#[cfg(test)]
pub mod test_utils;

pub use analysis::Analysis;
pub use error::GrowthError;
pub use graph::QGraph;
pub use model::{GraphId, GrowthParams, Walker};
pub use unit::GraphUnit;
