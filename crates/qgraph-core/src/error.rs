//! Errors raised while building or restoring a graph

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GrowthError {
    #[error("a graph needs at least one walker")]
    NoWalkers,

    #[error("exploration must lie in [0, 1], got {0}")]
    ExplorationOutOfRange(f64),

    #[error("edge ({source_node}, {target_node}) references a node outside 0..{nodes}")]
    DanglingEdge {
        source_node: u32,
        target_node: u32,
        nodes: u32,
    },

    #[error("corrupt graph record: {0}")]
    CorruptRecord(String),
}
