//! Error types for kmap graph operations.
//!
//! Only caller errors live here. Data-quality rejections (self-loops and
//! cycle-inducing edges) are reported through
//! [`EdgeOutcome`](crate::graph::EdgeOutcome) and
//! [`LoadWarning`](crate::loader::LoadWarning) so a bulk load can continue
//! past a single bad entry.

use crate::domain::{EdgeId, NodeId};
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for kmap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A node with this id already exists in the graph.
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge with this id already exists in the graph.
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// An edge endpoint does not resolve to a node in the graph.
    #[error("Source or target does not exist in graph: {from} -> {to}")]
    UnknownEndpoint {
        /// The requested source id
        from: NodeId,
        /// The requested target id
        to: NodeId,
    },

    /// The node id was never part of the graph (or the input collection).
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// The edge id was never part of the graph.
    #[error("Edge not found: {0}")]
    UnknownEdge(EdgeId),

    /// Id generation exhausted its retry budget.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized Result type for kmap operations.
pub type Result<T> = std::result::Result<T, Error>;
