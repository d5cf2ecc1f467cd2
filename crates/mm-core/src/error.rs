//! Error and warning taxonomy.
//!
//! Hard errors are returned as `Result`s. Recoverable problems found while
//! decoding or loading are reported as [`SceneWarning`]s through the
//! scene's observer and never abort the operation.

use crate::id::{ConnectionId, NodeId};
use thiserror::Error;

/// Rejected scene mutation. The scene is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("connection endpoint references missing node {0}")]
    InvalidEndpoint(NodeId),

    #[error("no connection with id {0}")]
    UnknownConnection(ConnectionId),

    #[error("no node with id {0}")]
    UnknownNode(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("connection {0} already exists")]
    DuplicateConnection(ConnectionId),
}

/// The persistence collaborator could not produce or store a record.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("mindmap {0} not found")]
    NotFound(String),

    #[error("mindmap record is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Binary snapshot encode/decode failure.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Non-fatal problems surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneWarning {
    /// A record was missing or had mistyped fields; defaults were used or the
    /// record was skipped.
    MalformedRecord { what: &'static str, detail: String },

    /// A connection referenced a node that is not in the scene and was
    /// dropped.
    DanglingReference {
        connection: ConnectionId,
        node: NodeId,
    },

    /// The persistence collaborator produced no record; an empty scene was
    /// used instead.
    LoadFailure { mindmap: String, reason: String },
}

impl std::fmt::Display for SceneWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneWarning::MalformedRecord { what, detail } => {
                write!(f, "malformed {what} record: {detail}")
            }
            SceneWarning::DanglingReference { connection, node } => {
                write!(f, "dropped connection {connection}: node {node} does not exist")
            }
            SceneWarning::LoadFailure { mindmap, reason } => {
                write!(f, "could not load mindmap {mindmap}: {reason}")
            }
        }
    }
}
