//! Error types for chronograph.

use crate::types::{EdgeId, Instant, NodeId};

/// Convenient result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error type returned by a predicate callback supplied by an embedding
/// expression evaluator. The evaluator is opaque to this crate, so any
/// error type is accepted.
pub type PredicateError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the versioning engine.
///
/// `NoSuchInstant` and `NotAlive` are expected, recoverable conditions:
/// callers are meant to branch on them. `Predicate` and `Store` abort the
/// enclosing operation and carry enough context to diagnose the failure.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An instant argument was the reserved sentinel, or an epoch
    /// advancement tried to move backwards.
    #[error("invalid instant: {0}")]
    NoSuchInstant(Instant),

    /// Mutation was attempted on an ended or otherwise dead version.
    #[error("node {id:?} is not alive at instant {instant}")]
    NotAlive { id: NodeId, instant: Instant },

    /// The logical identity is not known to the graph.
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),

    /// The heavy-edge identity is not known to the graph.
    #[error("unknown edge: {0:?}")]
    UnknownEdge(EdgeId),

    /// A light edge mutation referenced an edge that does not exist.
    #[error("no {kind} light edge from {from:?} to {to:?}")]
    UnknownLightEdge {
        kind: String,
        from: NodeId,
        to: NodeId,
    },

    /// The external predicate callback failed while a temporal operator
    /// was evaluating it.
    #[error("predicate failed in `{operator}` at instant {instant}: {source}")]
    Predicate {
        operator: &'static str,
        instant: Instant,
        #[source]
        source: PredicateError,
    },

    /// The backing store reported an I/O or consistency error.
    #[error("storage backend error: {0}")]
    Store(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GraphError {
    /// True for the recoverable conditions callers are expected to branch on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GraphError::NoSuchInstant(_) | GraphError::NotAlive { .. }
        )
    }
}
