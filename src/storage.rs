//! Storage backend abstraction.
//!
//! The graph keeps its authoritative state in memory; every committed
//! mutation is additionally streamed through a [`GraphStore`] so that a
//! durable backend can persist it. A failing store aborts the mutation and
//! surfaces as [`GraphError::Store`](crate::GraphError::Store).

use crate::error::Result;
use crate::types::{EdgeId, Instant, NodeId, PropertyMap, PropertyValue};

/// One committed mutation, in the order it was applied.
#[derive(Debug, Clone)]
pub enum StorageOp {
    /// A logical node came into existence with its first version.
    NodeCreated {
        id: NodeId,
        instant: Instant,
        props: PropertyMap,
    },
    /// A new version record was appended to an existing chain.
    VersionAdded {
        id: NodeId,
        instant: Instant,
        props: PropertyMap,
    },
    /// The live head record at `instant` was rewritten in place. Carries
    /// the full property map after the write, so a backend never sees a
    /// partial multi-key update.
    VersionUpdated {
        id: NodeId,
        instant: Instant,
        props: PropertyMap,
    },
    /// A chain was logically terminated.
    NodeEnded { id: NodeId, instant: Instant },
    /// A structural light edge was declared.
    LightEdgeAdded {
        kind: String,
        from: NodeId,
        to: NodeId,
    },
    /// A structural light edge was removed.
    LightEdgeRemoved {
        kind: String,
        from: NodeId,
        to: NodeId,
    },
    /// A heavy edge came into existence with its first version.
    EdgeCreated {
        id: EdgeId,
        kind: String,
        from: NodeId,
        to: NodeId,
        instant: Instant,
        props: PropertyMap,
    },
    /// A property was written on a heavy edge.
    EdgePropertySet {
        id: EdgeId,
        instant: Instant,
        key: String,
        value: PropertyValue,
    },
    /// A heavy edge was logically terminated.
    EdgeEnded { id: EdgeId, instant: Instant },
}

/// Statistics reported by a storage backend.
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Number of operations the backend has accepted.
    pub operations_count: u64,
    /// Number of explicit flushes.
    pub flush_count: u64,
}

/// Durability hook for committed graph mutations.
///
/// Implementations may write an append-only log, mirror into an external
/// database, or do nothing at all. The default in-memory backend only
/// counts operations.
pub trait GraphStore: Send + Sync {
    /// Accept one committed mutation. An error here aborts the enclosing
    /// graph mutation.
    fn apply(&mut self, op: &StorageOp) -> Result<()>;

    /// Flush any pending writes to durable storage.
    fn flush(&mut self) -> Result<()>;

    /// Backend statistics.
    fn stats(&self) -> StorageStats;
}

/// In-memory storage backend. Keeps no state beyond counters; the graph
/// itself is the in-memory representation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stats: StorageStats,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for MemoryStore {
    fn apply(&mut self, _op: &StorageOp) -> Result<()> {
        self.stats.operations_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stats.flush_count += 1;
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        self.stats.clone()
    }
}
