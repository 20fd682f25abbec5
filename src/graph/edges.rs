//! Edge storage.
//!
//! Light edges are structural only: they have no history of their own, and
//! their effective existence at an instant is derived from the liveness of
//! both endpoints at that instant. Heavy edges carry their own version
//! chain (properties and an endable lifecycle) independent of their
//! endpoints.

use crate::graph::chain::VersionChain;
use crate::types::{EdgeId, Instant, NodeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LightEdgeRecord {
    pub kind: String,
    pub other: NodeId,
}

/// Adjacency store for light edges, kept in both directions so incoming
/// and outgoing lookups are symmetric.
#[derive(Debug, Default)]
pub(crate) struct LightEdgeSet {
    outgoing: FxHashMap<NodeId, SmallVec<[LightEdgeRecord; 4]>>,
    incoming: FxHashMap<NodeId, SmallVec<[LightEdgeRecord; 4]>>,
    len: usize,
}

impl LightEdgeSet {
    pub fn len(&self) -> usize {
        self.len
    }

    /// Declare an edge. Returns false if the identical edge already exists.
    pub fn add(&mut self, kind: &str, from: NodeId, to: NodeId) -> bool {
        let out = self.outgoing.entry(from).or_default();
        if out.iter().any(|e| e.kind == kind && e.other == to) {
            return false;
        }
        out.push(LightEdgeRecord {
            kind: kind.to_string(),
            other: to,
        });
        self.incoming.entry(to).or_default().push(LightEdgeRecord {
            kind: kind.to_string(),
            other: from,
        });
        self.len += 1;
        true
    }

    /// Remove an edge. Returns false if it was not declared.
    pub fn remove(&mut self, kind: &str, from: NodeId, to: NodeId) -> bool {
        let removed = match self.outgoing.get_mut(&from) {
            Some(out) => {
                let before = out.len();
                out.retain(|e| !(e.kind == kind && e.other == to));
                before != out.len()
            }
            None => false,
        };
        if removed {
            if let Some(inc) = self.incoming.get_mut(&to) {
                inc.retain(|e| !(e.kind == kind && e.other == from));
            }
            self.len -= 1;
        }
        removed
    }

    pub fn outgoing_of(&self, from: NodeId) -> impl Iterator<Item = &LightEdgeRecord> {
        self.outgoing.get(&from).into_iter().flatten()
    }

    pub fn incoming_of(&self, to: NodeId) -> impl Iterator<Item = &LightEdgeRecord> {
        self.incoming.get(&to).into_iter().flatten()
    }
}

/// Heavy edge: fixed endpoints plus an independent version chain.
#[derive(Debug)]
pub(crate) struct HeavyEdgeData {
    pub kind: String,
    pub from: NodeId,
    pub to: NodeId,
    pub chain: VersionChain,
}

/// Edge as observed at a query instant, either derived (light) or
/// versioned (heavy). Heavy edge properties are read through
/// [`TemporalGraph::edge_property_at`](crate::TemporalGraph::edge_property_at).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Light {
        kind: String,
        from: NodeId,
        to: NodeId,
    },
    Heavy {
        id: EdgeId,
        kind: String,
        from: NodeId,
        to: NodeId,
        /// Instant the edge was observed at.
        instant: Instant,
    },
}

impl Edge {
    pub fn kind(&self) -> &str {
        match self {
            Edge::Light { kind, .. } | Edge::Heavy { kind, .. } => kind,
        }
    }

    pub fn from(&self) -> NodeId {
        match self {
            Edge::Light { from, .. } | Edge::Heavy { from, .. } => *from,
        }
    }

    pub fn to(&self) -> NodeId {
        match self {
            Edge::Light { to, .. } | Edge::Heavy { to, .. } => *to,
        }
    }

    pub fn is_heavy(&self) -> bool {
        matches!(self, Edge::Heavy { .. })
    }
}
