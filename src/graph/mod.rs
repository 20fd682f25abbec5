//! Core graph implementation.
//!
//! This module defines [`TemporalGraph`], the owner of every version chain,
//! edge and epoch counter, together with its mutation surface. Reads go
//! through cheap [`NodeVersion`](crate::NodeVersion) views that borrow the
//! graph; mutations take `&mut self` and stream committed operations
//! through the configured [`GraphStore`](crate::GraphStore).

use crate::error::{GraphError, Result};
use crate::node::NodeVersion;
use crate::storage::{GraphStore, MemoryStore, StorageOp, StorageStats};
use crate::types::{
    Config, EdgeId, GraphStats, Instant, NodeId, PropertyMap, PropertyValue, VersionId,
    NO_SUCH_INSTANT,
};
use rustc_hash::FxHashMap;

pub(crate) mod chain;
mod edges;

mod batch;

#[cfg(feature = "sync")]
mod sync;

pub use batch::GraphBatch;
pub use edges::Edge;

#[cfg(feature = "sync")]
pub use sync::SyncGraph;

use chain::VersionChain;
use edges::{HeavyEdgeData, LightEdgeSet};

/// Bitemporal graph: every logical node is an ordered chain of immutable
/// versions over monotonically increasing instants.
///
/// `TemporalGraph` is single-threaded by design, like an embedded store:
/// it cannot be shared between threads without synchronization. Enable the
/// `sync` feature for a [`SyncGraph`] wrapper, or wrap it yourself.
///
/// # Examples
///
/// ```rust
/// use chronograph::{PropertyMap, PropertyValue, TemporalGraph};
///
/// let mut graph = TemporalGraph::memory()?;
///
/// let mut props = PropertyMap::new();
/// props.insert("size".into(), PropertyValue::Int(1));
/// let v0 = graph.create_node(props)?;
///
/// graph.tick()?;
/// graph.set_property(v0.node, "size", PropertyValue::Int(2))?;
///
/// let first = graph.node_at(v0.node, 0).unwrap();
/// assert_eq!(first.property("size")?.unwrap().as_int(), Some(1));
/// # Ok::<(), chronograph::GraphError>(())
/// ```
pub struct TemporalGraph {
    config: Config,
    store: Box<dyn GraphStore>,
    current: Instant,
    nodes: FxHashMap<NodeId, VersionChain>,
    light_edges: LightEdgeSet,
    heavy_edges: FxHashMap<EdgeId, HeavyEdgeData>,
    next_node: u64,
    next_edge: u64,
    stats: GraphStats,
}

impl TemporalGraph {
    /// Create an in-memory graph with default configuration.
    pub fn memory() -> Result<Self> {
        Self::memory_with_config(Config::default())
    }

    /// Create an in-memory graph with a custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        Self::with_store(config, Box::new(MemoryStore::new()))
    }

    /// Create a graph over an explicit storage backend.
    pub fn with_store(config: Config, store: Box<dyn GraphStore>) -> Result<Self> {
        config.validate().map_err(GraphError::Config)?;
        Ok(Self {
            current: config.start_instant,
            config,
            store,
            nodes: FxHashMap::default(),
            light_edges: LightEdgeSet::default(),
            heavy_edges: FxHashMap::default(),
            next_node: 0,
            next_edge: 0,
            stats: GraphStats::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- epochs ------------------------------------------------------

    /// The current global instant. New versions are stamped with it.
    pub fn current_instant(&self) -> Instant {
        self.current
    }

    /// Advance the global instant to `t`. Instants are graph-wide
    /// monotonic: moving backwards or to the reserved sentinel fails.
    pub fn advance_to(&mut self, t: Instant) -> Result<()> {
        if t == NO_SUCH_INSTANT || t < self.current {
            return Err(GraphError::NoSuchInstant(t));
        }
        self.current = t;
        Ok(())
    }

    /// Advance the global instant by one and return it. Fails when the
    /// next instant would be the reserved sentinel.
    pub fn tick(&mut self) -> Result<Instant> {
        let next = self.current + 1;
        if next == NO_SUCH_INSTANT {
            return Err(GraphError::NoSuchInstant(next));
        }
        self.current = next;
        Ok(next)
    }

    // ---- node mutation -----------------------------------------------

    /// Create a logical node with its first version at the current instant.
    pub fn create_node(&mut self, props: PropertyMap) -> Result<VersionId> {
        let id = NodeId(self.next_node);
        let instant = self.current;
        self.store.apply(&StorageOp::NodeCreated {
            id,
            instant,
            props: props.clone(),
        })?;
        self.next_node += 1;
        self.nodes.insert(id, VersionChain::new(instant, props));
        self.stats.node_count += 1;
        self.stats.version_count += 1;
        self.record_operation();
        Ok(VersionId::new(id, instant))
    }

    /// Write one property on the live head of `id`.
    ///
    /// If the head predates the current instant a new version record is
    /// created (copy-on-write of the property map); otherwise the head is
    /// updated in place. Returns the id of the written version.
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> Result<VersionId> {
        let mut props = PropertyMap::new();
        props.insert(key.to_string(), value);
        self.set_properties(id, props)
    }

    /// Write several properties at once on the live head of `id`.
    pub fn set_properties(&mut self, id: NodeId, props: PropertyMap) -> Result<VersionId> {
        let instant = self.current;
        let chain = self.writable_chain(id)?;
        let in_place = chain.head().instant == instant;
        let mut merged = chain.head().props.clone();
        merged.extend(props);

        // The whole write streams as one operation: a failing store sees
        // either all keys or none.
        if in_place {
            self.store.apply(&StorageOp::VersionUpdated {
                id,
                instant,
                props: merged.clone(),
            })?;
            let chain = self.nodes.get_mut(&id).expect("checked above");
            *chain.head_props_mut() = merged;
        } else {
            self.store.apply(&StorageOp::VersionAdded {
                id,
                instant,
                props: merged.clone(),
            })?;
            let chain = self.nodes.get_mut(&id).expect("checked above");
            chain.push(instant, merged);
            self.stats.version_count += 1;
        }
        self.record_operation();
        Ok(VersionId::new(id, instant))
    }

    /// Remove a property from the live head of `id`. Creates a new version
    /// when the head predates the current instant, like [`set_property`].
    ///
    /// [`set_property`]: Self::set_property
    pub fn remove_property(&mut self, id: NodeId, key: &str) -> Result<VersionId> {
        let instant = self.current;
        let chain = self.writable_chain(id)?;

        if chain.head().instant == instant {
            let mut next = chain.head().props.clone();
            next.remove(key);
            self.store.apply(&StorageOp::VersionUpdated {
                id,
                instant,
                props: next.clone(),
            })?;
            let chain = self.nodes.get_mut(&id).expect("checked above");
            *chain.head_props_mut() = next;
        } else {
            let mut next = chain.head().props.clone();
            next.remove(key);
            self.store.apply(&StorageOp::VersionAdded {
                id,
                instant,
                props: next.clone(),
            })?;
            let chain = self.nodes.get_mut(&id).expect("checked above");
            chain.push(instant, next);
            self.stats.version_count += 1;
        }
        self.record_operation();
        Ok(VersionId::new(id, instant))
    }

    /// Logically terminate `id` at the current instant.
    ///
    /// The node remains visible at the end instant itself and across all
    /// of its history; only instants after the end are affected. Ending is
    /// irreversible, and ending a node that is already ended fails fast.
    pub fn end_node(&mut self, id: NodeId) -> Result<()> {
        let instant = self.current;
        self.writable_chain(id)?;
        self.store.apply(&StorageOp::NodeEnded { id, instant })?;
        let chain = self.nodes.get_mut(&id).expect("checked above");
        chain.end_at(instant);
        self.stats.ended_count += 1;
        self.record_operation();
        Ok(())
    }

    fn writable_chain(&self, id: NodeId) -> Result<&VersionChain> {
        let chain = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
        if chain.is_ended() {
            return Err(GraphError::NotAlive {
                id,
                instant: self.current,
            });
        }
        Ok(chain)
    }

    // ---- edge mutation -----------------------------------------------

    /// Declare a structural light edge. Both endpoints must be alive at
    /// the current instant. Re-declaring an existing edge is a no-op.
    pub fn add_light_edge(&mut self, kind: &str, from: NodeId, to: NodeId) -> Result<()> {
        self.require_alive(from)?;
        self.require_alive(to)?;
        self.store.apply(&StorageOp::LightEdgeAdded {
            kind: kind.to_string(),
            from,
            to,
        })?;
        self.light_edges.add(kind, from, to);
        self.record_operation();
        Ok(())
    }

    /// Remove a structural light edge.
    pub fn remove_light_edge(&mut self, kind: &str, from: NodeId, to: NodeId) -> Result<()> {
        if !self.light_edges.remove(kind, from, to) {
            return Err(GraphError::UnknownLightEdge {
                kind: kind.to_string(),
                from,
                to,
            });
        }
        self.store.apply(&StorageOp::LightEdgeRemoved {
            kind: kind.to_string(),
            from,
            to,
        })?;
        self.record_operation();
        Ok(())
    }

    /// Create a heavy edge with its own version chain, starting at the
    /// current instant. Heavy edges live and end independently of their
    /// endpoints.
    pub fn create_heavy_edge(
        &mut self,
        kind: &str,
        from: NodeId,
        to: NodeId,
        props: PropertyMap,
    ) -> Result<EdgeId> {
        self.require_alive(from)?;
        self.require_alive(to)?;
        let id = EdgeId(self.next_edge);
        let instant = self.current;
        self.store.apply(&StorageOp::EdgeCreated {
            id,
            kind: kind.to_string(),
            from,
            to,
            instant,
            props: props.clone(),
        })?;
        self.next_edge += 1;
        self.heavy_edges.insert(
            id,
            HeavyEdgeData {
                kind: kind.to_string(),
                from,
                to,
                chain: VersionChain::new(instant, props),
            },
        );
        self.stats.heavy_edge_count += 1;
        self.record_operation();
        Ok(id)
    }

    /// Write one property on the live head of a heavy edge.
    pub fn set_edge_property(
        &mut self,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> Result<()> {
        let instant = self.current;
        let edge = self.heavy_edges.get(&id).ok_or(GraphError::UnknownEdge(id))?;
        if edge.chain.is_ended() {
            return Err(GraphError::NotAlive {
                id: edge.from,
                instant,
            });
        }
        self.store.apply(&StorageOp::EdgePropertySet {
            id,
            instant,
            key: key.to_string(),
            value: value.clone(),
        })?;
        let edge = self.heavy_edges.get_mut(&id).expect("checked above");
        if edge.chain.head().instant == instant {
            edge.chain
                .head_props_mut()
                .insert(key.to_string(), value);
        } else {
            let mut next = edge.chain.head().props.clone();
            next.insert(key.to_string(), value);
            edge.chain.push(instant, next);
        }
        self.record_operation();
        Ok(())
    }

    /// Logically terminate a heavy edge at the current instant. Must be
    /// invoked separately from ending either endpoint.
    pub fn end_heavy_edge(&mut self, id: EdgeId) -> Result<()> {
        let instant = self.current;
        let edge = self.heavy_edges.get(&id).ok_or(GraphError::UnknownEdge(id))?;
        if edge.chain.is_ended() {
            return Err(GraphError::NotAlive {
                id: edge.from,
                instant,
            });
        }
        self.store.apply(&StorageOp::EdgeEnded { id, instant })?;
        let edge = self.heavy_edges.get_mut(&id).expect("checked above");
        edge.chain.end_at(instant);
        self.record_operation();
        Ok(())
    }

    fn require_alive(&self, id: NodeId) -> Result<()> {
        let chain = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
        if !chain.alive_at(self.current) {
            return Err(GraphError::NotAlive {
                id,
                instant: self.current,
            });
        }
        Ok(())
    }

    // ---- readers -----------------------------------------------------

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// View of the node valid at instant `t` (time travel). `None` before
    /// the earliest version; past the end instant the result follows the
    /// configured [`EndPolicy`](crate::EndPolicy).
    pub fn node_at(&self, id: NodeId, t: Instant) -> Option<NodeVersion<'_>> {
        let chain = self.nodes.get(&id)?;
        chain
            .record_at(t, self.config.end_policy)
            .map(|_| NodeVersion::new(self, id, t))
    }

    /// View of the newest version of `id`.
    pub fn head(&self, id: NodeId) -> Option<NodeVersion<'_>> {
        let chain = self.nodes.get(&id)?;
        Some(NodeVersion::new(self, id, chain.latest_instant()))
    }

    /// View of a specific physical version, ignoring liveness. Reads on
    /// history never fail, including on ended nodes. `None` when the
    /// instant is not an actual record of the chain.
    pub fn version(&self, vid: VersionId) -> Option<NodeVersion<'_>> {
        let chain = self.nodes.get(&vid.node)?;
        chain.record_exactly_at(vid.instant)?;
        Some(NodeVersion::new(self, vid.node, vid.instant))
    }

    /// All node ids, in unspecified order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub(crate) fn chain(&self, id: NodeId) -> Result<&VersionChain> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn next_node_id(&self) -> u64 {
        self.next_node
    }

    pub(crate) fn heavy_edge_from(&self, id: EdgeId) -> Result<NodeId> {
        self.heavy_edges
            .get(&id)
            .map(|e| e.from)
            .ok_or(GraphError::UnknownEdge(id))
    }

    pub(crate) fn has_light_edge(&self, kind: &str, from: NodeId, to: NodeId) -> bool {
        self.light_edges
            .outgoing_of(from)
            .any(|e| e.kind == kind && e.other == to)
    }

    // ---- edge readers ------------------------------------------------

    /// Every edge incident to `id` that is effective at instant `t`.
    ///
    /// A light edge exists at `t` iff both endpoints are alive at `t`; a
    /// heavy edge follows its own lifecycle, regardless of endpoint
    /// liveness.
    pub fn edges_at(&self, id: NodeId, t: Instant) -> Result<Vec<Edge>> {
        let mut result = self.outgoing_at(id, t)?;
        result.extend(self.incoming_at(id, t)?);
        Ok(result)
    }

    /// Outgoing edges of `id` effective at instant `t`.
    pub fn outgoing_at(&self, id: NodeId, t: Instant) -> Result<Vec<Edge>> {
        self.chain(id)?;
        let mut result = Vec::new();
        if self.node_alive_at(id, t) {
            for rec in self.light_edges.outgoing_of(id) {
                if self.node_alive_at(rec.other, t) {
                    result.push(Edge::Light {
                        kind: rec.kind.clone(),
                        from: id,
                        to: rec.other,
                    });
                }
            }
        }
        for (&eid, edge) in &self.heavy_edges {
            if edge.from == id && edge.chain.alive_at(t) {
                result.push(Edge::Heavy {
                    id: eid,
                    kind: edge.kind.clone(),
                    from: edge.from,
                    to: edge.to,
                    instant: t,
                });
            }
        }
        Ok(result)
    }

    /// Incoming edges of `id` effective at instant `t`.
    pub fn incoming_at(&self, id: NodeId, t: Instant) -> Result<Vec<Edge>> {
        self.chain(id)?;
        let mut result = Vec::new();
        if self.node_alive_at(id, t) {
            for rec in self.light_edges.incoming_of(id) {
                if self.node_alive_at(rec.other, t) {
                    result.push(Edge::Light {
                        kind: rec.kind.clone(),
                        from: rec.other,
                        to: id,
                    });
                }
            }
        }
        for (&eid, edge) in &self.heavy_edges {
            if edge.to == id && edge.chain.alive_at(t) {
                result.push(Edge::Heavy {
                    id: eid,
                    kind: edge.kind.clone(),
                    from: edge.from,
                    to: edge.to,
                    instant: t,
                });
            }
        }
        Ok(result)
    }

    fn node_alive_at(&self, id: NodeId, t: Instant) -> bool {
        self.nodes.get(&id).is_some_and(|c| c.alive_at(t))
    }

    /// Whether a heavy edge is alive at instant `t`.
    pub fn edge_alive_at(&self, id: EdgeId, t: Instant) -> Result<bool> {
        let edge = self.heavy_edges.get(&id).ok_or(GraphError::UnknownEdge(id))?;
        Ok(edge.chain.alive_at(t))
    }

    /// Property of a heavy edge as of instant `t`.
    pub fn edge_property_at(
        &self,
        id: EdgeId,
        key: &str,
        t: Instant,
    ) -> Result<Option<PropertyValue>> {
        let edge = self.heavy_edges.get(&id).ok_or(GraphError::UnknownEdge(id))?;
        Ok(edge
            .chain
            .record_at(t, self.config.end_policy)
            .and_then(|r| r.props.get(key).cloned()))
    }

    // ---- batches, stats ----------------------------------------------

    /// Start an atomic batch of mutations. See [`GraphBatch`].
    pub fn batch(&mut self) -> GraphBatch<'_> {
        GraphBatch::new(self)
    }

    /// Mutation statistics.
    pub fn stats(&self) -> GraphStats {
        let mut stats = self.stats.clone();
        stats.light_edge_count = self.light_edges.len();
        stats
    }

    /// Statistics of the storage backend.
    pub fn storage_stats(&self) -> StorageStats {
        self.store.stats()
    }

    /// Flush the storage backend.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    fn record_operation(&mut self) {
        if self.config.track_stats {
            self.stats.record_operation();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EndPolicy;

    fn props(pairs: &[(&str, i64)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::Int(*v)))
            .collect()
    }

    #[test]
    fn test_create_and_travel() {
        let mut g = TemporalGraph::memory().unwrap();
        let v0 = g.create_node(props(&[("x", 1)])).unwrap();
        g.advance_to(5).unwrap();
        g.set_property(v0.node, "x", PropertyValue::Int(2)).unwrap();

        assert_eq!(
            g.node_at(v0.node, 0)
                .unwrap()
                .property("x")
                .unwrap()
                .unwrap()
                .as_int(),
            Some(1)
        );
        assert_eq!(
            g.node_at(v0.node, 7)
                .unwrap()
                .property("x")
                .unwrap()
                .unwrap()
                .as_int(),
            Some(2)
        );
        assert!(g.node_at(v0.node, 0).is_some());
    }

    #[test]
    fn test_set_property_same_instant_updates_in_place() {
        let mut g = TemporalGraph::memory().unwrap();
        let v0 = g.create_node(props(&[("x", 1)])).unwrap();
        g.set_property(v0.node, "x", PropertyValue::Int(2)).unwrap();

        let head = g.head(v0.node).unwrap();
        assert_eq!(head.all_instants().unwrap(), vec![0]);
        assert_eq!(head.property("x").unwrap().unwrap().as_int(), Some(2));
    }

    #[test]
    fn test_end_is_irreversible_and_fails_fast() {
        let mut g = TemporalGraph::memory().unwrap();
        let v0 = g.create_node(PropertyMap::new()).unwrap();
        g.advance_to(3).unwrap();
        g.end_node(v0.node).unwrap();

        assert!(matches!(
            g.end_node(v0.node),
            Err(GraphError::NotAlive { .. })
        ));
        assert!(matches!(
            g.set_property(v0.node, "x", PropertyValue::Int(1)),
            Err(GraphError::NotAlive { .. })
        ));
        // History reads still work after the end.
        assert!(g.node_at(v0.node, 0).is_some());
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut g = TemporalGraph::memory().unwrap();
        g.advance_to(5).unwrap();
        assert!(matches!(g.advance_to(3), Err(GraphError::NoSuchInstant(3))));
        assert!(matches!(
            g.advance_to(NO_SUCH_INSTANT),
            Err(GraphError::NoSuchInstant(_))
        ));
        assert_eq!(g.tick().unwrap(), 6);
    }

    #[test]
    fn test_tick_refuses_sentinel() {
        let mut g = TemporalGraph::memory().unwrap();
        g.advance_to(Instant::MAX - 1).unwrap();
        assert!(matches!(g.tick(), Err(GraphError::NoSuchInstant(_))));
        assert_eq!(g.current_instant(), Instant::MAX - 1);
    }

    #[test]
    fn test_in_place_write_streams_one_operation() {
        let mut g = TemporalGraph::memory().unwrap();
        let v0 = g.create_node(PropertyMap::new()).unwrap();
        g.set_properties(v0.node, props(&[("a", 1), ("b", 2)]))
            .unwrap();

        // One op for the create, one for the whole multi-key write.
        assert_eq!(g.storage_stats().operations_count, 2);
    }

    #[test]
    fn test_light_edge_liveness_is_derived() {
        let mut g = TemporalGraph::memory().unwrap();
        let a = g.create_node(PropertyMap::new()).unwrap();
        let b = g.create_node(PropertyMap::new()).unwrap();
        g.add_light_edge("refs", a.node, b.node).unwrap();

        assert_eq!(g.edges_at(a.node, 0).unwrap().len(), 1);

        g.advance_to(4).unwrap();
        g.end_node(b.node).unwrap();

        // Alive exactly at the end instant, derived away afterwards.
        assert_eq!(g.edges_at(a.node, 4).unwrap().len(), 1);
        assert_eq!(g.edges_at(a.node, 5).unwrap().len(), 0);
        // The edge never had history of its own: it is back if we look at
        // an instant where both endpoints were alive.
        assert_eq!(g.edges_at(a.node, 2).unwrap().len(), 1);
    }

    #[test]
    fn test_heavy_edge_independent_lifecycle() {
        let mut g = TemporalGraph::memory().unwrap();
        let a = g.create_node(PropertyMap::new()).unwrap();
        let b = g.create_node(PropertyMap::new()).unwrap();
        let e = g
            .create_heavy_edge("refs", a.node, b.node, props(&[("weight", 10)]))
            .unwrap();

        g.advance_to(4).unwrap();
        g.end_node(b.node).unwrap();

        // The heavy edge outlives its endpoint until ended separately.
        assert!(g.edge_alive_at(e, 6).unwrap());
        assert_eq!(
            g.edge_property_at(e, "weight", 6).unwrap().unwrap().as_int(),
            Some(10)
        );

        g.advance_to(8).unwrap();
        g.end_heavy_edge(e).unwrap();
        assert!(g.edge_alive_at(e, 8).unwrap());
        assert!(!g.edge_alive_at(e, 9).unwrap());
        assert!(matches!(
            g.end_heavy_edge(e),
            Err(GraphError::NotAlive { .. })
        ));
    }

    #[test]
    fn test_end_policy_clamp() {
        let config = Config::default().with_end_policy(EndPolicy::Clamp);
        let mut g = TemporalGraph::memory_with_config(config).unwrap();
        let v0 = g.create_node(props(&[("x", 1)])).unwrap();
        g.advance_to(3).unwrap();
        g.end_node(v0.node).unwrap();

        let past_end = g.node_at(v0.node, 10).unwrap();
        assert!(!past_end.is_alive().unwrap());
        assert_eq!(past_end.property("x").unwrap().unwrap().as_int(), Some(1));
    }

    #[test]
    fn test_stats() {
        let mut g = TemporalGraph::memory().unwrap();
        let v0 = g.create_node(PropertyMap::new()).unwrap();
        g.advance_to(1).unwrap();
        g.set_property(v0.node, "x", PropertyValue::Int(1)).unwrap();

        let stats = g.stats();
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.version_count, 2);
        assert_eq!(stats.operations_count, 2);
        assert_eq!(g.storage_stats().operations_count, 2);
    }
}
