//! Read views over version chains.
//!
//! A [`NodeVersion`] is a cheap borrowed view: the logical node id plus the
//! instant it is observed at. All property reads resolve through the chain
//! at that instant, so views over history keep working after the node has
//! been ended.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, TemporalGraph};
use crate::types::{Instant, NodeId, PropertyMap, PropertyValue, VersionId};

/// One logical node observed at one instant.
///
/// The observation instant is the instant that was requested, which may
/// fall between two version records; property reads resolve to the record
/// with the greatest instant not after it.
#[derive(Clone, Copy)]
pub struct NodeVersion<'g> {
    graph: &'g TemporalGraph,
    id: NodeId,
    instant: Instant,
}

impl<'g> NodeVersion<'g> {
    pub(crate) fn new(graph: &'g TemporalGraph, id: NodeId, instant: Instant) -> Self {
        Self { graph, id, instant }
    }

    pub(crate) fn graph(&self) -> &'g TemporalGraph {
        self.graph
    }

    /// Logical identity, stable across all versions.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The instant this view observes the node at.
    pub fn instant(&self) -> Instant {
        self.instant
    }

    /// Handle to the physical version backing this view: the record valid
    /// at the observation instant.
    pub fn version_id(&self) -> Result<VersionId> {
        Ok(VersionId::new(self.id, self.resolved_instant()?))
    }

    /// Instant of the version record valid at the observation instant.
    pub fn resolved_instant(&self) -> Result<Instant> {
        let chain = self.graph.chain(self.id)?;
        chain
            .instant_at(self.instant, self.graph.config().end_policy)
            .ok_or(GraphError::NoSuchInstant(self.instant))
    }

    /// Whether the node is alive at the observation instant.
    pub fn is_alive(&self) -> Result<bool> {
        Ok(self.graph.chain(self.id)?.alive_at(self.instant))
    }

    /// End instant of the chain, if the node has been ended.
    pub fn end_instant(&self) -> Result<Option<Instant>> {
        Ok(self.graph.chain(self.id)?.end_instant())
    }

    // ---- properties --------------------------------------------------

    /// Value of `key` as of the observation instant.
    pub fn property(&self, key: &str) -> Result<Option<PropertyValue>> {
        let chain = self.graph.chain(self.id)?;
        let record = chain
            .record_at(self.instant, self.graph.config().end_policy)
            .ok_or(GraphError::NoSuchInstant(self.instant))?;
        Ok(record.props.get(key).cloned())
    }

    /// All property keys as of the observation instant.
    pub fn property_keys(&self) -> Result<Vec<String>> {
        Ok(self.properties()?.into_keys().collect())
    }

    /// Snapshot of the whole property map as of the observation instant.
    pub fn properties(&self) -> Result<PropertyMap> {
        let chain = self.graph.chain(self.id)?;
        let record = chain
            .record_at(self.instant, self.graph.config().end_policy)
            .ok_or(GraphError::NoSuchInstant(self.instant))?;
        Ok(record.props.clone())
    }

    // ---- time travel -------------------------------------------------

    /// The same logical node observed at instant `t`. `None` before the
    /// earliest version or, under the strict end policy, past the end.
    pub fn travel_to(&self, t: Instant) -> Option<NodeVersion<'g>> {
        self.graph.node_at(self.id, t)
    }

    /// View at the earliest version of the chain.
    pub fn earliest(&self) -> Result<NodeVersion<'g>> {
        Ok(Self::new(self.graph, self.id, self.earliest_instant()?))
    }

    /// View at the newest version of the chain.
    pub fn latest(&self) -> Result<NodeVersion<'g>> {
        Ok(Self::new(self.graph, self.id, self.latest_instant()?))
    }

    pub fn earliest_instant(&self) -> Result<Instant> {
        Ok(self.graph.chain(self.id)?.earliest_instant())
    }

    pub fn latest_instant(&self) -> Result<Instant> {
        Ok(self.graph.chain(self.id)?.latest_instant())
    }

    /// View at the version preceding the one this view resolves to.
    pub fn previous(&self) -> Result<Option<NodeVersion<'g>>> {
        Ok(self
            .previous_instant()?
            .map(|t| Self::new(self.graph, self.id, t)))
    }

    /// View at the version following the one this view resolves to.
    pub fn next(&self) -> Result<Option<NodeVersion<'g>>> {
        Ok(self
            .next_instant()?
            .map(|t| Self::new(self.graph, self.id, t)))
    }

    pub fn previous_instant(&self) -> Result<Option<Instant>> {
        let resolved = self.resolved_instant()?;
        Ok(self.graph.chain(self.id)?.previous_instant(resolved))
    }

    pub fn next_instant(&self) -> Result<Option<Instant>> {
        let resolved = self.resolved_instant()?;
        Ok(self.graph.chain(self.id)?.next_instant(resolved))
    }

    // ---- history enumeration -----------------------------------------

    /// Every version instant of the chain, oldest to newest.
    pub fn all_instants(&self) -> Result<Vec<Instant>> {
        Ok(self.graph.chain(self.id)?.instants().collect())
    }

    /// Version instants in `[from, to]`, oldest to newest.
    pub fn instants_between(&self, from: Instant, to: Instant) -> Result<Vec<Instant>> {
        Ok(self.graph.chain(self.id)?.instants_between(from, to))
    }

    /// Version instants at or after `from`, oldest to newest.
    pub fn instants_from(&self, from: Instant) -> Result<Vec<Instant>> {
        self.instants_between(from, Instant::MAX - 1)
    }

    /// Version instants at or before `to`, oldest to newest.
    pub fn instants_up_to(&self, to: Instant) -> Result<Vec<Instant>> {
        self.instants_between(0, to)
    }

    /// Views at every version of the chain, oldest to newest.
    pub fn all_versions(&self) -> Result<Vec<NodeVersion<'g>>> {
        Ok(self
            .all_instants()?
            .into_iter()
            .map(|t| Self::new(self.graph, self.id, t))
            .collect())
    }

    /// Views at every version in `[from, to]`, oldest to newest.
    pub fn versions_between(&self, from: Instant, to: Instant) -> Result<Vec<NodeVersion<'g>>> {
        Ok(self
            .instants_between(from, to)?
            .into_iter()
            .map(|t| Self::new(self.graph, self.id, t))
            .collect())
    }

    pub fn versions_from(&self, from: Instant) -> Result<Vec<NodeVersion<'g>>> {
        self.versions_between(from, Instant::MAX - 1)
    }

    pub fn versions_up_to(&self, to: Instant) -> Result<Vec<NodeVersion<'g>>> {
        self.versions_between(0, to)
    }

    /// Number of version records in the chain.
    pub fn version_count(&self) -> Result<usize> {
        Ok(self.graph.chain(self.id)?.version_count())
    }

    // ---- edges -------------------------------------------------------

    /// Every edge incident to this node at the observation instant.
    pub fn edges(&self) -> Result<Vec<Edge>> {
        self.graph.edges_at(self.id, self.instant)
    }

    /// Outgoing edges at the observation instant.
    pub fn outgoing(&self) -> Result<Vec<Edge>> {
        self.graph.outgoing_at(self.id, self.instant)
    }

    /// Incoming edges at the observation instant.
    pub fn incoming(&self) -> Result<Vec<Edge>> {
        self.graph.incoming_at(self.id, self.instant)
    }
}

impl std::fmt::Debug for NodeVersion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeVersion")
            .field("id", &self.id)
            .field("instant", &self.instant)
            .finish()
    }
}
