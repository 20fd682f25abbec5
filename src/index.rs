//! Version indexes.
//!
//! A version index is a named, user-maintained set of (node, instant)
//! pairs: applications register the versions that matter to them and
//! query them back by instant range. Indexes are owned by a
//! [`VersionIndexRegistry`] that the application holds next to the graph,
//! so several graphs or several registries can coexist without touching
//! any shared state.

use crate::node::NodeVersion;
use crate::types::{Instant, NodeId};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Named collection of version indexes.
#[derive(Debug, Default)]
pub struct VersionIndexRegistry {
    indexes: FxHashMap<String, VersionIndex>,
}

impl VersionIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index called `name`, created empty on first use.
    pub fn get_or_create(&mut self, name: &str) -> &mut VersionIndex {
        self.indexes
            .entry(name.to_string())
            .or_insert_with(|| VersionIndex::new(name))
    }

    /// The index called `name`, if it has been created.
    pub fn get(&self, name: &str) -> Option<&VersionIndex> {
        self.indexes.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Drop the index called `name` and everything it contains. Returns
    /// false if no such index exists.
    pub fn delete(&mut self, name: &str) -> bool {
        self.indexes.remove(name).is_some()
    }

    /// Names of all created indexes, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// One named index of registered versions.
///
/// Registration is set-like: adding the same version twice is a no-op,
/// and removing a version that was never added is a no-op as well. Range
/// queries are reflexive for since/until and strict for after/before,
/// and always report instants oldest to newest.
#[derive(Debug)]
pub struct VersionIndex {
    name: String,
    entries: FxHashMap<NodeId, BTreeSet<Instant>>,
}

impl VersionIndex {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the version this view resolves to. Re-registering an
    /// already indexed version is a no-op.
    pub fn add_version(&mut self, node: &NodeVersion<'_>) -> crate::Result<()> {
        let instant = node.resolved_instant()?;
        self.entries.entry(node.id()).or_default().insert(instant);
        Ok(())
    }

    /// Unregister the version this view resolves to. Unregistering a
    /// version that is not in the index is a no-op.
    pub fn remove_version(&mut self, node: &NodeVersion<'_>) -> crate::Result<()> {
        let instant = node.resolved_instant()?;
        if let Some(instants) = self.entries.get_mut(&node.id()) {
            instants.remove(&instant);
            if instants.is_empty() {
                self.entries.remove(&node.id());
            }
        }
        Ok(())
    }

    /// Unregister every version of `id`.
    pub fn remove_all_versions(&mut self, id: NodeId) {
        self.entries.remove(&id);
    }

    /// Whether any version of `id` is registered.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids of all nodes with at least one registered version, sorted.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Every registered version of the probe's node, oldest to newest.
    pub fn all_versions<'g>(&self, node: &NodeVersion<'g>) -> Vec<NodeVersion<'g>> {
        self.select(node, |_| true)
    }

    /// Registered versions at or after `t`, oldest to newest.
    pub fn versions_since<'g>(&self, node: &NodeVersion<'g>, t: Instant) -> Vec<NodeVersion<'g>> {
        self.select(node, |i| i >= t)
    }

    /// Registered versions at or before `t`, oldest to newest.
    pub fn versions_until<'g>(&self, node: &NodeVersion<'g>, t: Instant) -> Vec<NodeVersion<'g>> {
        self.select(node, |i| i <= t)
    }

    /// Registered versions strictly after `t`, oldest to newest.
    pub fn versions_after<'g>(&self, node: &NodeVersion<'g>, t: Instant) -> Vec<NodeVersion<'g>> {
        self.select(node, |i| i > t)
    }

    /// Registered versions strictly before `t`, oldest to newest.
    pub fn versions_before<'g>(&self, node: &NodeVersion<'g>, t: Instant) -> Vec<NodeVersion<'g>> {
        self.select(node, |i| i < t)
    }

    fn select<'g>(
        &self,
        node: &NodeVersion<'g>,
        keep: impl Fn(Instant) -> bool,
    ) -> Vec<NodeVersion<'g>> {
        let Some(instants) = self.entries.get(&node.id()) else {
            return Vec::new();
        };
        instants
            .iter()
            .copied()
            .filter(|&i| keep(i))
            .map(|i| NodeVersion::new(node.graph(), node.id(), i))
            .collect()
    }
}
