//! Atomic batch operations.

use crate::error::{GraphError, Result};
use crate::graph::TemporalGraph;
use crate::types::{EdgeId, NodeId, PropertyMap, PropertyValue, VersionId};
use rustc_hash::FxHashSet;

/// Atomic batch of graph mutations. All queued operations are validated
/// against the graph before any of them is applied, so either the whole
/// batch commits or the graph is left untouched.
///
/// Every operation in the batch is stamped with the instant that was
/// current when the batch was opened.
pub struct GraphBatch<'g> {
    graph: &'g mut TemporalGraph,
    operations: Vec<BatchOperation>,
    reserved_nodes: u64,
}

#[derive(Debug, Clone)]
enum BatchOperation {
    CreateNode {
        props: PropertyMap,
    },
    SetProperty {
        id: NodeId,
        key: String,
        value: PropertyValue,
    },
    RemoveProperty {
        id: NodeId,
        key: String,
    },
    EndNode {
        id: NodeId,
    },
    AddLightEdge {
        kind: String,
        from: NodeId,
        to: NodeId,
    },
    RemoveLightEdge {
        kind: String,
        from: NodeId,
        to: NodeId,
    },
    CreateHeavyEdge {
        kind: String,
        from: NodeId,
        to: NodeId,
        props: PropertyMap,
    },
    EndHeavyEdge {
        id: EdgeId,
    },
}

impl<'g> GraphBatch<'g> {
    pub(crate) fn new(graph: &'g mut TemporalGraph) -> Self {
        Self {
            graph,
            operations: Vec::new(),
            reserved_nodes: 0,
        }
    }

    /// Queue a node creation. The returned id is reserved immediately and
    /// may be used by later operations in the same batch.
    pub fn create_node(&mut self, props: PropertyMap) -> NodeId {
        let id = NodeId(self.graph.next_node_id() + self.reserved_nodes);
        self.reserved_nodes += 1;
        self.operations.push(BatchOperation::CreateNode { props });
        id
    }

    pub fn set_property(&mut self, id: NodeId, key: &str, value: PropertyValue) {
        self.operations.push(BatchOperation::SetProperty {
            id,
            key: key.to_string(),
            value,
        });
    }

    pub fn remove_property(&mut self, id: NodeId, key: &str) {
        self.operations.push(BatchOperation::RemoveProperty {
            id,
            key: key.to_string(),
        });
    }

    pub fn end_node(&mut self, id: NodeId) {
        self.operations.push(BatchOperation::EndNode { id });
    }

    pub fn add_light_edge(&mut self, kind: &str, from: NodeId, to: NodeId) {
        self.operations.push(BatchOperation::AddLightEdge {
            kind: kind.to_string(),
            from,
            to,
        });
    }

    pub fn remove_light_edge(&mut self, kind: &str, from: NodeId, to: NodeId) {
        self.operations.push(BatchOperation::RemoveLightEdge {
            kind: kind.to_string(),
            from,
            to,
        });
    }

    pub fn create_heavy_edge(&mut self, kind: &str, from: NodeId, to: NodeId, props: PropertyMap) {
        self.operations.push(BatchOperation::CreateHeavyEdge {
            kind: kind.to_string(),
            from,
            to,
            props,
        });
    }

    pub fn end_heavy_edge(&mut self, id: EdgeId) {
        self.operations.push(BatchOperation::EndHeavyEdge { id });
    }

    /// Validate every queued operation and apply them in order.
    pub fn commit(self) -> Result<Vec<VersionId>> {
        self.validate()?;

        let graph = self.graph;
        let mut written = Vec::new();
        for operation in self.operations {
            match operation {
                BatchOperation::CreateNode { props } => {
                    written.push(graph.create_node(props)?);
                }
                BatchOperation::SetProperty { id, key, value } => {
                    written.push(graph.set_property(id, &key, value)?);
                }
                BatchOperation::RemoveProperty { id, key } => {
                    written.push(graph.remove_property(id, &key)?);
                }
                BatchOperation::EndNode { id } => graph.end_node(id)?,
                BatchOperation::AddLightEdge { kind, from, to } => {
                    graph.add_light_edge(&kind, from, to)?;
                }
                BatchOperation::RemoveLightEdge { kind, from, to } => {
                    graph.remove_light_edge(&kind, from, to)?;
                }
                BatchOperation::CreateHeavyEdge {
                    kind,
                    from,
                    to,
                    props,
                } => {
                    graph.create_heavy_edge(&kind, from, to, props)?;
                }
                BatchOperation::EndHeavyEdge { id } => graph.end_heavy_edge(id)?,
            }
        }
        Ok(written)
    }

    /// Dry run over the queue, tracking the nodes the batch itself would
    /// create or end and the light edges it would add or remove, so later
    /// operations validate against the state they will actually see.
    fn validate(&self) -> Result<()> {
        let instant = self.graph.current_instant();
        let mut created: FxHashSet<NodeId> = FxHashSet::default();
        let mut ended: FxHashSet<NodeId> = FxHashSet::default();
        let mut added_edges: FxHashSet<(String, NodeId, NodeId)> = FxHashSet::default();
        let mut removed_edges: FxHashSet<(String, NodeId, NodeId)> = FxHashSet::default();
        let mut next_reserved = self.graph.next_node_id();

        let alive = |graph: &TemporalGraph,
                     created: &FxHashSet<NodeId>,
                     ended: &FxHashSet<NodeId>,
                     id: NodeId|
         -> Result<()> {
            if ended.contains(&id) {
                return Err(GraphError::NotAlive { id, instant });
            }
            if created.contains(&id) {
                return Ok(());
            }
            let chain = graph.chain(id)?;
            if chain.is_ended() {
                return Err(GraphError::NotAlive { id, instant });
            }
            Ok(())
        };

        for operation in &self.operations {
            match operation {
                BatchOperation::CreateNode { .. } => {
                    created.insert(NodeId(next_reserved));
                    next_reserved += 1;
                }
                BatchOperation::SetProperty { id, .. }
                | BatchOperation::RemoveProperty { id, .. } => {
                    alive(self.graph, &created, &ended, *id)?;
                }
                BatchOperation::EndNode { id } => {
                    alive(self.graph, &created, &ended, *id)?;
                    ended.insert(*id);
                }
                BatchOperation::AddLightEdge { kind, from, to } => {
                    alive(self.graph, &created, &ended, *from)?;
                    alive(self.graph, &created, &ended, *to)?;
                    let key = (kind.clone(), *from, *to);
                    removed_edges.remove(&key);
                    added_edges.insert(key);
                }
                BatchOperation::CreateHeavyEdge { from, to, .. } => {
                    alive(self.graph, &created, &ended, *from)?;
                    alive(self.graph, &created, &ended, *to)?;
                }
                BatchOperation::RemoveLightEdge { kind, from, to } => {
                    let key = (kind.clone(), *from, *to);
                    let exists = added_edges.contains(&key)
                        || (!removed_edges.contains(&key)
                            && self.graph.has_light_edge(kind, *from, *to));
                    if !exists {
                        return Err(GraphError::UnknownLightEdge {
                            kind: kind.clone(),
                            from: *from,
                            to: *to,
                        });
                    }
                    added_edges.remove(&key);
                    removed_edges.insert(key);
                }
                BatchOperation::EndHeavyEdge { id } => {
                    if !self.graph.edge_alive_at(*id, instant)? {
                        return Err(GraphError::NotAlive {
                            id: self.graph.heavy_edge_from(*id)?,
                            instant,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_commits_all() {
        let mut graph = TemporalGraph::memory().unwrap();

        let mut batch = graph.batch();
        let a = batch.create_node(PropertyMap::new());
        let b = batch.create_node(PropertyMap::new());
        batch.set_property(a, "x", PropertyValue::Int(1));
        batch.add_light_edge("refs", a, b);
        batch.commit().unwrap();

        assert!(graph.contains_node(a));
        assert!(graph.contains_node(b));
        assert_eq!(graph.edges_at(a, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_batch_failure_leaves_graph_untouched() {
        let mut graph = TemporalGraph::memory().unwrap();
        let existing = graph.create_node(PropertyMap::new()).unwrap();

        let mut batch = graph.batch();
        let a = batch.create_node(PropertyMap::new());
        batch.set_property(a, "x", PropertyValue::Int(1));
        batch.set_property(NodeId(999), "x", PropertyValue::Int(1));
        assert!(batch.commit().is_err());

        assert!(!graph.contains_node(a));
        assert_eq!(graph.stats().node_count, 1);
        assert!(graph.contains_node(existing.node));
    }

    #[test]
    fn test_batch_sees_its_own_ends() {
        let mut graph = TemporalGraph::memory().unwrap();
        let v = graph.create_node(PropertyMap::new()).unwrap();

        let mut batch = graph.batch();
        batch.end_node(v.node);
        batch.set_property(v.node, "x", PropertyValue::Int(1));
        assert!(matches!(
            batch.commit(),
            Err(GraphError::NotAlive { .. })
        ));
    }

    #[test]
    fn test_batch_sees_its_own_light_edges() {
        let mut graph = TemporalGraph::memory().unwrap();
        let a = graph.create_node(PropertyMap::new()).unwrap();
        let b = graph.create_node(PropertyMap::new()).unwrap();

        // Add and remove of the same edge inside one batch cancel out.
        let mut batch = graph.batch();
        batch.add_light_edge("refs", a.node, b.node);
        batch.remove_light_edge("refs", a.node, b.node);
        batch.commit().unwrap();
        assert!(graph.edges_at(a.node, 0).unwrap().is_empty());

        // Removing an edge the batch already removed is still rejected.
        graph.add_light_edge("refs", a.node, b.node).unwrap();
        let mut batch = graph.batch();
        batch.remove_light_edge("refs", a.node, b.node);
        batch.remove_light_edge("refs", a.node, b.node);
        assert!(matches!(
            batch.commit(),
            Err(GraphError::UnknownLightEdge { .. })
        ));
    }

    #[test]
    fn test_batch_reserved_ids_are_usable() {
        let mut graph = TemporalGraph::memory().unwrap();

        let mut batch = graph.batch();
        let a = batch.create_node(PropertyMap::new());
        batch.set_property(a, "x", PropertyValue::Int(7));
        batch.commit().unwrap();

        let head = graph.head(a).unwrap();
        assert_eq!(head.property("x").unwrap().unwrap().as_int(), Some(7));
    }
}
