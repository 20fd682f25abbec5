//! Builder for constructing graphs with custom settings.

use crate::error::Result;
use crate::graph::TemporalGraph;
use crate::storage::GraphStore;
use crate::types::{Config, EndPolicy, Instant};

/// Fluent construction of a [`TemporalGraph`].
///
/// # Examples
///
/// ```rust
/// use chronograph::{EndPolicy, GraphBuilder};
///
/// let graph = GraphBuilder::new()
///     .start_instant(10)
///     .end_policy(EndPolicy::Clamp)
///     .build()?;
/// assert_eq!(graph.current_instant(), 10);
/// # Ok::<(), chronograph::GraphError>(())
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    config: Config,
    store: Option<Box<dyn GraphStore>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            store: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Instant the graph starts at.
    pub fn start_instant(mut self, instant: Instant) -> Self {
        self.config.start_instant = instant;
        self
    }

    /// What time travel reports past a node's end instant.
    pub fn end_policy(mut self, policy: EndPolicy) -> Self {
        self.config.end_policy = policy;
        self
    }

    /// Whether mutation statistics are tracked.
    pub fn track_stats(mut self, track: bool) -> Self {
        self.config.track_stats = track;
        self
    }

    /// Storage backend to stream committed mutations through. Defaults to
    /// the counting in-memory backend.
    pub fn store(mut self, store: Box<dyn GraphStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<TemporalGraph> {
        match self.store {
            Some(store) => TemporalGraph::with_store(self.config, store),
            None => TemporalGraph::memory_with_config(self.config),
        }
    }
}
