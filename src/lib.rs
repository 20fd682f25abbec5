//! # chronograph
//!
//! An embedded bitemporal graph engine with a temporal query algebra.
//!
//! Every logical node is a chain of immutable versions over a
//! monotonically increasing instant, so any past state of the graph can
//! be read back exactly. On top of the chains sit scoped views that
//! narrow a node's visible history, temporal operators that quantify
//! predicates over it, and user-maintained version indexes.
//!
//! ## Quick start
//!
//! ```rust
//! use chronograph::temporal::operators;
//! use chronograph::{PropertyMap, PropertyValue, TemporalGraph, TimeNode};
//!
//! # fn main() -> chronograph::Result<()> {
//! let mut graph = TemporalGraph::memory()?;
//!
//! let mut props = PropertyMap::new();
//! props.insert("state".into(), PropertyValue::from("new"));
//! let v = graph.create_node(props)?;
//!
//! graph.advance_to(5)?;
//! graph.set_property(v.node, "state", PropertyValue::from("review"))?;
//! graph.advance_to(9)?;
//! graph.set_property(v.node, "state", PropertyValue::from("done"))?;
//!
//! // Time travel to any instant.
//! let past = graph.node_at(v.node, 7).unwrap();
//! assert_eq!(past.property("state")?.unwrap().as_str(), Some("review"));
//!
//! // Quantify a predicate over the whole history.
//! let node = TimeNode::from(graph.node_at(v.node, 0).unwrap());
//! let was_reviewed = operators::eventually(&node, |n| {
//!     Ok(n.property("state")?.and_then(|s| s.as_str().map(str::to_owned))
//!         == Some("review".into()))
//! })?;
//! assert!(was_reviewed);
//!
//! // Scope the view to the history since the review started.
//! let since_review =
//!     operators::since(&node, |n| Ok(n.property("state")?.as_ref().and_then(|s| s.as_str()) == Some("review")))?
//!         .unwrap();
//! assert_eq!(since_review.all_instants()?, vec![5, 9]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `sync`: thread-safe [`SyncGraph`] wrapper
//! - `toml`: TOML configuration loading

mod builder;
mod error;
mod graph;
mod index;
mod node;
mod scope;
mod storage;
pub mod temporal;
mod types;

pub use builder::GraphBuilder;
pub use error::{GraphError, PredicateError, Result};
pub use graph::{Edge, GraphBatch, TemporalGraph};
pub use index::{VersionIndex, VersionIndexRegistry};
pub use node::NodeVersion;
pub use scope::TimeNode;
pub use storage::{GraphStore, MemoryStore, StorageOp, StorageStats};
pub use temporal::EvalValue;
pub use types::{
    Config, EdgeId, EndPolicy, GraphStats, Instant, NodeId, PropertyMap, PropertyValue, VersionId,
    NO_SUCH_INSTANT,
};

#[cfg(feature = "sync")]
pub use graph::SyncGraph;

/// Convenience alias for the main graph type.
pub type Chronograph = TemporalGraph;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used imports.
///
/// ```rust
/// use chronograph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::temporal::operators;
    pub use crate::{
        Config, Edge, EndPolicy, EvalValue, GraphBuilder, GraphError, Instant, NodeId,
        NodeVersion, PropertyMap, PropertyValue, Result, TemporalGraph, TimeNode, VersionId,
        VersionIndexRegistry, NO_SUCH_INSTANT,
    };

    #[cfg(feature = "sync")]
    pub use crate::SyncGraph;
}
