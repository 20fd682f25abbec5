//! Thread-safe wrapper for concurrent graph access.
//!
//! This module provides `SyncGraph`, a thread-safe wrapper around
//! `TemporalGraph` that uses `Arc<RwLock<TemporalGraph>>` internally to
//! allow safe concurrent access from multiple threads.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! chronograph = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use chronograph::{PropertyMap, SyncGraph};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = SyncGraph::memory()?;
//!
//! let writer = graph.clone();
//! let handle = thread::spawn(move || {
//!     writer
//!         .write(|g| g.create_node(PropertyMap::new()))
//!         .unwrap();
//! });
//! handle.join().unwrap();
//!
//! let count = graph.read(|g| g.stats().node_count);
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::graph::TemporalGraph;
use crate::types::Config;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe wrapper around `TemporalGraph` using `Arc<RwLock<_>>`.
///
/// Multiple threads can read simultaneously, but mutations require
/// exclusive access. Version chains are append-only with a graph-wide
/// epoch, so readers holding the lock observe a consistent snapshot and
/// never see a chain shrink.
///
/// Because node views borrow the graph, reads go through the closure API:
/// the closure runs under the read lock and returns owned data.
#[derive(Clone)]
pub struct SyncGraph {
    inner: Arc<RwLock<TemporalGraph>>,
}

impl SyncGraph {
    /// Creates a new in-memory graph with default configuration.
    pub fn memory() -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(TemporalGraph::memory()?)),
        })
    }

    /// Creates a new in-memory graph with custom configuration.
    pub fn memory_with_config(config: Config) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(TemporalGraph::memory_with_config(config)?)),
        })
    }

    /// Wraps an existing graph.
    pub fn from_graph(graph: TemporalGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Runs a closure under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&TemporalGraph) -> T) -> T {
        f(&self.inner.read())
    }

    /// Runs a closure under the write lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut TemporalGraph) -> T) -> T {
        f(&mut self.inner.write())
    }

    /// Acquires a read lock for direct access to the graph.
    pub fn lock_read(&self) -> parking_lot::RwLockReadGuard<'_, TemporalGraph> {
        self.inner.read()
    }

    /// Acquires a write lock for direct access to the graph.
    pub fn lock_write(&self) -> parking_lot::RwLockWriteGuard<'_, TemporalGraph> {
        self.inner.write()
    }
}

// Ensure SyncGraph is Send + Sync
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<SyncGraph>;
};
