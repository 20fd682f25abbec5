//! Core types and configuration for chronograph.
//!
//! This module defines the instant/identity vocabulary shared by the whole
//! crate, the typed property values stored on versions, and the serializable
//! database configuration.

use bytes::Bytes;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A monotonically increasing indexing epoch. Instants identify the moment a
/// version became current; they are not wall-clock time.
pub type Instant = u64;

/// Reserved sentinel meaning "not applicable". Never a valid instant:
/// mutations reject it, and navigation APIs report absence as `None`
/// instead of leaking the sentinel.
pub const NO_SUCH_INSTANT: Instant = Instant::MAX;

/// Stable key shared by every physical version of the same logical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Stable key of a heavy edge, which carries its own version chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Persistent handle to one physical version: logical identity plus the
/// instant the version became current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId {
    pub node: NodeId,
    pub instant: Instant,
}

impl VersionId {
    pub fn new(node: NodeId, instant: Instant) -> Self {
        Self { node, instant }
    }
}

/// Typed value stored under a property key of a version record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Blob(Bytes),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    StrList(Vec<String>),
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

impl From<Bytes> for PropertyValue {
    fn from(v: Bytes) -> Self {
        PropertyValue::Blob(v)
    }
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Property map of one version record. BTreeMap keeps key order
/// deterministic across runs.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Visibility of a node when travelling past its end instant.
///
/// A node is always alive exactly at its end instant; this policy only
/// decides what `travel` reports for instants strictly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndPolicy {
    /// Travelling past the end instant yields nothing.
    #[default]
    Strict,
    /// Travelling past the end instant yields the terminal version.
    Clamp,
}

/// Database configuration.
///
/// Designed to be easily serializable and loadable from JSON or TOML while
/// keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use chronograph::Config;
///
/// let config = Config::default();
/// assert_eq!(config.start_instant, 0);
///
/// let json = r#"{ "start_instant": 10, "end_policy": "clamp" }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.start_instant, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instant the graph starts at before any epoch advancement.
    #[serde(default)]
    pub start_instant: Instant,

    /// What time travel reports for instants strictly after a node's end.
    #[serde(default)]
    pub end_policy: EndPolicy,

    /// Whether mutation statistics are tracked.
    #[serde(default = "Config::default_track_stats")]
    pub track_stats: bool,
}

impl Config {
    const fn default_track_stats() -> bool {
        true
    }

    pub fn with_start_instant(mut self, instant: Instant) -> Self {
        self.start_instant = instant;
        self
    }

    pub fn with_end_policy(mut self, policy: EndPolicy) -> Self {
        self.end_policy = policy;
        self
    }

    pub fn with_track_stats(mut self, track: bool) -> Self {
        self.track_stats = track;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_instant == NO_SUCH_INSTANT {
            return Err("start instant must not be the reserved sentinel".to_string());
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_instant: 0,
            end_policy: EndPolicy::default(),
            track_stats: Self::default_track_stats(),
        }
    }
}

/// Mutation statistics for a graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of logical nodes, alive or ended.
    pub node_count: usize,
    /// Total number of physical version records across all node chains.
    pub version_count: usize,
    /// Number of nodes whose chain has been ended.
    pub ended_count: usize,
    /// Number of light edges currently declared.
    pub light_edge_count: usize,
    /// Number of heavy edges, alive or ended.
    pub heavy_edge_count: usize,
    /// Total number of mutation operations performed.
    pub operations_count: u64,
}

impl GraphStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self) {
        self.operations_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.start_instant, 0);
        assert_eq!(config.end_policy, EndPolicy::Strict);
        assert!(config.track_stats);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_sentinel_start() {
        let config = Config::default().with_start_instant(NO_SUCH_INSTANT);
        assert!(config.validate().is_err());
        assert!(Config::from_json(&format!("{{ \"start_instant\": {} }}", NO_SUCH_INSTANT)).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_start_instant(42)
            .with_end_policy(EndPolicy::Clamp)
            .with_track_stats(false);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();

        assert_eq!(deserialized.start_instant, 42);
        assert_eq!(deserialized.end_policy, EndPolicy::Clamp);
        assert!(!deserialized.track_stats);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default().with_end_policy(EndPolicy::Clamp);
        let toml_str = config.to_toml().unwrap();
        let deserialized = Config::from_toml(&toml_str).unwrap();
        assert_eq!(deserialized.end_policy, EndPolicy::Clamp);
    }

    #[test]
    fn test_property_value_conversions() {
        assert_eq!(PropertyValue::from(5i64).as_int(), Some(5));
        assert_eq!(PropertyValue::from("abc").as_str(), Some("abc"));
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(1.5f64).as_int(), None);
    }

    #[test]
    fn test_version_id_equality() {
        let a = VersionId::new(NodeId(1), 3);
        let b = VersionId::new(NodeId(1), 3);
        let c = VersionId::new(NodeId(1), 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_graph_stats() {
        let mut stats = GraphStats::new();
        assert_eq!(stats.operations_count, 0);
        stats.record_operation();
        assert_eq!(stats.operations_count, 1);
    }
}
