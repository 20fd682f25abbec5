//! Temporal query algebra.
//!
//! The operators in [`operators`] quantify a per-version predicate over a
//! node's visible history, or derive scoped views from the first version
//! matching it. [`EvalValue`] lets query front ends apply the same
//! operators to arbitrary evaluation results: on non-temporal values the
//! operators degrade softly instead of failing the whole query.

pub mod operators;
pub mod reducers;

use crate::error::{PredicateError, Result};
use crate::scope::TimeNode;
use log::warn;

/// One value flowing through a query evaluator: either a node view that
/// temporal operators can quantify over, or any other scalar result.
#[derive(Debug, Clone)]
pub enum EvalValue<'g> {
    Node(TimeNode<'g>),
    Scalar(serde_json::Value),
}

impl<'g> EvalValue<'g> {
    pub fn is_node(&self) -> bool {
        matches!(self, EvalValue::Node(_))
    }

    fn node(&self, operator: &'static str) -> Option<&TimeNode<'g>> {
        match self {
            EvalValue::Node(node) => Some(node),
            EvalValue::Scalar(value) => {
                warn!("{operator} applied to non-temporal value {value}, ignoring");
                None
            }
        }
    }

    /// [`operators::always`] on a node value; false on anything else.
    pub fn always<P>(&self, pred: P) -> Result<bool>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("always") {
            Some(node) => operators::always(node, pred),
            None => Ok(false),
        }
    }

    /// [`operators::never`] on a node value; false on anything else.
    pub fn never<P>(&self, pred: P) -> Result<bool>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("never") {
            Some(node) => operators::never(node, pred),
            None => Ok(false),
        }
    }

    /// [`operators::eventually`] on a node value; false on anything else.
    pub fn eventually<P>(&self, pred: P) -> Result<bool>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("eventually") {
            Some(node) => operators::eventually(node, pred),
            None => Ok(false),
        }
    }

    /// [`operators::eventually_at_least`] on a node value; false on
    /// anything else.
    pub fn eventually_at_least<P>(&self, target: usize, pred: P) -> Result<bool>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("eventually_at_least") {
            Some(node) => operators::eventually_at_least(node, target, pred),
            None => Ok(false),
        }
    }

    /// [`operators::eventually_at_most`] on a node value; false on
    /// anything else.
    pub fn eventually_at_most<P>(&self, max: usize, pred: P) -> Result<bool>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("eventually_at_most") {
            Some(node) => operators::eventually_at_most(node, max, pred),
            None => Ok(false),
        }
    }

    /// [`operators::since`] on a node value; `None` on anything else.
    pub fn since<P>(&self, pred: P) -> Result<Option<TimeNode<'g>>>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("since") {
            Some(node) => operators::since(node, pred),
            None => Ok(None),
        }
    }

    /// [`operators::after`] on a node value; `None` on anything else.
    pub fn after<P>(&self, pred: P) -> Result<Option<TimeNode<'g>>>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("after") {
            Some(node) => operators::after(node, pred),
            None => Ok(None),
        }
    }

    /// [`operators::until`] on a node value; `None` on anything else.
    pub fn until<P>(&self, pred: P) -> Result<Option<TimeNode<'g>>>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("until") {
            Some(node) => operators::until(node, pred),
            None => Ok(None),
        }
    }

    /// [`operators::before`] on a node value; `None` on anything else.
    pub fn before<P>(&self, pred: P) -> Result<Option<TimeNode<'g>>>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("before") {
            Some(node) => operators::before(node, pred),
            None => Ok(None),
        }
    }

    /// [`operators::when`] on a node value; `None` on anything else.
    pub fn when<P>(&self, pred: P) -> Result<Option<TimeNode<'g>>>
    where
        P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    {
        match self.node("when") {
            Some(node) => operators::when(node, pred),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TemporalGraph;
    use crate::types::PropertyMap;

    #[test]
    fn test_scalar_targets_degrade_softly() {
        let value: EvalValue<'_> = EvalValue::Scalar(serde_json::json!(42));
        assert!(!value.always(|_| Ok(true)).unwrap());
        assert!(!value.eventually(|_| Ok(true)).unwrap());
        assert!(value.since(|_| Ok(true)).unwrap().is_none());
        assert!(value.when(|_| Ok(true)).unwrap().is_none());
    }

    #[test]
    fn test_node_targets_delegate() {
        let mut g = TemporalGraph::memory().unwrap();
        let v = g.create_node(PropertyMap::new()).unwrap();
        let value = EvalValue::Node(TimeNode::from(g.head(v.node).unwrap()));
        assert!(value.is_node());
        assert!(value.always(|_| Ok(true)).unwrap());
        assert!(value.never(|_| Ok(false)).unwrap());
    }
}
