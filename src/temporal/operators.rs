//! Temporal operators over node histories.
//!
//! Quantifiers (`always`, `never`, `eventually` and its counted variants)
//! fold a predicate over every visible version, oldest to newest, through
//! a short-circuit reducer. Range operators (`since`, `after`, `until`,
//! `before`) scan the window between the observed instant and the newest
//! version, newest first, and derive a scoped view from the first match.
//! `when` restricts the history to exactly the matching versions.
//!
//! A predicate failure aborts the whole operator with
//! [`GraphError::Predicate`], carrying the operator name and the instant
//! under evaluation.

use crate::error::{GraphError, PredicateError, Result};
use crate::scope::TimeNode;
use log::debug;
use crate::temporal::reducers::{
    AlwaysReducer, EventuallyAtLeastReducer, EventuallyAtMostReducer, NeverReducer,
    ShortCircuitReducer,
};

fn check<'g, P>(
    operator: &'static str,
    version: &TimeNode<'g>,
    pred: &mut P,
) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    pred(version).map_err(|source| GraphError::Predicate {
        operator,
        instant: version.instant(),
        source,
    })
}

fn quantify<'g, R, P>(
    operator: &'static str,
    node: &TimeNode<'g>,
    mut reducer: R,
    mut pred: P,
) -> Result<bool>
where
    R: ShortCircuitReducer,
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    for version in node.all_versions()? {
        let matched = check(operator, &version, &mut pred)?;
        if let Some(verdict) = reducer.reduce(matched) {
            return Ok(verdict);
        }
    }
    Ok(reducer.finalize())
}

/// True iff `pred` holds on every visible version.
pub fn always<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    quantify("always", node, AlwaysReducer, pred)
}

/// True iff `pred` holds on no visible version.
pub fn never<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    quantify("never", node, NeverReducer, pred)
}

/// True iff `pred` holds on at least one visible version.
pub fn eventually<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    quantify("eventually", node, EventuallyAtLeastReducer::new(1), pred)
}

/// True iff `pred` holds on at least `target` visible versions. The scan
/// stops as soon as the target is reached.
pub fn eventually_at_least<'g, P>(node: &TimeNode<'g>, target: usize, pred: P) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    quantify(
        "eventually_at_least",
        node,
        EventuallyAtLeastReducer::new(target),
        pred,
    )
}

/// True iff `pred` holds on at least one and at most `max` visible
/// versions.
pub fn eventually_at_most<'g, P>(node: &TimeNode<'g>, max: usize, pred: P) -> Result<bool>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    quantify(
        "eventually_at_most",
        node,
        EventuallyAtMostReducer::new(max),
        pred,
    )
}

/// Scan the versions in `[observed, newest]`, newest first, and combine
/// the original view with the first version matching `pred`.
fn version_range<'g, P, C>(
    operator: &'static str,
    node: &TimeNode<'g>,
    mut pred: P,
    combine: C,
) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
    C: FnOnce(&TimeNode<'g>, &TimeNode<'g>) -> Result<Option<TimeNode<'g>>>,
{
    let window = node.versions_between(node.instant(), node.latest_instant()?)?;
    for version in window.iter().rev() {
        if check(operator, version, &mut pred)? {
            debug!("{operator} matched at instant {}", version.instant());
            return combine(node, version);
        }
    }
    Ok(None)
}

/// View scoped to start at the newest version in `[observed, newest]`
/// matching `pred`, or `None` if no version matches.
pub fn since<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    version_range("since", node, pred, |_, matched| {
        Ok(Some(matched.clone().starting_here()))
    })
}

/// View scoped to start at the version following the newest match of
/// `pred`, or `None` if there is no match or the match is the newest
/// version.
pub fn after<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    version_range("after", node, pred, |_, matched| {
        Ok(matched.next()?.map(TimeNode::starting_here))
    })
}

/// The original view scoped to end at the newest match of `pred`, or
/// `None` if no version matches.
pub fn until<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    version_range("until", node, pred, |original, matched| {
        Ok(Some(original.clone().ending_at(matched.instant())))
    })
}

/// The original view scoped to end just before the newest match of
/// `pred`, or `None` if there is no match or the match has no
/// predecessor.
pub fn before<'g, P>(node: &TimeNode<'g>, pred: P) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    version_range("before", node, pred, |original, matched| {
        Ok(matched
            .previous_instant()?
            .map(|cutoff| original.clone().ending_at(cutoff)))
    })
}

/// View restricted to exactly the versions in `[observed, newest]`
/// matching `pred`, observed at the oldest match. `None` when no version
/// matches. Like `since`, the window starts at the observed instant, so
/// rewind to `earliest` first to cover the whole history.
pub fn when<'g, P>(node: &TimeNode<'g>, mut pred: P) -> Result<Option<TimeNode<'g>>>
where
    P: FnMut(&TimeNode<'g>) -> std::result::Result<bool, PredicateError>,
{
    let mut matches = Vec::new();
    for version in node.versions_between(node.instant(), node.latest_instant()?)? {
        if check("when", &version, &mut pred)? {
            matches.push(version.instant());
        }
    }
    debug!("when matched {} of the visible versions", matches.len());
    let Some(&earliest) = matches.first() else {
        return Ok(None);
    };
    let Some(anchor) = node.travel_to(earliest) else {
        return Ok(None);
    };
    matches.reverse();
    let position = matches.len() - 1;
    Ok(Some(anchor.when_matching(matches, position)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TemporalGraph;
    use crate::types::{NodeId, PropertyMap, PropertyValue};

    /// Chain with versions at 0, 2, 5 and 7; "x" is 0, 1, 2, 3.
    fn graph_with_history() -> (TemporalGraph, NodeId) {
        let mut g = TemporalGraph::memory().unwrap();
        let mut props = PropertyMap::new();
        props.insert("x".into(), PropertyValue::Int(0));
        let v = g.create_node(props).unwrap();
        for (t, x) in [(2u64, 1i64), (5, 2), (7, 3)] {
            g.advance_to(t).unwrap();
            g.set_property(v.node, "x", PropertyValue::Int(x)).unwrap();
        }
        (g, v.node)
    }

    fn x_equals(
        value: i64,
    ) -> impl FnMut(&TimeNode<'_>) -> std::result::Result<bool, crate::PredicateError> {
        move |v| Ok(v.property("x")?.and_then(|p| p.as_int()) == Some(value))
    }

    #[test]
    fn test_quantifiers() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.head(id).unwrap());

        assert!(always(&node, |v| Ok(v.property("x")?.is_some())).unwrap());
        assert!(!always(&node, x_equals(2)).unwrap());
        assert!(never(&node, x_equals(9)).unwrap());
        assert!(!never(&node, x_equals(2)).unwrap());
        assert!(eventually(&node, x_equals(2)).unwrap());
        assert!(!eventually(&node, x_equals(9)).unwrap());
    }

    #[test]
    fn test_counted_quantifiers() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.head(id).unwrap());
        let odd = |v: &TimeNode<'_>| -> std::result::Result<bool, crate::PredicateError> {
            Ok(v.property("x")?.and_then(|p| p.as_int()).unwrap() % 2 == 1)
        };

        assert!(eventually_at_least(&node, 2, odd).unwrap());
        assert!(!eventually_at_least(&node, 3, odd).unwrap());
        assert!(eventually_at_most(&node, 2, odd).unwrap());
        assert!(!eventually_at_most(&node, 1, odd).unwrap());
        assert!(!eventually_at_most(&node, 2, x_equals(9)).unwrap());
    }

    #[test]
    fn test_quantifier_short_circuits() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.head(id).unwrap());

        let mut evaluated = 0;
        let verdict = eventually_at_least(&node, 2, |v| {
            evaluated += 1;
            Ok(v.property("x")?.and_then(|p| p.as_int()).unwrap() >= 1)
        })
        .unwrap();
        assert!(verdict);
        // Versions 0 and 2 miss and match; the match at 5 hits the target.
        assert_eq!(evaluated, 3);
    }

    #[test]
    fn test_since_anchors_at_match() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap());

        let scoped = since(&node, x_equals(2)).unwrap().unwrap();
        assert_eq!(scoped.instant(), 5);
        assert_eq!(scoped.earliest_instant().unwrap(), 5);
        assert_eq!(scoped.all_instants().unwrap(), vec![5, 7]);

        assert!(since(&node, x_equals(9)).unwrap().is_none());
    }

    #[test]
    fn test_since_window_starts_at_observed_instant() {
        let (g, id) = graph_with_history();
        // Observed at 5: the match at 2 is outside the window.
        let node = TimeNode::from(g.node_at(id, 5).unwrap());
        assert!(since(&node, x_equals(1)).unwrap().is_none());
    }

    #[test]
    fn test_since_picks_newest_match() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap());
        let odd = |v: &TimeNode<'_>| -> std::result::Result<bool, crate::PredicateError> {
            Ok(v.property("x")?.and_then(|p| p.as_int()).unwrap() % 2 == 1)
        };

        // Odd at 2 (x=1) and 7 (x=3); the backward scan finds 7 first.
        let scoped = since(&node, odd).unwrap().unwrap();
        assert_eq!(scoped.instant(), 7);
    }

    #[test]
    fn test_after_skips_the_match_itself() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap());

        let scoped = after(&node, x_equals(2)).unwrap().unwrap();
        assert_eq!(scoped.earliest_instant().unwrap(), 7);

        // The newest version has no successor.
        assert!(after(&node, x_equals(3)).unwrap().is_none());
    }

    #[test]
    fn test_until_and_before() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap());

        let until_view = until(&node, x_equals(2)).unwrap().unwrap();
        assert_eq!(until_view.all_instants().unwrap(), vec![0, 2, 5]);

        let before_view = before(&node, x_equals(2)).unwrap().unwrap();
        assert_eq!(before_view.all_instants().unwrap(), vec![0, 2]);

        // The oldest version has no predecessor.
        assert!(before(&node, x_equals(0)).unwrap().is_none());
    }

    #[test]
    fn test_when_collects_exact_matches() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap());
        let odd = |v: &TimeNode<'_>| -> std::result::Result<bool, crate::PredicateError> {
            Ok(v.property("x")?.and_then(|p| p.as_int()).unwrap() % 2 == 1)
        };

        let view = when(&node, odd).unwrap().unwrap();
        assert_eq!(view.instant(), 2);
        assert_eq!(view.all_instants().unwrap(), vec![2, 7]);
        assert_eq!(view.property("x").unwrap().unwrap().as_int(), Some(1));

        assert!(when(&node, x_equals(9)).unwrap().is_none());
    }

    #[test]
    fn test_when_window_starts_at_observed_instant() {
        let (g, id) = graph_with_history();
        // Observed at 5: the matching version at 2 is outside the window.
        let node = TimeNode::from(g.node_at(id, 5).unwrap());
        assert!(when(&node, x_equals(1)).unwrap().is_none());
    }

    #[test]
    fn test_predicate_failure_aborts() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.head(id).unwrap());

        let result = always(&node, |v| {
            if v.instant() == 5 {
                Err("boom".into())
            } else {
                Ok(true)
            }
        });
        match result {
            Err(GraphError::Predicate { operator, instant, .. }) => {
                assert_eq!(operator, "always");
                assert_eq!(instant, 5);
            }
            other => panic!("expected predicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_operators_respect_existing_scopes() {
        let (g, id) = graph_with_history();
        let node = TimeNode::from(g.node_at(id, 0).unwrap()).ending_at(5);

        // The version at 7 matches but is outside the scope.
        assert!(never(&node, x_equals(3)).unwrap());
        assert!(since(&node, x_equals(3)).unwrap().is_none());
    }
}
