//! Temporal scoping of node views.
//!
//! A scope narrows which part of a node's history is visible without
//! copying anything: a starting scope hides everything before an origin
//! instant, an ending scope hides everything after a cutoff, and a
//! when scope restricts the history to an explicit set of matching
//! instants. Scopes nest, and every navigation result is re-wrapped in
//! the same scope so the restriction survives time travel.

use crate::error::{GraphError, Result};
use crate::graph::Edge;
use crate::node::NodeVersion;
use crate::types::{Instant, NodeId, PropertyMap, PropertyValue};

/// Restriction applied by one scope layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Bound {
    /// History before this instant is hidden; the origin becomes the
    /// earliest visible instant.
    Starting(Instant),
    /// History after this instant is hidden; the cutoff becomes the
    /// latest visible instant.
    Ending(Instant),
    /// History is restricted to these instants, newest first. `position`
    /// indexes the instant currently observed.
    When {
        instants: Vec<Instant>,
        position: usize,
    },
}

/// One scope layer around an inner node view.
#[derive(Debug, Clone)]
pub struct ScopedNode<'g> {
    original: Box<TimeNode<'g>>,
    bound: Bound,
}

/// Node view with zero or more temporal scopes applied.
///
/// All navigation goes through this enum so that a scoped view and a
/// plain view read identically; the scope layers adjust the instants on
/// the way in and re-wrap the views on the way out.
#[derive(Debug, Clone)]
pub enum TimeNode<'g> {
    Plain(NodeVersion<'g>),
    Scoped(ScopedNode<'g>),
}

impl<'g> From<NodeVersion<'g>> for TimeNode<'g> {
    fn from(view: NodeVersion<'g>) -> Self {
        TimeNode::Plain(view)
    }
}

impl<'g> TimeNode<'g> {
    // ---- scope construction ------------------------------------------

    /// Hide history before `origin`.
    pub fn starting_from(self, origin: Instant) -> TimeNode<'g> {
        TimeNode::Scoped(ScopedNode {
            original: Box::new(self),
            bound: Bound::Starting(origin),
        })
    }

    /// Hide history before the currently observed instant.
    pub fn starting_here(self) -> TimeNode<'g> {
        let origin = self.instant();
        self.starting_from(origin)
    }

    /// Hide history after `cutoff`.
    pub fn ending_at(self, cutoff: Instant) -> TimeNode<'g> {
        TimeNode::Scoped(ScopedNode {
            original: Box::new(self),
            bound: Bound::Ending(cutoff),
        })
    }

    /// Restrict history to `instants` (must be sorted newest first and
    /// non-empty), observing the one at `position`.
    pub(crate) fn when_matching(self, instants: Vec<Instant>, position: usize) -> TimeNode<'g> {
        debug_assert!(!instants.is_empty());
        debug_assert!(instants.windows(2).all(|w| w[0] > w[1]));
        TimeNode::Scoped(ScopedNode {
            original: Box::new(self),
            bound: Bound::When { instants, position },
        })
    }

    /// Strip every scope layer, yielding the underlying plain view at the
    /// currently observed instant.
    pub fn unscope(&self) -> NodeVersion<'g> {
        match self {
            TimeNode::Plain(view) => *view,
            TimeNode::Scoped(scoped) => scoped.original.unscope(),
        }
    }

    // ---- identity ----------------------------------------------------

    pub fn id(&self) -> NodeId {
        match self {
            TimeNode::Plain(view) => view.id(),
            TimeNode::Scoped(scoped) => scoped.original.id(),
        }
    }

    /// The instant currently observed, unchanged by scoping.
    pub fn instant(&self) -> Instant {
        match self {
            TimeNode::Plain(view) => view.instant(),
            TimeNode::Scoped(scoped) => scoped.original.instant(),
        }
    }

    // ---- reads at the observed instant -------------------------------

    pub fn is_alive(&self) -> Result<bool> {
        match self {
            TimeNode::Plain(view) => view.is_alive(),
            TimeNode::Scoped(scoped) => scoped.original.is_alive(),
        }
    }

    pub fn property(&self, key: &str) -> Result<Option<PropertyValue>> {
        match self {
            TimeNode::Plain(view) => view.property(key),
            TimeNode::Scoped(scoped) => scoped.original.property(key),
        }
    }

    pub fn properties(&self) -> Result<PropertyMap> {
        match self {
            TimeNode::Plain(view) => view.properties(),
            TimeNode::Scoped(scoped) => scoped.original.properties(),
        }
    }

    pub fn edges(&self) -> Result<Vec<Edge>> {
        self.unscope().edges()
    }

    // ---- time travel -------------------------------------------------

    /// The same node observed at instant `t`, with every scope layer
    /// re-applied. Travel outside the scope clamps to its boundary for
    /// starting and ending scopes, and resolves to the newest matching
    /// instant not after `t` for when scopes.
    pub fn travel_to(&self, t: Instant) -> Option<TimeNode<'g>> {
        match self {
            TimeNode::Plain(view) => view.travel_to(t).map(TimeNode::Plain),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(origin) => {
                    let inner = scoped.original.travel_to(t.max(*origin))?;
                    Some(inner.starting_from(*origin))
                }
                Bound::Ending(cutoff) => {
                    let inner = scoped.original.travel_to(t.min(*cutoff))?;
                    Some(inner.ending_at(*cutoff))
                }
                Bound::When { instants, .. } => {
                    let position = instants.iter().position(|&m| m <= t)?;
                    let inner = scoped.original.travel_to(instants[position])?;
                    Some(inner.when_matching(instants.clone(), position))
                }
            },
        }
    }

    /// The oldest visible version.
    pub fn earliest(&self) -> Result<TimeNode<'g>> {
        let t = self.earliest_instant()?;
        self.travel_to(t).ok_or(GraphError::NoSuchInstant(t))
    }

    /// The newest visible version.
    pub fn latest(&self) -> Result<TimeNode<'g>> {
        let t = self.latest_instant()?;
        self.travel_to(t).ok_or(GraphError::NoSuchInstant(t))
    }

    pub fn earliest_instant(&self) -> Result<Instant> {
        match self {
            TimeNode::Plain(view) => view.earliest_instant(),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(origin) => Ok(*origin),
                Bound::Ending(_) => scoped.original.earliest_instant(),
                Bound::When { instants, .. } => Ok(instants[instants.len() - 1]),
            },
        }
    }

    pub fn latest_instant(&self) -> Result<Instant> {
        match self {
            TimeNode::Plain(view) => view.latest_instant(),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(_) => scoped.original.latest_instant(),
                Bound::Ending(cutoff) => Ok(*cutoff),
                Bound::When { instants, .. } => Ok(instants[0]),
            },
        }
    }

    /// The version preceding the currently observed one, if the scope
    /// still shows it.
    pub fn previous(&self) -> Result<Option<TimeNode<'g>>> {
        Ok(self.previous_instant()?.and_then(|t| self.travel_to(t)))
    }

    /// The version following the currently observed one, if the scope
    /// still shows it.
    pub fn next(&self) -> Result<Option<TimeNode<'g>>> {
        Ok(self.next_instant()?.and_then(|t| self.travel_to(t)))
    }

    pub fn previous_instant(&self) -> Result<Option<Instant>> {
        match self {
            TimeNode::Plain(view) => view.previous_instant(),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(origin) => Ok(scoped
                    .original
                    .previous_instant()?
                    .filter(|&t| t >= *origin)),
                Bound::Ending(_) => scoped.original.previous_instant(),
                Bound::When { instants, position } => {
                    Ok(instants.get(position + 1).copied())
                }
            },
        }
    }

    pub fn next_instant(&self) -> Result<Option<Instant>> {
        match self {
            TimeNode::Plain(view) => view.next_instant(),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(_) => scoped.original.next_instant(),
                Bound::Ending(cutoff) => Ok(scoped
                    .original
                    .next_instant()?
                    .filter(|&t| t <= *cutoff)),
                Bound::When { instants, position } => {
                    if *position == 0 {
                        Ok(None)
                    } else {
                        Ok(Some(instants[position - 1]))
                    }
                }
            },
        }
    }

    // ---- history enumeration -----------------------------------------

    /// Every visible version instant, oldest to newest.
    pub fn all_instants(&self) -> Result<Vec<Instant>> {
        self.instants_between(0, Instant::MAX - 1)
    }

    /// Visible version instants in `[from, to]`, oldest to newest. The
    /// requested window is clamped into the scope before descending, so
    /// a window entirely outside the scope collapses onto its boundary.
    pub fn instants_between(&self, from: Instant, to: Instant) -> Result<Vec<Instant>> {
        match self {
            TimeNode::Plain(view) => view.instants_between(from, to),
            TimeNode::Scoped(scoped) => match &scoped.bound {
                Bound::Starting(origin) => {
                    let from = from.max(*origin);
                    let to = to.max(from);
                    scoped.original.instants_between(from, to)
                }
                Bound::Ending(cutoff) => {
                    let to = to.min(*cutoff);
                    let from = from.min(to);
                    scoped.original.instants_between(from, to)
                }
                Bound::When { instants, .. } => Ok(instants
                    .iter()
                    .rev()
                    .copied()
                    .filter(|&m| m >= from && m <= to)
                    .collect()),
            },
        }
    }

    pub fn instants_from(&self, from: Instant) -> Result<Vec<Instant>> {
        self.instants_between(from, Instant::MAX - 1)
    }

    pub fn instants_up_to(&self, to: Instant) -> Result<Vec<Instant>> {
        self.instants_between(0, to)
    }

    /// Views at every visible version, oldest to newest, each carrying
    /// the full scope.
    pub fn all_versions(&self) -> Result<Vec<TimeNode<'g>>> {
        let instants = self.all_instants()?;
        Ok(instants
            .into_iter()
            .filter_map(|t| self.travel_to(t))
            .collect())
    }

    /// Views at every visible version in `[from, to]`, oldest to newest.
    pub fn versions_between(&self, from: Instant, to: Instant) -> Result<Vec<TimeNode<'g>>> {
        let instants = self.instants_between(from, to)?;
        Ok(instants
            .into_iter()
            .filter_map(|t| self.travel_to(t))
            .collect())
    }

    pub fn versions_from(&self, from: Instant) -> Result<Vec<TimeNode<'g>>> {
        self.versions_between(from, Instant::MAX - 1)
    }

    pub fn versions_up_to(&self, to: Instant) -> Result<Vec<TimeNode<'g>>> {
        self.versions_between(0, to)
    }

    /// Number of visible versions.
    pub fn version_count(&self) -> Result<usize> {
        Ok(self.all_instants()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TemporalGraph;
    use crate::types::{NodeId, PropertyMap, PropertyValue};

    fn graph_with_history() -> (TemporalGraph, NodeId) {
        let mut g = TemporalGraph::memory().unwrap();
        let v = g.create_node(PropertyMap::new()).unwrap();
        for (t, x) in [(2u64, 1i64), (5, 2), (7, 3)] {
            g.advance_to(t).unwrap();
            g.set_property(v.node, "x", PropertyValue::Int(x)).unwrap();
        }
        (g, v.node)
    }

    fn node_at<'g>(g: &'g TemporalGraph, id: NodeId, t: Instant) -> TimeNode<'g> {
        TimeNode::from(g.node_at(id, t).unwrap())
    }

    #[test]
    fn test_starting_scope_hides_earlier_history() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 7).starting_from(5);

        assert_eq!(scoped.earliest_instant().unwrap(), 5);
        assert_eq!(scoped.all_instants().unwrap(), vec![5, 7]);
        assert_eq!(scoped.latest_instant().unwrap(), 7);
    }

    #[test]
    fn test_starting_scope_clamps_travel() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 7).starting_from(5);

        // Travel before the origin clamps onto it instead of escaping.
        let back = scoped.travel_to(0).unwrap();
        assert_eq!(back.instant(), 5);
        assert_eq!(back.property("x").unwrap().unwrap().as_int(), Some(2));
        // The result is still scoped.
        assert_eq!(back.earliest_instant().unwrap(), 5);
    }

    #[test]
    fn test_starting_scope_previous_stops_at_origin() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 7).starting_from(5);
        let at_origin = scoped.travel_to(5).unwrap();
        assert!(at_origin.previous().unwrap().is_none());
        assert_eq!(scoped.previous_instant().unwrap(), Some(5));
    }

    #[test]
    fn test_ending_scope_hides_later_history() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 0).ending_at(5);

        assert_eq!(scoped.all_instants().unwrap(), vec![0, 2, 5]);
        assert_eq!(scoped.latest_instant().unwrap(), 5);
        let fwd = scoped.travel_to(100).unwrap();
        assert_eq!(fwd.instant(), 5);
        assert!(fwd.next().unwrap().is_none());
    }

    #[test]
    fn test_nested_scopes_intersect() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 2).starting_from(2).ending_at(5);

        assert_eq!(scoped.all_instants().unwrap(), vec![2, 5]);
        assert_eq!(scoped.earliest_instant().unwrap(), 2);
        assert_eq!(scoped.latest_instant().unwrap(), 5);

        let below = scoped.travel_to(0).unwrap();
        assert_eq!(below.instant(), 2);
        let above = scoped.travel_to(9).unwrap();
        assert_eq!(above.instant(), 5);
    }

    #[test]
    fn test_unscope_returns_plain_view() {
        let (g, id) = graph_with_history();
        let scoped = node_at(&g, id, 7).starting_from(5);
        let plain = scoped.unscope();
        assert_eq!(plain.instant(), 7);
        assert_eq!(plain.all_instants().unwrap(), vec![0, 2, 5, 7]);
    }

    #[test]
    fn test_when_scope_enumerates_matches_ascending() {
        let (g, id) = graph_with_history();
        let when = node_at(&g, id, 5).when_matching(vec![7, 2], 1);

        assert_eq!(when.instant(), 5);
        assert_eq!(when.all_instants().unwrap(), vec![2, 7]);
        assert_eq!(when.earliest_instant().unwrap(), 2);
        assert_eq!(when.latest_instant().unwrap(), 7);
    }

    #[test]
    fn test_when_scope_travel_resolves_to_matches() {
        let (g, id) = graph_with_history();
        let when = node_at(&g, id, 7).when_matching(vec![7, 2], 0);

        // Between matches resolves onto the older match.
        let mid = when.travel_to(5).unwrap();
        assert_eq!(mid.instant(), 2);
        assert_eq!(mid.property("x").unwrap().unwrap().as_int(), Some(1));
        // Before the oldest match there is nothing.
        assert!(when.travel_to(1).is_none());
    }

    #[test]
    fn test_when_scope_neighbors_skip_hidden_versions() {
        let (g, id) = graph_with_history();
        let when = node_at(&g, id, 7).when_matching(vec![7, 2], 0);

        // Version 5 exists in the chain but is not a match.
        let prev = when.previous().unwrap().unwrap();
        assert_eq!(prev.instant(), 2);
        assert!(prev.previous().unwrap().is_none());
        let next = prev.next().unwrap().unwrap();
        assert_eq!(next.instant(), 7);
        assert!(next.next().unwrap().is_none());
    }
}
