//! Version chains: the per-logical-node history of immutable versions.

use crate::types::{EndPolicy, Instant, PropertyMap};
use smallvec::SmallVec;

/// One physical version of a logical node: the instant it became current
/// plus its property map. Edge visibility is derived at query time and is
/// not stored on the record.
#[derive(Debug, Clone)]
pub(crate) struct VersionRecord {
    pub instant: Instant,
    pub props: PropertyMap,
}

/// Ordered sequence of version records for one logical identity.
///
/// Invariants: instants are strictly increasing and unique; the end
/// instant, if set, is greater than or equal to the last record's instant;
/// ending is irreversible. The chain is append-only apart from in-place
/// property writes on the live head at its own instant.
#[derive(Debug, Clone)]
pub(crate) struct VersionChain {
    versions: SmallVec<[VersionRecord; 2]>,
    end: Option<Instant>,
}

impl VersionChain {
    pub fn new(instant: Instant, props: PropertyMap) -> Self {
        let mut versions = SmallVec::new();
        versions.push(VersionRecord { instant, props });
        Self { versions, end: None }
    }

    pub fn earliest_instant(&self) -> Instant {
        self.versions[0].instant
    }

    pub fn latest_instant(&self) -> Instant {
        self.versions[self.versions.len() - 1].instant
    }

    pub fn end_instant(&self) -> Option<Instant> {
        self.end
    }

    pub fn is_ended(&self) -> bool {
        self.end.is_some()
    }

    /// Whether the logical node is alive at `t`. A node is alive exactly at
    /// its end instant; the first dead instant is `end + 1`.
    pub fn alive_at(&self, t: Instant) -> bool {
        t >= self.earliest_instant() && self.end.map_or(true, |e| t <= e)
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Record valid at `t`: the record with the greatest instant `<= t`.
    /// `None` before the earliest instant; past the end instant the result
    /// depends on the policy.
    pub fn record_at(&self, t: Instant, policy: EndPolicy) -> Option<&VersionRecord> {
        if t < self.earliest_instant() {
            return None;
        }
        if let Some(e) = self.end {
            if t > e && policy == EndPolicy::Strict {
                return None;
            }
        }
        let idx = match self.versions.binary_search_by_key(&t, |r| r.instant) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Some(&self.versions[idx])
    }

    /// Record at exactly `t`, ignoring liveness. Used to materialize
    /// historical views, which must never fail on ended nodes.
    pub fn record_exactly_at(&self, t: Instant) -> Option<&VersionRecord> {
        self.versions
            .binary_search_by_key(&t, |r| r.instant)
            .ok()
            .map(|i| &self.versions[i])
    }

    /// Instant of the record valid at `t`, under the same rules as
    /// [`record_at`](Self::record_at).
    pub fn instant_at(&self, t: Instant, policy: EndPolicy) -> Option<Instant> {
        self.record_at(t, policy).map(|r| r.instant)
    }

    /// All instants, oldest to newest.
    pub fn instants(&self) -> impl DoubleEndedIterator<Item = Instant> + '_ {
        self.versions.iter().map(|r| r.instant)
    }

    /// Instants in `[from, to]`, oldest to newest. Empty when `from > to`.
    pub fn instants_between(&self, from: Instant, to: Instant) -> Vec<Instant> {
        self.instants().filter(|&i| i >= from && i <= to).collect()
    }

    /// Greatest instant strictly before `t`.
    pub fn previous_instant(&self, t: Instant) -> Option<Instant> {
        self.instants().filter(|&i| i < t).next_back()
    }

    /// Smallest instant strictly after `t`.
    pub fn next_instant(&self, t: Instant) -> Option<Instant> {
        self.instants().find(|&i| i > t)
    }

    pub fn head(&self) -> &VersionRecord {
        &self.versions[self.versions.len() - 1]
    }

    /// Mutable access to the head's property map, for in-place writes at
    /// the head's own instant. Caller has already checked liveness.
    pub fn head_props_mut(&mut self) -> &mut PropertyMap {
        let last = self.versions.len() - 1;
        &mut self.versions[last].props
    }

    /// Append a new version. Caller has already checked liveness and that
    /// `instant` is past the current head.
    pub fn push(&mut self, instant: Instant, props: PropertyMap) {
        debug_assert!(self.end.is_none());
        debug_assert!(instant > self.latest_instant());
        self.versions.push(VersionRecord { instant, props });
    }

    /// Terminate the chain at `instant`. Caller has already checked
    /// liveness and that `instant` is not before the head.
    pub fn end_at(&mut self, instant: Instant) {
        debug_assert!(self.end.is_none());
        debug_assert!(instant >= self.latest_instant());
        self.end = Some(instant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> VersionChain {
        let mut c = VersionChain::new(2, PropertyMap::new());
        c.push(5, PropertyMap::new());
        c.push(7, PropertyMap::new());
        c
    }

    #[test]
    fn test_record_at_between_versions() {
        let c = chain();
        assert_eq!(c.instant_at(2, EndPolicy::Strict), Some(2));
        assert_eq!(c.instant_at(4, EndPolicy::Strict), Some(2));
        assert_eq!(c.instant_at(5, EndPolicy::Strict), Some(5));
        assert_eq!(c.instant_at(6, EndPolicy::Strict), Some(5));
        assert_eq!(c.instant_at(100, EndPolicy::Strict), Some(7));
    }

    #[test]
    fn test_record_before_earliest_is_none() {
        let c = chain();
        assert_eq!(c.instant_at(1, EndPolicy::Strict), None);
        assert_eq!(c.instant_at(0, EndPolicy::Clamp), None);
    }

    #[test]
    fn test_end_boundary_is_inclusive() {
        let mut c = chain();
        c.end_at(9);
        assert!(c.alive_at(9));
        assert!(!c.alive_at(10));
        // Still resolvable exactly at the end instant.
        assert_eq!(c.instant_at(9, EndPolicy::Strict), Some(7));
    }

    #[test]
    fn test_end_policy_controls_past_end_travel() {
        let mut c = chain();
        c.end_at(9);
        assert_eq!(c.instant_at(10, EndPolicy::Strict), None);
        assert_eq!(c.instant_at(10, EndPolicy::Clamp), Some(7));
    }

    #[test]
    fn test_neighbors() {
        let c = chain();
        assert_eq!(c.previous_instant(7), Some(5));
        assert_eq!(c.previous_instant(2), None);
        assert_eq!(c.next_instant(2), Some(5));
        assert_eq!(c.next_instant(7), None);
    }

    #[test]
    fn test_instants_between_clamps() {
        let c = chain();
        assert_eq!(c.instants_between(0, 100), vec![2, 5, 7]);
        assert_eq!(c.instants_between(3, 7), vec![5, 7]);
        assert_eq!(c.instants_between(5, 5), vec![5]);
        assert!(c.instants_between(6, 3).is_empty());
    }
}
