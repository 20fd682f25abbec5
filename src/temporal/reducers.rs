//! Short-circuit reducers for version quantifiers.
//!
//! A quantifier feeds one boolean per version, oldest to newest, into a
//! reducer. The reducer may short-circuit by returning `Some(verdict)`,
//! in which case no further versions are evaluated; otherwise the verdict
//! comes from [`finalize`](ShortCircuitReducer::finalize) after the last
//! version.

/// Fold over a sequence of per-version predicate outcomes.
pub trait ShortCircuitReducer {
    /// Consume one outcome. `Some(verdict)` ends the scan early.
    fn reduce(&mut self, matched: bool) -> Option<bool>;

    /// Verdict after every version has been consumed.
    fn finalize(&self) -> bool;
}

/// True iff the predicate holds on every version.
#[derive(Debug, Default)]
pub struct AlwaysReducer;

impl ShortCircuitReducer for AlwaysReducer {
    fn reduce(&mut self, matched: bool) -> Option<bool> {
        if matched { None } else { Some(false) }
    }

    fn finalize(&self) -> bool {
        true
    }
}

/// True iff the predicate holds on no version.
#[derive(Debug, Default)]
pub struct NeverReducer;

impl ShortCircuitReducer for NeverReducer {
    fn reduce(&mut self, matched: bool) -> Option<bool> {
        if matched { Some(false) } else { None }
    }

    fn finalize(&self) -> bool {
        true
    }
}

/// True iff the predicate holds on at least `target` versions.
#[derive(Debug)]
pub struct EventuallyAtLeastReducer {
    target: usize,
    count: usize,
}

impl EventuallyAtLeastReducer {
    pub fn new(target: usize) -> Self {
        Self { target, count: 0 }
    }
}

impl ShortCircuitReducer for EventuallyAtLeastReducer {
    fn reduce(&mut self, matched: bool) -> Option<bool> {
        if matched {
            self.count += 1;
            if self.count >= self.target {
                return Some(true);
            }
        }
        None
    }

    fn finalize(&self) -> bool {
        self.count >= self.target
    }
}

/// True iff the predicate holds on at least one and at most `max`
/// versions. Short-circuits as soon as the maximum is exceeded.
#[derive(Debug)]
pub struct EventuallyAtMostReducer {
    max: usize,
    count: usize,
}

impl EventuallyAtMostReducer {
    pub fn new(max: usize) -> Self {
        Self { max, count: 0 }
    }
}

impl ShortCircuitReducer for EventuallyAtMostReducer {
    fn reduce(&mut self, matched: bool) -> Option<bool> {
        if matched {
            self.count += 1;
            if self.count > self.max {
                return Some(false);
            }
        }
        None
    }

    fn finalize(&self) -> bool {
        self.count >= 1 && self.count <= self.max
    }
}
