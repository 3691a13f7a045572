//! Activity points of a single temporal edge

use std::collections::HashSet;
use std::fmt;

use super::Time;

/// Set of time points at which an edge is active
///
/// The maximum point is tracked so that horizon bookkeeping in
/// [`TemporalGraph`](super::TemporalGraph) stays cheap; removing the
/// maximum triggers a rescan of the remaining points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    points: HashSet<Time>,
    max_time: Option<Time>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline active at exactly `t`
    pub fn at(t: Time) -> Self {
        let mut res = Self::new();
        res.add(t);
        res
    }

    /// Timeline active on `[begin, end]`
    pub fn range(begin: Time, end: Time) -> Self {
        let mut res = Self::new();
        res.add_range(begin, end);
        res
    }

    /// Largest active point, `None` when empty
    pub fn max_time(&self) -> Option<Time> {
        self.max_time
    }

    /// Add a point, returning `false` if it was already active
    pub fn add(&mut self, t: Time) -> bool {
        let added = self.points.insert(t);
        if added {
            self.max_time = Some(self.max_time.map_or(t, |m| m.max(t)));
        }
        added
    }

    /// Add every point of `[begin, end]`, returning how many were new
    ///
    /// # Panics
    ///
    /// Panics if `begin > end`.
    pub fn add_range(&mut self, begin: Time, end: Time) -> usize {
        assert!(begin <= end, "timeline interval [{begin}, {end}] is reversed");
        (begin..=end).filter(|&t| self.add(t)).count()
    }

    /// Remove a point, returning `false` if it was not active
    pub fn remove(&mut self, t: Time) -> bool {
        let removed = self.points.remove(&t);
        if removed && self.max_time == Some(t) {
            self.rescan_max();
        }
        removed
    }

    /// Remove every point of `[begin, end]`, returning how many were active
    ///
    /// # Panics
    ///
    /// Panics if `begin > end`.
    pub fn remove_range(&mut self, begin: Time, end: Time) -> usize {
        assert!(begin <= end, "timeline interval [{begin}, {end}] is reversed");
        let before = self.points.len();
        let width = (end - begin) as usize + 1;
        if width > before {
            self.points.retain(|t| !(begin..=end).contains(t));
        } else {
            for t in begin..=end {
                self.points.remove(&t);
            }
        }
        if self.max_time.is_some_and(|m| (begin..=end).contains(&m)) {
            self.rescan_max();
        }
        before - self.points.len()
    }

    fn rescan_max(&mut self) {
        self.max_time = self.points.iter().copied().max();
    }

    pub fn contains(&self, t: Time) -> bool {
        self.points.contains(&t)
    }

    /// Earliest active point
    pub fn first(&self) -> Option<Time> {
        self.points.iter().copied().min()
    }

    /// Latest active point
    pub fn last(&self) -> Option<Time> {
        self.max_time
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Active points in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = Time> + '_ {
        self.points.iter().copied()
    }

    /// Active points in ascending order
    pub fn sorted(&self) -> Vec<Time> {
        let mut res: Vec<Time> = self.iter().collect();
        res.sort_unstable();
        res
    }
}

impl FromIterator<Time> for Timeline {
    fn from_iter<I: IntoIterator<Item = Time>>(iter: I) -> Self {
        let mut res = Timeline::new();
        for t in iter {
            res.add(t);
        }
        res
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.sorted().iter().map(|t| t.to_string()).collect();
        write!(f, "[{}]", items.join(","))
    }
}
