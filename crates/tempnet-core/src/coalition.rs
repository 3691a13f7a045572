//! Node sets with constant-time membership and sampling
//!
//! A [`Coalition`] stores its members densely in a vector and keeps a
//! position index next to it, so that `contains`, `add`, `remove` and a
//! uniform random draw are all O(1). Removal swaps the last member into
//! the freed slot, which means iteration order is arbitrary and changes
//! as the set is edited.
//!
//! Set algebra comes in two flavours:
//!
//! - **Closed**: [`Coalition::intersection`], [`Coalition::union`],
//!   [`Coalition::difference`] and [`Coalition::filtered`] leave their
//!   inputs untouched and return a new set.
//! - **In place**: [`Coalition::intersect`], [`Coalition::unite`],
//!   [`Coalition::subtract`] and [`Coalition::filter`] mutate the receiver
//!   and return it, so pipelines can be chained without allocating.

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

use rand::Rng;

/// A set of node indices
#[derive(Clone, Default)]
pub struct Coalition {
    members: Vec<usize>,
    positions: HashMap<usize, usize>,
}

impl Coalition {
    /// Create an empty coalition
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty coalition with room for `capacity` members
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Create a coalition holding exactly `v`
    pub fn singleton(v: usize) -> Self {
        let mut res = Self::with_capacity(1);
        res.add(v);
        res
    }

    /// Create the coalition `[0, n)`
    pub fn full(n: usize) -> Self {
        let mut res = Self::with_capacity(n);
        res.add_all(0..n);
        res
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, v: usize) -> bool {
        self.positions.contains_key(&v)
    }

    /// Add a member, returning `false` if it was already present
    pub fn add(&mut self, v: usize) -> bool {
        if self.positions.contains_key(&v) {
            return false;
        }
        self.positions.insert(v, self.members.len());
        self.members.push(v);
        true
    }

    /// Remove a member, returning `false` if it was absent
    pub fn remove(&mut self, v: usize) -> bool {
        match self.positions.remove(&v) {
            Some(pos) => {
                self.members.swap_remove(pos);
                if let Some(&moved) = self.members.get(pos) {
                    self.positions.insert(moved, pos);
                }
                true
            }
            None => false,
        }
    }

    /// Add every element of `items`
    pub fn add_all<I: IntoIterator<Item = usize>>(&mut self, items: I) -> &mut Self {
        for v in items {
            self.add(v);
        }
        self
    }

    /// Remove every element of `items`
    pub fn remove_all<I: IntoIterator<Item = usize>>(&mut self, items: I) -> &mut Self {
        for v in items {
            self.remove(v);
        }
        self
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.positions.clear();
    }

    /// Iterate over members in storage order
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.members.iter().copied()
    }

    /// Members in ascending order
    pub fn sorted(&self) -> Vec<usize> {
        let mut res = self.members.clone();
        res.sort_unstable();
        res
    }

    /// Some member of the coalition, without randomization
    pub fn any(&self) -> Option<usize> {
        self.members.last().copied()
    }

    /// Remove and return some member, without randomization
    pub fn remove_any(&mut self) -> Option<usize> {
        let v = self.members.pop()?;
        self.positions.remove(&v);
        Some(v)
    }

    /// Uniformly random member
    pub fn random(&self) -> Option<usize> {
        self.random_with(&mut rand::rng())
    }

    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.members.is_empty() {
            None
        } else {
            Some(self.members[rng.random_range(0..self.members.len())])
        }
    }

    /// Up to `k` distinct members drawn uniformly without replacement
    pub fn random_subset(&self, k: usize) -> Coalition {
        self.random_subset_with(&mut rand::rng(), k)
    }

    pub fn random_subset_with<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> Coalition {
        if k >= self.len() {
            return self.clone();
        }
        rand::seq::index::sample(rng, self.len(), k)
            .into_iter()
            .map(|pos| self.members[pos])
            .collect()
    }

    /// Remove a uniformly random member and return it
    pub fn remove_random(&mut self) -> Option<usize> {
        self.remove_random_with(&mut rand::rng())
    }

    pub fn remove_random_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let v = self.random_with(rng)?;
        self.remove(v);
        Some(v)
    }

    /// Keep only the members satisfying `pred`
    pub fn filter<F: FnMut(usize) -> bool>(&mut self, pred: F) -> &mut Self {
        self.extract_unmatched(pred);
        self
    }

    /// Keep only the members satisfying `pred` and return the others
    pub fn extract_unmatched<F: FnMut(usize) -> bool>(&mut self, mut pred: F) -> Coalition {
        let removed: Coalition = self.iter().filter(|&v| !pred(v)).collect();
        self.remove_all(removed.iter());
        removed
    }

    /// New coalition with the members satisfying `pred`
    pub fn filtered<F: FnMut(usize) -> bool>(&self, mut pred: F) -> Coalition {
        self.iter().filter(|&v| pred(v)).collect()
    }

    pub fn intersection(a: &Coalition, b: &Coalition) -> Coalition {
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        small.filtered(|v| large.contains(v))
    }

    pub fn union(a: &Coalition, b: &Coalition) -> Coalition {
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        let mut res = large.clone();
        res.add_all(small.iter());
        res
    }

    pub fn difference(a: &Coalition, b: &Coalition) -> Coalition {
        a.filtered(|v| !b.contains(v))
    }

    /// Retain only members also in `other`
    pub fn intersect(&mut self, other: &Coalition) -> &mut Self {
        self.filter(|v| other.contains(v))
    }

    /// Add all members of `other`
    pub fn unite(&mut self, other: &Coalition) -> &mut Self {
        self.add_all(other.iter())
    }

    /// Remove all members of `other`
    pub fn subtract(&mut self, other: &Coalition) -> &mut Self {
        if other.len() < self.len() {
            self.remove_all(other.iter())
        } else {
            self.filter(|v| !other.contains(v))
        }
    }

    /// Number of members shared with `other`
    pub fn count_common(&self, other: &Coalition) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().filter(|&v| large.contains(v)).count()
    }

    pub fn is_subset(&self, other: &Coalition) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl PartialEq for Coalition {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl Eq for Coalition {}

impl FromIterator<usize> for Coalition {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut res = Coalition::new();
        res.add_all(iter);
        res
    }
}

impl Extend<usize> for Coalition {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a> IntoIterator for &'a Coalition {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> From<[usize; N]> for Coalition {
    fn from(items: [usize; N]) -> Self {
        items.into_iter().collect()
    }
}

impl BitAnd for &Coalition {
    type Output = Coalition;

    fn bitand(self, rhs: Self) -> Coalition {
        Coalition::intersection(self, rhs)
    }
}

impl BitOr for &Coalition {
    type Output = Coalition;

    fn bitor(self, rhs: Self) -> Coalition {
        Coalition::union(self, rhs)
    }
}

impl Sub for &Coalition {
    type Output = Coalition;

    fn sub(self, rhs: Self) -> Coalition {
        Coalition::difference(self, rhs)
    }
}

impl fmt::Debug for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted()).finish()
    }
}

impl fmt::Display for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.sorted().iter().map(|v| v.to_string()).collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}
