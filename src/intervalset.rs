use std::fmt;

use tracing::trace;

use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::interval::{ByStart, Interval};
use crate::iter::Iter;
use crate::node::Node;
use crate::orderedset::OrderedSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A set of disjoint half-open intervals, merged on insertion.
///
/// Adding an interval absorbs every stored interval it overlaps or touches,
/// so the set always holds the minimal cover of everything added.
///
/// # Example
/// ```rust
/// use rb_interval_set::{Interval, IntervalSet};
///
/// let mut set = IntervalSet::new();
/// set.add(Interval::new(0, 5));
/// set.add(Interval::new(8, 9));
/// set.add(Interval::new(20, 23));
/// set.add(Interval::new(25, 29));
/// set.add(Interval::new(22, 35));
/// assert_eq!(set.to_string(), "[0,5) [8,9) [20,35)");
/// set.add(Interval::new(5, 10));
/// assert_eq!(set.to_string(), "[0,10) [20,35)");
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntervalSet<T, Ix = DefaultIx> {
    /// Stored intervals, ordered by start
    intervals: OrderedSet<Interval<T>, ByStart, Ix>,
}

impl<T> IntervalSet<T>
where
    T: Ord + Clone,
{
    /// Create an empty `IntervalSet`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> Default for IntervalSet<T>
where
    T: Ord + Clone,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Ix> IntervalSet<T, Ix>
where
    T: Ord + Clone,
    Ix: IndexType,
{
    /// Creates a new `IntervalSet` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        IntervalSet {
            intervals: OrderedSet::with_capacity_and_comparator(capacity, ByStart),
        }
    }

    /// Add an interval, merging it with every stored interval it overlaps or touches.
    ///
    /// Empty intervals (`start >= end`) cover nothing and leave the set unchanged.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.add(Interval::new(10, 15));
    /// set.add(Interval::new(20, 25));
    /// set.add(Interval::new(30, 35));
    /// set.add(Interval::new(13, 32));
    /// assert_eq!(set.to_string(), "[10,35)");
    /// ```
    pub fn add(&mut self, interval: Interval<T>) {
        if interval.is_empty() {
            trace!("ignored empty interval");
            return;
        }
        if self.intervals.is_empty() {
            self.insert_disjoint(interval);
            return;
        }

        let start_point = Interval::point(interval.start.clone());
        let end_point = Interval::point(interval.end.clone());

        // The first candidate is the last interval starting at or before us,
        // the last candidate the first one starting at or after our end.
        let first = match self.intervals.upper_bound(&start_point) {
            None => self.intervals.first(),
            Some(node) if self.interval(node).before(&interval) => self.intervals.next(node),
            node => node,
        };
        let last = match self.intervals.lower_bound(&end_point) {
            None => self.intervals.last(),
            Some(node) if self.interval(node).after(&interval) => self.intervals.prev(node),
            node => node,
        };
        let (Some(first), Some(last)) = (first, last) else {
            self.insert_disjoint(interval);
            return;
        };
        // Nothing in between: the candidates crossed over.
        if self.interval(first).start > self.interval(last).start {
            self.insert_disjoint(interval);
            return;
        }

        let merged = interval
            .merge(self.interval(first))
            .merge(self.interval(last));
        let mut absorbed = Vec::new();
        let mut node = first;
        while node != last {
            absorbed.push(self.interval(node).clone());
            match self.intervals.next(node) {
                Some(next) => node = next,
                None => break,
            }
        }
        for doomed in &absorbed {
            let _ignore = self.intervals.remove(doomed);
        }
        // Widening `last` in place keeps it between the same neighbours.
        if let Some(kept) = self.intervals.item_mut(last) {
            *kept = merged;
        }
        trace!(absorbed = absorbed.len() + 1, "merged interval");
    }

    /// Find the leftmost stored interval that overlaps `query` by a strictly positive amount.
    ///
    /// An empty `query` (`start >= end`) never overlaps anything and yields `None`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Interval, IntervalSet};
    ///
    /// let mut set = IntervalSet::new();
    /// set.add(Interval::new(1, 3));
    /// set.add(Interval::new(6, 7));
    /// assert_eq!(set.find_overlapping(&Interval::new(2, 9)), Some(&Interval::new(1, 3)));
    /// assert_eq!(set.find_overlapping(&Interval::new(3, 6)), None);
    /// ```
    pub fn find_overlapping(&self, query: &Interval<T>) -> Option<&Interval<T>> {
        if query.is_empty() {
            return None;
        }
        [
            self.intervals.upper_bound(query),
            self.intervals.lower_bound(query),
        ]
        .into_iter()
        .flatten()
        .map(|node| self.interval(node))
        .find(|stored| stored.overlaps(query))
    }

    /// Get an iterator over the stored intervals, in ascending order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, Interval<T>, ByStart, Ix> {
        self.intervals.iter()
    }

    /// The stored interval with the smallest start.
    #[inline]
    pub fn first(&self) -> Option<&Interval<T>> {
        self.intervals.first().map(|node| self.interval(node))
    }

    /// The stored interval with the largest start.
    #[inline]
    pub fn last(&self) -> Option<&Interval<T>> {
        self.intervals.last().map(|node| self.interval(node))
    }

    /// Remove all intervals from the set
    #[inline]
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Return the number of stored intervals.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Return `true` if the set contains no intervals.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn interval(&self, node: NodeIndex<Ix>) -> &Interval<T> {
        self.intervals.node_ref(node, Node::item)
    }

    /// Insert an interval that touches no stored interval.
    fn insert_disjoint(&mut self, interval: Interval<T>) {
        let inserted = self.intervals.insert(interval);
        debug_assert!(inserted.is_ok(), "disjoint interval shares a start point");
    }
}

impl<'a, T, Ix> IntoIterator for &'a IntervalSet<T, Ix>
where
    T: Ord + Clone,
    Ix: IndexType,
{
    type Item = &'a Interval<T>;
    type IntoIter = Iter<'a, Interval<T>, ByStart, Ix>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, Ix> Extend<Interval<T>> for IntervalSet<T, Ix>
where
    T: Ord + Clone,
    Ix: IndexType,
{
    fn extend<I: IntoIterator<Item = Interval<T>>>(&mut self, iter: I) {
        for interval in iter {
            self.add(interval);
        }
    }
}

impl<T> FromIterator<Interval<T>> for IntervalSet<T>
where
    T: Ord + Clone,
{
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        let mut set = IntervalSet::new();
        set.extend(iter);
        set
    }
}

impl<T, Ix> fmt::Display for IntervalSet<T, Ix>
where
    T: Ord + Clone + fmt::Display,
    Ix: IndexType,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, interval) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{interval}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    /// Brute-force model of an interval set over `[0, covered.len())`.
    struct CoverageOracle {
        covered: Vec<bool>,
    }

    impl CoverageOracle {
        fn new(max: usize) -> Self {
            Self {
                covered: vec![false; max],
            }
        }

        fn add(&mut self, interval: &Interval<usize>) {
            for x in interval.start..interval.end {
                self.covered[x] = true;
            }
        }

        fn intervals(&self) -> Vec<Interval<usize>> {
            let mut intervals = Vec::new();
            let mut x = 0;
            while x < self.covered.len() {
                if !self.covered[x] {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.covered.len() && self.covered[x] {
                    x += 1;
                }
                intervals.push(Interval::new(start, x));
            }
            intervals
        }

        /// The maximal covered run containing the first covered point of `query`.
        fn find_overlapping(&self, query: &Interval<usize>) -> Option<Interval<usize>> {
            let mut x = query.start;
            while x < query.end && !self.covered[x] {
                x += 1;
            }
            if x == query.end {
                return None;
            }
            let (mut start, mut end) = (x, x);
            while start > 0 && self.covered[start - 1] {
                start -= 1;
            }
            while end < self.covered.len() && self.covered[end] {
                end += 1;
            }
            Some(Interval::new(start, end))
        }
    }

    fn set_of(intervals: &[(i32, i32)]) -> IntervalSet<i32> {
        intervals
            .iter()
            .map(|&(start, end)| Interval::new(start, end))
            .collect()
    }

    #[test]
    fn suffix_extensions_merge() {
        let mut set = IntervalSet::new();
        set.add(Interval::new(5, 7));
        assert_eq!(set.to_string(), "[5,7)");
        set.add(Interval::new(6, 12));
        assert_eq!(set.to_string(), "[5,12)");
        set.add(Interval::new(12, 14));
        assert_eq!(set.to_string(), "[5,14)");
        set.add(Interval::new(15, 20));
        assert_eq!(set.to_string(), "[5,14) [15,20)");
        set.add(Interval::new(30, 40));
        assert_eq!(set.to_string(), "[5,14) [15,20) [30,40)");
        set.add(Interval::new(6, 23));
        assert_eq!(set.to_string(), "[5,23) [30,40)");
    }

    #[test]
    fn prefix_extensions_merge() {
        let mut set = IntervalSet::new();
        set.add(Interval::new(30, 35));
        assert_eq!(set.to_string(), "[30,35)");
        set.add(Interval::new(27, 32));
        assert_eq!(set.to_string(), "[27,35)");
        set.add(Interval::new(24, 27));
        assert_eq!(set.to_string(), "[24,35)");
        set.add(Interval::new(19, 23));
        assert_eq!(set.to_string(), "[19,23) [24,35)");
        set.add(Interval::new(2, 7));
        assert_eq!(set.to_string(), "[2,7) [19,23) [24,35)");
        set.add(Interval::new(9, 25));
        assert_eq!(set.to_string(), "[2,7) [9,35)");
    }

    #[test]
    fn extension_in_both_directions() {
        let mut set = set_of(&[(30, 35)]);
        set.add(Interval::new(27, 38));
        assert_eq!(set.to_string(), "[27,38)");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn multiple_intervals_are_absorbed() {
        let mut set = set_of(&[(30, 35), (10, 15), (20, 25)]);
        assert_eq!(set.to_string(), "[10,15) [20,25) [30,35)");
        set.add(Interval::new(13, 32));
        assert_eq!(set.to_string(), "[10,35)");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn adding_contained_interval_is_idempotent() {
        let mut set = set_of(&[(0, 10), (20, 30), (40, 50)]);
        let before: Vec<_> = set.iter().cloned().collect();
        for (start, end) in [(0, 10), (2, 3), (20, 30), (45, 50), (40, 41)] {
            set.add(Interval::new(start, end));
            assert_eq!(set.iter().cloned().collect::<Vec<_>>(), before);
        }
    }

    #[test]
    fn reversed_interval_is_ignored() {
        let mut set = set_of(&[(0, 10)]);
        set.add(Interval::new(30, 20));
        assert_eq!(set.to_string(), "[0,10)");
    }

    #[test]
    fn zero_length_interval_is_ignored() {
        let mut set = IntervalSet::new();
        set.add(Interval::point(5));
        assert!(set.is_empty());
        set.add(Interval::new(5, 8));
        assert_eq!(set.to_string(), "[5,8)");
        set.add(Interval::point(8));
        set.add(Interval::point(2));
        assert_eq!(set.to_string(), "[5,8)");
    }

    #[test]
    fn zero_length_interval_does_not_hide_overlaps() {
        let mut set = IntervalSet::new();
        set.add(Interval::point(4));
        set.add(Interval::new(5, 9));
        assert_eq!(
            set.find_overlapping(&Interval::new(4, 7)),
            Some(&Interval::new(5, 9))
        );
        assert_eq!(set.find_overlapping(&Interval::new(0, 5)), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn find_overlapping_requires_positive_overlap() {
        let set = set_of(&[(1, 3), (6, 7), (9, 11)]);
        assert_eq!(
            set.find_overlapping(&Interval::new(2, 5)),
            Some(&Interval::new(1, 3))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(0, 17)),
            Some(&Interval::new(1, 3))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(7, 10)),
            Some(&Interval::new(9, 11))
        );
        assert_eq!(set.find_overlapping(&Interval::new(3, 6)), None);
        assert_eq!(set.find_overlapping(&Interval::new(11, 23)), None);
    }

    #[test]
    fn find_overlapping_with_empty_query_is_none() {
        let set = set_of(&[(0, 100)]);
        assert_eq!(set.find_overlapping(&Interval::point(50)), None);
        assert_eq!(set.find_overlapping(&Interval::new(60, 40)), None);
    }

    #[test]
    fn clear_empties_the_set() {
        let mut set = set_of(&[(1, 2), (4, 5)]);
        assert_eq!(set.len(), 2);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.first(), None);
        set.add(Interval::new(3, 4));
        assert_eq!(set.to_string(), "[3,4)");
    }

    #[test]
    fn coverage_matches_brute_force_oracle() {
        for seed in [[0; 32], [1; 32], [2; 32]] {
            let mut rng = StdRng::from_seed(seed);
            for _ in 0..200 {
                let mut oracle = CoverageOracle::new(10_000);
                let mut set = IntervalSet::new();
                for _ in 0..50 {
                    let start = rng.gen_range(0..9000);
                    let end = start + rng.gen_range(0..300);
                    let interval = Interval::new(start, end);
                    oracle.add(&interval);
                    set.add(interval);

                    let probe = rng.gen_range(0..9000);
                    let point = Interval::new(probe, probe + 1);
                    assert_eq!(
                        set.find_overlapping(&point).cloned(),
                        oracle.find_overlapping(&point)
                    );

                    let probe_end = probe + rng.gen_range(1..500);
                    let query = Interval::new(probe, probe_end);
                    assert_eq!(
                        set.find_overlapping(&query).cloned(),
                        oracle.find_overlapping(&query)
                    );
                }
                assert_eq!(set.iter().cloned().collect::<Vec<_>>(), oracle.intervals());
                set.intervals.validate().unwrap();
            }
        }
    }

    #[test]
    fn every_query_matches_brute_force_oracle() {
        const MAX: usize = 60;
        for seed in [[0; 32], [1; 32], [2; 32]] {
            let mut rng = StdRng::from_seed(seed);
            for _ in 0..20 {
                let mut oracle = CoverageOracle::new(MAX);
                let mut set = IntervalSet::new();
                for _ in 0..12 {
                    let start = rng.gen_range(0..MAX);
                    let end = (start + rng.gen_range(0..12)).min(MAX);
                    let interval = Interval::new(start, end);
                    oracle.add(&interval);
                    set.add(interval);

                    for query_start in 0..MAX {
                        for query_end in query_start + 1..=MAX {
                            let query = Interval::new(query_start, query_end);
                            assert_eq!(
                                set.find_overlapping(&query).cloned(),
                                oracle.find_overlapping(&query),
                                "query {query}"
                            );
                        }
                    }
                }
                assert_eq!(set.iter().cloned().collect::<Vec<_>>(), oracle.intervals());
            }
        }
    }
}
