//! The half-open interval `[start, end)` stored in an [`IntervalSet`](crate::IntervalSet).
//!
//! Inside a set, intervals are ordered by their start point only (see
//! [`ByStart`]). Because the intervals of a set never overlap, this is also
//! the order of their end points. For instance:
//! - [1,4) < [6,9), because 1 < 6
//! - [1,4) and [1,7) compare equal, and can never be stored side by side
//!
//! The helpers distinguish *touching* from *overlapping*: [1,4) and [4,6)
//! are [`mergeable`](Interval::mergeable) but do not
//! [`overlap`](Interval::overlaps).

use std::cmp::Ordering;
use std::fmt;

use crate::compare::Comparator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The interval `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    /// Start value, inclusive
    pub start: T,
    /// End value, exclusive
    pub end: T,
}

impl<T> Interval<T> {
    /// Create a new `Interval`
    ///
    /// No ordering is required between `start` and `end`: a circular set reads
    /// `start >= end` as an interval wrapping around its domain.
    #[inline]
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

impl<T: Clone> Interval<T> {
    /// The zero-length interval `[x, x)`
    #[inline]
    pub fn point(x: T) -> Self {
        Self {
            start: x.clone(),
            end: x,
        }
    }
}

impl<T: Ord> Interval<T> {
    /// Checks if the interval covers nothing, i.e. `start >= end`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Checks if self overlaps or shares an endpoint with other interval
    #[inline]
    pub fn mergeable(&self, other: &Self) -> bool {
        other.end >= self.start && self.end >= other.start
    }

    /// Checks if self overlaps with other interval by a strictly positive amount
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        other.end > self.start && self.end > other.start
    }

    /// Checks if self lies entirely after other interval, without touching it
    #[inline]
    pub fn after(&self, other: &Self) -> bool {
        self.start > other.end
    }

    /// Checks if self lies entirely before other interval, without touching it
    #[inline]
    pub fn before(&self, other: &Self) -> bool {
        self.end < other.start
    }
}

impl<T: Ord + Clone> Interval<T> {
    /// The smallest interval covering both self and other.
    ///
    /// The two intervals must be [`mergeable`](Self::mergeable). Otherwise the
    /// result also covers the gap between them. Debug builds assert this.
    #[inline]
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        debug_assert!(self.mergeable(other), "intervals are not mergeable");
        Self {
            start: (&self.start).min(&other.start).clone(),
            end: (&self.end).max(&other.end).clone(),
        }
    }

    /// Like [`merge`](Self::merge), but returns `None` for intervals that are not mergeable.
    #[inline]
    pub fn try_merge(&self, other: &Self) -> Option<Self> {
        self.mergeable(other).then(|| self.merge(other))
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

/// Orders intervals by their start point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ByStart;

impl<T: Ord> Comparator<Interval<T>> for ByStart {
    #[inline]
    fn compare(&self, a: &Interval<T>, b: &Interval<T>) -> Ordering {
        a.start.cmp(&b.start)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn touching_intervals_are_mergeable_but_do_not_overlap() {
        let a = Interval::new(1, 4);
        let b = Interval::new(4, 6);
        assert!(a.mergeable(&b));
        assert!(b.mergeable(&a));
        assert!(!a.overlaps(&b));
        assert!(!a.before(&b));
        assert!(!b.after(&a));
        assert_eq!(a.merge(&b), Interval::new(1, 6));
    }

    #[test]
    fn separated_intervals_are_ordered_strictly() {
        let a = Interval::new(1, 3);
        let b = Interval::new(5, 8);
        assert!(a.before(&b));
        assert!(b.after(&a));
        assert!(!a.mergeable(&b));
        assert_eq!(a.try_merge(&b), None);
        assert_eq!(b.try_merge(&Interval::new(2, 5)), Some(Interval::new(2, 8)));
    }

    #[test]
    fn nested_intervals_merge_to_the_outer_one() {
        let outer = Interval::new(0, 10);
        let inner = Interval::new(3, 4);
        assert!(outer.overlaps(&inner));
        assert_eq!(inner.merge(&outer), outer);
    }

    #[test]
    fn point_interval_is_empty() {
        assert!(Interval::point(3).is_empty());
        assert!(Interval::new(5, 2).is_empty());
        assert!(!Interval::new(2, 5).is_empty());
    }

    #[test]
    fn by_start_ignores_the_end_point() {
        assert_eq!(
            ByStart.compare(&Interval::new(1, 4), &Interval::new(1, 9)),
            Ordering::Equal
        );
        assert_eq!(
            ByStart.compare(&Interval::new(0, 40), &Interval::new(1, 2)),
            Ordering::Less
        );
    }

    #[test]
    fn display_uses_half_open_notation() {
        assert_eq!(Interval::new(5, 7).to_string(), "[5,7)");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "intervals are not mergeable")]
    fn merging_disjoint_intervals_is_checked_in_debug_builds() {
        let _merged = Interval::new(1, 2).merge(&Interval::new(5, 6));
    }
}
