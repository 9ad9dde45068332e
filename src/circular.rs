use std::fmt;

use tracing::{debug, trace};

use crate::error::Error;
use crate::index::{DefaultIx, IndexType};
use crate::interval::Interval;
use crate::intervalset::IntervalSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A set of intervals on the circle `[zero, modulo)`.
///
/// An interval with `start > end` wraps around: it covers `[start, modulo)`
/// and `[zero, end)`. An interval with `start == end` covers the whole circle.
///
/// Internally a wrapping interval is stored as its non-wrapping halves, so
/// every stored endpoint lies in `[zero, modulo]`. An interval ending at
/// `zero` has no second half.
///
/// # Example
/// ```rust
/// use rb_interval_set::{CircularIntervalSet, Interval};
///
/// let mut set = CircularIntervalSet::new(0, 100);
/// set.add(Interval::new(12, 17)).unwrap();
/// set.add(Interval::new(77, 95)).unwrap();
/// set.add(Interval::new(92, 7)).unwrap();
/// assert_eq!(set.to_string(), "[77,7) [12,17)");
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircularIntervalSet<T, Ix = DefaultIx> {
    /// Non-wrapping pieces of the added intervals
    inner: IntervalSet<T, Ix>,
    /// Smallest point of the circle
    zero: T,
    /// Exclusive upper end of the circle, identified with `zero`
    modulo: T,
}

impl<T> CircularIntervalSet<T>
where
    T: Ord + Clone,
{
    /// Create an empty set on the circle `[zero, modulo)`.
    ///
    /// # Panics
    ///
    /// This method panics when `zero >= modulo`
    #[inline]
    #[must_use]
    pub fn new(zero: T, modulo: T) -> Self {
        Self::with_capacity(zero, modulo, 0)
    }
}

impl<T, Ix> CircularIntervalSet<T, Ix>
where
    T: Ord + Clone,
    Ix: IndexType,
{
    /// Creates a new empty set on the circle `[zero, modulo)` with estimated capacity.
    ///
    /// # Panics
    ///
    /// This method panics when `zero >= modulo`
    #[inline]
    #[must_use]
    pub fn with_capacity(zero: T, modulo: T, capacity: usize) -> Self {
        assert!(zero < modulo, "the circle must not be empty");
        CircularIntervalSet {
            inner: IntervalSet::with_capacity(capacity),
            zero,
            modulo,
        }
    }

    /// Add an interval, merging it with every stored interval it overlaps or touches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] when an endpoint lies outside `[zero, modulo)`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{CircularIntervalSet, Error, Interval};
    ///
    /// let mut set = CircularIntervalSet::new(0, 100);
    /// assert_eq!(set.add(Interval::new(90, 100)), Err(Error::InvalidRange));
    /// set.add(Interval::new(50, 50)).unwrap();
    /// assert_eq!(set.to_string(), "[0,100)");
    /// ```
    pub fn add(&mut self, interval: Interval<T>) -> Result<(), Error> {
        self.check_range(&interval)?;
        if interval.start < interval.end {
            self.inner.add(interval);
            return Ok(());
        }
        trace!("split wrapping interval");
        self.inner
            .add(Interval::new(interval.start, self.modulo.clone()));
        if interval.end != self.zero {
            self.inner.add(Interval::new(self.zero.clone(), interval.end));
        }
        Ok(())
    }

    /// Find a stored interval that overlaps `query` by a strictly positive amount.
    ///
    /// The returned interval is one of the non-wrapping pieces kept
    /// internally, so it never wraps. For a wrapping query the piece after
    /// `query.start` is preferred.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] when an endpoint lies outside `[zero, modulo)`.
    pub fn find_overlapping(&self, query: &Interval<T>) -> Result<Option<&Interval<T>>, Error> {
        self.check_range(query)?;
        if query.start < query.end {
            return Ok(self.inner.find_overlapping(query));
        }
        let tail = Interval::new(query.start.clone(), self.modulo.clone());
        let head = Interval::new(self.zero.clone(), query.end.clone());
        Ok(self
            .inner
            .find_overlapping(&tail)
            .or_else(|| self.inner.find_overlapping(&head)))
    }

    /// Get an iterator over the covered intervals.
    ///
    /// When coverage runs up to `modulo`, the wrapping interval is yielded
    /// first, followed by the others in ascending order. It ends at `zero`
    /// when nothing is covered right after `zero`. A fully covered circle
    /// yields the single interval `[zero, modulo)`.
    pub fn intervals(&self) -> impl Iterator<Item = Interval<T>> + '_ {
        let (wrapped, head) = self.wrapped();
        let tail = usize::from(wrapped.is_some());
        let middle = self.inner.len() - head - tail;
        wrapped
            .into_iter()
            .chain(self.inner.iter().skip(head).take(middle).cloned())
    }

    /// Return the number of intervals yielded by [`intervals`](Self::intervals).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        let (_, head) = self.wrapped();
        self.inner.len() - head
    }

    /// Smallest point of the circle
    #[inline]
    pub fn zero(&self) -> &T {
        &self.zero
    }

    /// Exclusive upper end of the circle
    #[inline]
    pub fn modulo(&self) -> &T {
        &self.modulo
    }

    /// Return `true` if nothing has been added since creation or the last `clear`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove all intervals from the set
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// The wrapping interval made of the stored piece ending at `modulo` and
    /// the one starting at `zero`, along with the number of stored pieces it
    /// absorbs at the front.
    fn wrapped(&self) -> (Option<Interval<T>>, usize) {
        let Some(tail) = self.inner.last() else {
            return (None, 0);
        };
        if tail.end != self.modulo || tail.start == self.zero {
            return (None, 0);
        }
        match self.inner.first() {
            Some(head) if head.start == self.zero => (
                Some(Interval::new(tail.start.clone(), head.end.clone())),
                1,
            ),
            _ => (
                Some(Interval::new(tail.start.clone(), self.zero.clone())),
                0,
            ),
        }
    }

    fn check_range(&self, interval: &Interval<T>) -> Result<(), Error> {
        let on_circle = |x: &T| self.zero <= *x && *x < self.modulo;
        if on_circle(&interval.start) && on_circle(&interval.end) {
            Ok(())
        } else {
            debug!("rejected interval outside the circle");
            Err(Error::InvalidRange)
        }
    }
}

impl<T, Ix> fmt::Display for CircularIntervalSet<T, Ix>
where
    T: Ord + Clone + fmt::Display,
    Ix: IndexType,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, interval) in self.intervals().enumerate() {
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

    const MODULO: usize = 1000;

    /// Points of `[start, end)` on the circle `[0, modulo)`, all of them when `start == end`.
    fn circle_points(start: usize, end: usize, modulo: usize) -> Vec<usize> {
        let end = end % modulo;
        let mut points = vec![start];
        let mut x = (start + 1) % modulo;
        while x != end {
            points.push(x);
            x = (x + 1) % modulo;
        }
        points
    }

    fn coverage(set: &CircularIntervalSet<usize>, modulo: usize) -> Vec<bool> {
        let mut covered = vec![false; modulo];
        for interval in set.intervals() {
            for x in circle_points(interval.start, interval.end, modulo) {
                covered[x] = true;
            }
        }
        covered
    }

    #[test]
    fn wrapping_intervals_merge_across_zero() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(12, 17)).unwrap();
        assert_eq!(set.to_string(), "[12,17)");
        set.add(Interval::new(77, 95)).unwrap();
        assert_eq!(set.to_string(), "[12,17) [77,95)");
        set.add(Interval::new(92, 7)).unwrap();
        assert_eq!(set.to_string(), "[77,7) [12,17)");
        assert_eq!(set.len(), 2);
        set.add(Interval::new(8, 15)).unwrap();
        assert_eq!(set.to_string(), "[77,7) [8,17)");
        set.add(Interval::new(17, 77)).unwrap();
        assert_eq!(set.to_string(), "[8,7)");
        set.add(Interval::new(7, 8)).unwrap();
        assert_eq!(set.to_string(), "[0,100)");
        assert_eq!(set.len(), 1);
        set.add(Interval::new(70, 30)).unwrap();
        assert_eq!(set.to_string(), "[0,100)");
    }

    #[test]
    fn equal_endpoints_cover_the_whole_circle() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(50, 50)).unwrap();
        assert_eq!(
            set.intervals().collect::<Vec<_>>(),
            vec![Interval::new(0, 100)]
        );
    }

    #[test]
    fn non_wrapping_intervals_merge_like_a_line() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(50, 51)).unwrap();
        set.add(Interval::new(63, 64)).unwrap();
        assert_eq!(set.to_string(), "[50,51) [63,64)");
        set.add(Interval::new(57, 95)).unwrap();
        assert_eq!(set.to_string(), "[50,51) [57,95)");
    }

    #[test]
    fn interval_ending_at_zero_wraps() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(50, 0)).unwrap();
        assert_eq!(set.to_string(), "[50,0)");
        set.add(Interval::new(0, 10)).unwrap();
        assert_eq!(set.to_string(), "[50,10)");
    }

    #[test]
    fn interval_ending_at_zero_keeps_overlaps_visible() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(20, 0)).unwrap();
        assert_eq!(set.to_string(), "[20,0)");
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.find_overlapping(&Interval::new(0, 30)),
            Ok(Some(&Interval::new(20, 100)))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(0, 0)),
            Ok(Some(&Interval::new(20, 100)))
        );
        assert_eq!(set.find_overlapping(&Interval::new(0, 20)), Ok(None));
        assert_eq!(
            set.find_overlapping(&Interval::new(99, 0)),
            Ok(Some(&Interval::new(20, 100)))
        );
    }

    #[test]
    fn endpoints_outside_the_circle_are_rejected() {
        let mut set = CircularIntervalSet::new(10, 20);
        assert_eq!(set.add(Interval::new(5, 15)), Err(Error::InvalidRange));
        assert_eq!(set.add(Interval::new(15, 20)), Err(Error::InvalidRange));
        assert_eq!(
            set.find_overlapping(&Interval::new(12, 25)),
            Err(Error::InvalidRange)
        );
        assert!(set.is_empty());
        set.add(Interval::new(19, 10)).unwrap();
        assert_eq!(set.to_string(), "[19,10)");
        assert_eq!((*set.zero(), *set.modulo()), (10, 20));
    }

    #[test]
    #[should_panic(expected = "the circle must not be empty")]
    fn empty_circle_is_refused() {
        let _set = CircularIntervalSet::new(5, 5);
    }

    #[test]
    fn find_overlapping_handles_wrapping_queries() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(90, 5)).unwrap();
        set.add(Interval::new(40, 45)).unwrap();
        assert_eq!(
            set.find_overlapping(&Interval::new(95, 2)),
            Ok(Some(&Interval::new(90, 100)))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(99, 3)),
            Ok(Some(&Interval::new(90, 100)))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(50, 1)),
            Ok(Some(&Interval::new(90, 100)))
        );
        assert_eq!(
            set.find_overlapping(&Interval::new(2, 4)),
            Ok(Some(&Interval::new(0, 5)))
        );
        assert_eq!(set.find_overlapping(&Interval::new(5, 40)), Ok(None));
        assert_eq!(set.find_overlapping(&Interval::new(45, 90)), Ok(None));
    }

    #[test]
    fn clear_empties_the_set() {
        let mut set = CircularIntervalSet::new(0, 100);
        set.add(Interval::new(80, 20)).unwrap();
        assert!(!set.is_empty());
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.intervals().count(), 0);
        assert_eq!(set.to_string(), "");
    }

    #[test]
    fn coverage_matches_brute_force_oracle() {
        for seed in [[0; 32], [1; 32], [2; 32]] {
            let mut rng = StdRng::from_seed(seed);
            for _ in 0..100 {
                let mut expected = vec![false; MODULO];
                let mut set = CircularIntervalSet::new(0, MODULO);
                for _ in 0..20 {
                    let start = rng.gen_range(0..MODULO);
                    let length = rng.gen_range(1..120);
                    let end = (start + length) % MODULO;
                    for x in start..start + length {
                        expected[x % MODULO] = true;
                    }
                    set.add(Interval::new(start, end)).unwrap();

                    let probe = rng.gen_range(0..MODULO);
                    let point = Interval::new(probe, (probe + 1) % MODULO);
                    assert_eq!(
                        set.find_overlapping(&point).unwrap().is_some(),
                        expected[probe]
                    );
                }
                assert_eq!(coverage(&set, MODULO), expected);

                let reported: Vec<_> = set.intervals().collect();
                for pair in reported.windows(2) {
                    assert!(pair[0].end != pair[1].start, "touching intervals {pair:?}");
                }
            }
        }
    }

    #[test]
    fn every_query_matches_brute_force_oracle() {
        const SMALL: usize = 40;
        for seed in [[0; 32], [1; 32], [2; 32]] {
            let mut rng = StdRng::from_seed(seed);
            for _ in 0..30 {
                let mut expected = vec![false; SMALL];
                let mut set = CircularIntervalSet::new(0, SMALL);
                for _ in 0..6 {
                    let start = rng.gen_range(0..SMALL);
                    let end = if rng.gen_bool(0.2) {
                        0
                    } else {
                        (start + rng.gen_range(1..10)) % SMALL
                    };
                    for x in circle_points(start, end, SMALL) {
                        expected[x] = true;
                    }
                    set.add(Interval::new(start, end)).unwrap();

                    for query_start in 0..SMALL {
                        for query_end in 0..SMALL {
                            let query = Interval::new(query_start, query_end);
                            let points = circle_points(query_start, query_end, SMALL);
                            let found = set.find_overlapping(&query).unwrap();
                            assert_eq!(
                                found.is_some(),
                                points.iter().any(|&x| expected[x]),
                                "query {query} on {set}"
                            );
                            if let Some(piece) = found {
                                assert!(points.iter().any(|&x| piece.start <= x && x < piece.end));
                            }
                        }
                    }
                }
                assert_eq!(coverage(&set, SMALL), expected);
                assert_eq!(set.len(), set.intervals().count());
            }
        }
    }
}
