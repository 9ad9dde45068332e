//! Total orders used to arrange the items of an [`OrderedSet`](crate::OrderedSet).

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A total order over `T`.
///
/// Implementations must be consistent and transitive; every guarantee of the
/// set relies on it. Two items comparing `Equal` are the same key.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders items by their own [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn closures_and_natural_order_agree_on_integers() {
        let reversed = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(reversed.compare(&1, &2), Ordering::Greater);
        assert_eq!(NaturalOrder.compare("b", "b"), Ordering::Equal);
    }
}
