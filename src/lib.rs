//! `rb_interval_set` provides an order-statistic set and interval sets built on it.
//!
//! [`OrderedSet`] is a red-black tree whose nodes record their subtree size,
//! so besides insertion, removal and search it answers rank queries ("which
//! item is the i-th smallest" and "how many items are smaller than this one")
//! in O(logN) time. Items are ordered by a [`Comparator`], which defaults to
//! the item's own `Ord`.
//!
//! Like a pointer-based tree, every node links to its children and parent,
//! but the links are indices into a single arena of nodes. Removed nodes leave
//! a vacant slot that the next insertion reuses, so a [`NodeIndex`] handle
//! stays valid for as long as its item is in the set. The set is `Send` and
//! `Sync` whenever its items and comparator are.
//!
//! [`IntervalSet`] keeps a set of disjoint half-open intervals, merging every
//! added interval with the stored ones it overlaps or touches.
//! [`CircularIntervalSet`] does the same on a cyclic domain `[zero, modulo)`,
//! where intervals may wrap around.
//!
//! # Example
//!
//! ```rust
//! use rb_interval_set::{Interval, IntervalSet, OrderedSet};
//!
//! let mut set = OrderedSet::new();
//! for x in [50, 10, 40, 20, 30] {
//!     set.insert(x).unwrap();
//! }
//! assert_eq!(set.get(2), Some(&30));
//! assert_eq!(set.index_of(&40), Some(3));
//!
//! let mut intervals = IntervalSet::new();
//! intervals.add(Interval::new(1, 3));
//! intervals.add(Interval::new(2, 6));
//! assert_eq!(intervals.to_string(), "[1,6)");
//! ```
//!

mod circular;
mod compare;
mod error;
mod index;
mod interval;
mod intervalset;
mod iter;
mod node;
mod orderedset;


pub use circular::CircularIntervalSet;
pub use compare::{Comparator, NaturalOrder};
pub use error::{Error, InvariantViolation};
pub use index::{DefaultIx, IndexType, NodeIndex};
pub use interval::{ByStart, Interval};
pub use intervalset::IntervalSet;
pub use iter::{Iter, Range};
pub use orderedset::OrderedSet;
