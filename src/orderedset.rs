use std::cmp::Ordering;

use tracing::trace;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, InvariantViolation};
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::iter::{Iter, Range};
use crate::node::{Color, Node};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered set of unique items, which supports rank queries in `O(logN)` time.
///
/// Every node records the size of its subtree, so the item at a given rank and
/// the rank of a given item are both found by a single root-to-leaf walk.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderedSet<T, C = NaturalOrder, Ix = DefaultIx> {
    /// Node slots, `None` marks a vacant slot
    pub(crate) nodes: Vec<Option<Node<T, Ix>>>,
    /// Vacant slots waiting to be reused
    pub(crate) free: Vec<NodeIndex<Ix>>,
    /// Root of the tree
    pub(crate) root: Option<NodeIndex<Ix>>,
    /// Number of items in the set
    pub(crate) len: usize,
    /// Order of the items
    cmp: C,
}

/// Tree rotations used for rebalancing.
///
/// Each one is applied at a node `x` and lifts either a child of `x`
/// (`Left`, `Right`) or that child's inner grandchild (`LeftRight`,
/// `RightLeft`) into the place of `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    /// The right child of `x` takes its place.
    Left,
    /// The left child of `x` takes its place.
    Right,
    /// The right child of the left child of `x` takes its place.
    LeftRight,
    /// The left child of the right child of `x` takes its place.
    RightLeft,
}

impl<T> OrderedSet<T>
where
    T: Ord,
{
    /// Create an empty `OrderedSet` ordered by `T: Ord`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T> Default for OrderedSet<T>
where
    T: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Ix> OrderedSet<T, NaturalOrder, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Creates a new naturally ordered `OrderedSet` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<T, C, Ix> OrderedSet<T, C, Ix>
where
    Ix: IndexType,
{
    /// Create an empty `OrderedSet` ordered by `cmp`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::OrderedSet;
    ///
    /// let mut set = OrderedSet::<i32, _>::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// set.insert(1).unwrap();
    /// set.insert(3).unwrap();
    /// set.insert(2).unwrap();
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    /// Creates a new `OrderedSet` ordered by `cmp` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        OrderedSet {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Return the number of items in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the set contains no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The comparator ordering this set.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Remove all items from the set
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Return the item held by `node`, or `None` if the node has been removed.
    #[inline]
    pub fn item(&self, node: NodeIndex<Ix>) -> Option<&T> {
        self.nodes
            .get(node.index())
            .and_then(Option::as_ref)
            .map(Node::item)
    }

    /// The node holding the smallest item.
    #[inline]
    pub fn first(&self) -> Option<NodeIndex<Ix>> {
        self.root.map(|root| self.tree_minimum(root))
    }

    /// The node holding the largest item.
    #[inline]
    pub fn last(&self) -> Option<NodeIndex<Ix>> {
        self.root.map(|root| self.tree_maximum(root))
    }

    /// The in-order successor of `node`.
    ///
    /// # Panics
    ///
    /// This method panics when `node` has been removed from the set
    pub fn next(&self, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>> {
        if let Some(right) = self.node_ref(node, Node::right) {
            return Some(self.tree_minimum(right));
        }
        let mut x = node;
        while let Some(p) = self.node_ref(x, Node::parent) {
            if self.node_ref(p, Node::left) == Some(x) {
                return Some(p);
            }
            x = p;
        }
        None
    }

    /// The in-order predecessor of `node`.
    ///
    /// # Panics
    ///
    /// This method panics when `node` has been removed from the set
    pub fn prev(&self, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>> {
        if let Some(left) = self.node_ref(node, Node::left) {
            return Some(self.tree_maximum(left));
        }
        let mut x = node;
        while let Some(p) = self.node_ref(x, Node::parent) {
            if self.node_ref(p, Node::right) == Some(x) {
                return Some(p);
            }
            x = p;
        }
        None
    }

    /// The node holding the item of rank `index`, i.e. the `index`-th smallest item.
    pub fn node_at(&self, index: usize) -> Option<NodeIndex<Ix>> {
        if index >= self.len {
            return None;
        }
        let mut index = index;
        let mut x = self.root;
        while let Some(n) = x {
            let left = self.node_ref(n, Node::left);
            let left_count = self.count(left);
            match index.cmp(&left_count) {
                Ordering::Less => x = left,
                Ordering::Equal => return Some(n),
                Ordering::Greater => {
                    index -= left_count + 1;
                    x = self.node_ref(n, Node::right);
                }
            }
        }
        None
    }

    /// Return the item of rank `index`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::OrderedSet;
    ///
    /// let set: OrderedSet<_> = [40, 10, 30, 20].into_iter().collect();
    /// assert_eq!(set.get(0), Some(&10));
    /// assert_eq!(set.get(3), Some(&40));
    /// assert_eq!(set.get(4), None);
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.node_at(index).map(|x| self.node_ref(x, Node::item))
    }

    /// The rank of the item held by `node`.
    ///
    /// # Panics
    ///
    /// This method panics when `node` has been removed from the set
    pub fn rank(&self, node: NodeIndex<Ix>) -> usize {
        let mut rank = self.count(self.node_ref(node, Node::left));
        let mut x = node;
        while let Some(p) = self.node_ref(x, Node::parent) {
            if self.node_ref(p, Node::right) == Some(x) {
                rank += self.count(self.node_ref(p, Node::left)) + 1;
            }
            x = p;
        }
        rank
    }

    /// Get an iterator over the items of the set, in ascending order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, C, Ix> {
        Iter::new(self)
    }
}

impl<T, C, Ix> OrderedSet<T, C, Ix>
where
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Insert an item into the set, returning the node now holding it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] when an equal item is already present.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::{Error, OrderedSet};
    ///
    /// let mut set = OrderedSet::new();
    /// assert!(set.insert(5).is_ok());
    /// assert_eq!(set.insert(5), Err(Error::DuplicateKey));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, item: T) -> Result<NodeIndex<Ix>, Error> {
        let Some(root) = self.root else {
            let z = self.alloc(Node::new(item, None, Color::Black));
            self.root = Some(z);
            self.len = 1;
            return Ok(z);
        };

        let mut parent = root;
        let mut current = Some(root);
        let mut order = Ordering::Equal;
        while let Some(x) = current {
            order = self.cmp.compare(&item, self.node_ref(x, Node::item));
            if order == Ordering::Equal {
                self.blacken_root();
                trace!("rejected duplicate item");
                return Err(Error::DuplicateKey);
            }
            // Split 4-nodes on the way down so the leaf's parent always has room.
            if self.is_four_node(x) {
                self.split_four_node(x);
                if self.is_red(self.node_ref(x, Node::parent)) {
                    self.insertion_balance(x);
                }
            }
            parent = x;
            current = if order == Ordering::Less {
                self.node_ref(x, Node::left)
            } else {
                self.node_ref(x, Node::right)
            };
        }

        let z = self.alloc(Node::new(item, Some(parent), Color::Red));
        if order == Ordering::Less {
            self.node_mut(parent, Node::set_left(Some(z)));
        } else {
            self.node_mut(parent, Node::set_right(Some(z)));
        }
        self.update_count_bottom_up(Some(parent));
        if self.node_ref(parent, Node::is_red) {
            self.insertion_balance(z);
        }
        self.blacken_root();
        self.len += 1;
        Ok(z)
    }

    /// Remove an item from the set, returning `true` if it was present.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::OrderedSet;
    ///
    /// let mut set: OrderedSet<_> = [1, 2, 3].into_iter().collect();
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// assert_eq!(set.len(), 2);
    /// ```
    #[inline]
    pub fn remove(&mut self, item: &T) -> bool {
        self.take(item).is_some()
    }

    /// Remove an item from the set, returning the stored item if it was present.
    pub fn take(&mut self, item: &T) -> Option<T> {
        let z = self.remove_inner(item)?;
        self.len -= 1;
        self.free.push(z);
        self.nodes[z.index()].take().map(|node| node.item)
    }

    /// Return `true` if the set contains an item equal to `item`.
    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.find_node(item).is_some()
    }

    /// The node holding an item equal to `item`.
    pub fn find_node(&self, item: &T) -> Option<NodeIndex<Ix>> {
        let mut x = self.root;
        while let Some(n) = x {
            match self.cmp.compare(item, self.node_ref(n, Node::item)) {
                Ordering::Less => x = self.node_ref(n, Node::left),
                Ordering::Greater => x = self.node_ref(n, Node::right),
                Ordering::Equal => return Some(n),
            }
        }
        None
    }

    /// Return the rank of `item`, or `None` if it is not in the set.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::OrderedSet;
    ///
    /// let set: OrderedSet<_> = ["pear", "apple", "fig"].into_iter().collect();
    /// assert_eq!(set.index_of(&"fig"), Some(1));
    /// assert_eq!(set.index_of(&"kiwi"), None);
    /// ```
    #[inline]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.find_node(item).map(|x| self.rank(x))
    }

    /// The node holding the smallest item that is `>= item`.
    pub fn lower_bound(&self, item: &T) -> Option<NodeIndex<Ix>> {
        let mut bound = None;
        let mut x = self.root;
        while let Some(n) = x {
            if self.cmp.compare(item, self.node_ref(n, Node::item)) == Ordering::Greater {
                x = self.node_ref(n, Node::right);
            } else {
                bound = Some(n);
                x = self.node_ref(n, Node::left);
            }
        }
        bound
    }

    /// The node holding the largest item that is `<= item`.
    pub fn upper_bound(&self, item: &T) -> Option<NodeIndex<Ix>> {
        let mut bound = None;
        let mut x = self.root;
        while let Some(n) = x {
            if self.cmp.compare(item, self.node_ref(n, Node::item)) == Ordering::Less {
                x = self.node_ref(n, Node::left);
            } else {
                bound = Some(n);
                x = self.node_ref(n, Node::right);
            }
        }
        bound
    }

    /// Get an iterator over the items `x` with `start <= x <= end`, in ascending order.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_set::OrderedSet;
    ///
    /// let set: OrderedSet<_> = (0..10).map(|x| x * 10).collect();
    /// let window: Vec<_> = set.range(&15, &50).copied().collect();
    /// assert_eq!(window, vec![20, 30, 40, 50]);
    /// assert_eq!(set.range(&51, &59).count(), 0);
    /// ```
    pub fn range(&self, start: &T, end: &T) -> Range<'_, T, C, Ix> {
        let front = self.lower_bound(start);
        let back = self.upper_bound(end);
        match (front, back) {
            (Some(f), Some(b))
                if self.cmp.compare(self.node_ref(f, Node::item), self.node_ref(b, Node::item))
                    != Ordering::Greater =>
            {
                Range::new(self, front, back)
            }
            _ => Range::new(self, None, None),
        }
    }

    /// Check every structural invariant of the tree.
    ///
    /// This walks the whole tree and is meant for diagnostics and tests.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(InvariantViolation::Length {
                    len: self.len,
                    count: 0,
                });
            }
            return Ok(());
        };
        if self.node_ref(root, Node::is_red) {
            return Err(InvariantViolation::RedRoot(root.index()));
        }
        if self.node_ref(root, Node::parent).is_some() {
            return Err(InvariantViolation::RootHasParent(root.index()));
        }
        let _black_height = self.validate_subtree(root)?;
        let count = self.node_ref(root, Node::count);
        if count != self.len {
            return Err(InvariantViolation::Length {
                len: self.len,
                count,
            });
        }

        let mut prev: Option<NodeIndex<Ix>> = None;
        let mut x = self.first();
        while let Some(n) = x {
            if let Some(p) = prev {
                let order = self
                    .cmp
                    .compare(self.node_ref(p, Node::item), self.node_ref(n, Node::item));
                if order != Ordering::Less {
                    return Err(InvariantViolation::Order(n.index()));
                }
            }
            prev = Some(n);
            x = self.next(n);
        }
        Ok(())
    }
}

impl<T, C, Ix> OrderedSet<T, C, Ix>
where
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Top-down removal.
    ///
    /// Every node on the search path is turned into a 3- or 4-node before the
    /// search continues below it, so the node finally unlinked is never a
    /// lone black node. Returns the detached slot of the matched node.
    fn remove_inner(&mut self, item: &T) -> Option<NodeIndex<Ix>> {
        let mut current = self.root;
        let mut last = None;
        let mut matched = None;
        while let Some(x) = current {
            if self.is_two_node(x) {
                match self.node_ref(x, Node::parent) {
                    None => self.node_mut(x, Node::set_color(Color::Red)),
                    Some(parent) => self.fix_two_node(x, parent),
                }
            }
            // Once matched, keep descending to the in-order successor.
            let order = if matched.is_some() {
                Ordering::Less
            } else {
                self.cmp.compare(item, self.node_ref(x, Node::item))
            };
            if order == Ordering::Equal {
                matched = Some(x);
            }
            last = Some(x);
            current = if order == Ordering::Less {
                self.node_ref(x, Node::left)
            } else {
                self.node_ref(x, Node::right)
            };
        }
        if let (Some(z), Some(successor)) = (matched, last) {
            self.replace_node(z, successor);
        }
        self.blacken_root();
        matched
    }
}

impl<T, C, Ix> OrderedSet<T, C, Ix>
where
    Ix: IndexType,
{
    /// Place a node in a vacant slot, or at the end of the arena.
    fn alloc(&mut self, node: Node<T, Ix>) -> NodeIndex<Ix> {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx.index()] = Some(node);
            return idx;
        }
        let idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != idx,
            "reached maximum number of nodes"
        );
        self.nodes.push(Some(node));
        idx
    }

    /// Mutable access to the item of `node`.
    ///
    /// The caller must not change the item's position in the order.
    pub(crate) fn item_mut(&mut self, node: NodeIndex<Ix>) -> Option<&mut T> {
        self.nodes
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .map(Node::item_mut)
    }

    /// Restore a red root after splits and merges near the top.
    fn blacken_root(&mut self) {
        if let Some(root) = self.root {
            self.node_mut(root, Node::set_color(Color::Black));
        }
    }

    /// Fix consecutive red nodes at `current` and its parent with one rotation at the grandparent.
    fn insertion_balance(&mut self, current: NodeIndex<Ix>) {
        let Some(parent) = self.node_ref(current, Node::parent) else {
            return;
        };
        let Some(grand_parent) = self.node_ref(parent, Node::parent) else {
            return;
        };
        let parent_on_right = self.node_ref(grand_parent, Node::right) == Some(parent);
        let current_on_right = self.node_ref(parent, Node::right) == Some(current);
        let rotation = match (parent_on_right, current_on_right) {
            (true, true) => Rotation::Left,
            (false, false) => Rotation::Right,
            (false, true) => Rotation::LeftRight,
            (true, false) => Rotation::RightLeft,
        };
        let top = self.rotate(grand_parent, rotation);
        self.node_mut(grand_parent, Node::set_color(Color::Red));
        self.node_mut(top, Node::set_color(Color::Black));
    }

    /// Turn the 2-node `x` into a 3- or 4-node, borrowing from or merging with its sibling.
    fn fix_two_node(&mut self, x: NodeIndex<Ix>, parent: NodeIndex<Ix>) {
        let Some(mut sibling) = self.sibling(x, parent) else {
            return;
        };
        if self.node_ref(sibling, Node::is_red) {
            // Move the red link to our side so that the sibling becomes black.
            let rotation = if self.node_ref(parent, Node::right) == Some(sibling) {
                Rotation::Left
            } else {
                Rotation::Right
            };
            let _ignore = self.rotate(parent, rotation);
            self.node_mut(parent, Node::set_color(Color::Red));
            self.node_mut(sibling, Node::set_color(Color::Black));
            sibling = match self.sibling(x, parent) {
                Some(s) => s,
                None => return,
            };
        }

        if self.is_two_node(sibling) {
            self.node_mut(parent, Node::set_color(Color::Black));
            self.node_mut(x, Node::set_color(Color::Red));
            self.node_mut(sibling, Node::set_color(Color::Red));
            return;
        }

        let rotation = self.rotation_needed(parent, x, sibling);
        let outer = match rotation {
            Rotation::Left => self.node_ref(sibling, Node::right),
            Rotation::Right => self.node_ref(sibling, Node::left),
            Rotation::LeftRight | Rotation::RightLeft => None,
        };
        if let Some(outer) = outer {
            self.node_mut(outer, Node::set_color(Color::Black));
        }
        let parent_color = self.node_ref(parent, Node::color);
        let top = self.rotate(parent, rotation);
        self.node_mut(top, Node::set_color(parent_color));
        self.node_mut(parent, Node::set_color(Color::Black));
        self.node_mut(x, Node::set_color(Color::Red));
    }

    /// Pick the rotation that borrows a red node from `sibling` into `current`'s side.
    fn rotation_needed(
        &self,
        parent: NodeIndex<Ix>,
        current: NodeIndex<Ix>,
        sibling: NodeIndex<Ix>,
    ) -> Rotation {
        let current_on_left = self.node_ref(parent, Node::left) == Some(current);
        if self.is_red(self.node_ref(sibling, Node::left)) {
            if current_on_left {
                Rotation::RightLeft
            } else {
                Rotation::Right
            }
        } else if current_on_left {
            Rotation::Left
        } else {
            Rotation::LeftRight
        }
    }

    /// Unlink `z` and put `successor` (its in-order successor, or `z` itself
    /// when it has no right subtree) in its place.
    fn replace_node(&mut self, z: NodeIndex<Ix>, successor: NodeIndex<Ix>) {
        let parent_of_match = self.node_ref(z, Node::parent);
        let (replacement, recount_from) = if successor == z {
            (self.node_ref(z, Node::left), parent_of_match)
        } else {
            if let Some(r) = self.node_ref(successor, Node::right) {
                self.node_mut(r, Node::set_color(Color::Black));
            }
            let recount_from = match self.node_ref(successor, Node::parent) {
                Some(p) if p != z => {
                    self.set_left_child(p, self.node_ref(successor, Node::right));
                    self.set_right_child(successor, self.node_ref(z, Node::right));
                    p
                }
                _ => successor,
            };
            self.set_left_child(successor, self.node_ref(z, Node::left));
            (Some(successor), Some(recount_from))
        };
        if let Some(r) = replacement {
            self.node_mut(r, Node::set_color(self.node_ref(z, Node::color)));
        }
        self.replace_child_or_root(parent_of_match, z, replacement);
        self.update_count_bottom_up(recount_from);
    }

    /// Apply `rotation` at `x`, re-attach the new subtree root to the old
    /// parent of `x` and return it.
    ///
    /// The subtree keeps its item count, so only the moved nodes are recounted.
    fn rotate(&mut self, x: NodeIndex<Ix>, rotation: Rotation) -> NodeIndex<Ix> {
        let parent = self.node_ref(x, Node::parent);
        let top = match rotation {
            Rotation::Left => {
                let r = self.right_of(x);
                self.set_right_child(x, self.node_ref(r, Node::left));
                self.set_left_child(r, Some(x));
                self.recount(x);
                r
            }
            Rotation::Right => {
                let l = self.left_of(x);
                self.set_left_child(x, self.node_ref(l, Node::right));
                self.set_right_child(l, Some(x));
                self.recount(x);
                l
            }
            Rotation::LeftRight => {
                let l = self.left_of(x);
                let lr = self.right_of(l);
                self.set_left_child(x, self.node_ref(lr, Node::right));
                self.set_right_child(lr, Some(x));
                self.set_right_child(l, self.node_ref(lr, Node::left));
                self.set_left_child(lr, Some(l));
                self.recount(x);
                self.recount(l);
                lr
            }
            Rotation::RightLeft => {
                let r = self.right_of(x);
                let rl = self.left_of(r);
                self.set_right_child(x, self.node_ref(rl, Node::left));
                self.set_left_child(rl, Some(x));
                self.set_left_child(r, self.node_ref(rl, Node::right));
                self.set_right_child(rl, Some(r));
                self.recount(x);
                self.recount(r);
                rl
            }
        };
        self.recount(top);
        self.replace_child_or_root(parent, x, Some(top));
        top
    }

    /// Replace `child` of `parent` (or the root when `parent` is `None`) with `new_child`.
    fn replace_child_or_root(
        &mut self,
        parent: Option<NodeIndex<Ix>>,
        child: NodeIndex<Ix>,
        new_child: Option<NodeIndex<Ix>>,
    ) {
        match parent {
            Some(p) if self.node_ref(p, Node::left) == Some(child) => {
                self.set_left_child(p, new_child);
            }
            Some(p) => self.set_right_child(p, new_child),
            None => {
                self.root = new_child;
                if let Some(n) = new_child {
                    self.node_mut(n, Node::set_parent(None));
                }
            }
        }
    }

    fn set_left_child(&mut self, node: NodeIndex<Ix>, child: Option<NodeIndex<Ix>>) {
        self.node_mut(node, Node::set_left(child));
        if let Some(c) = child {
            self.node_mut(c, Node::set_parent(Some(node)));
        }
    }

    fn set_right_child(&mut self, node: NodeIndex<Ix>, child: Option<NodeIndex<Ix>>) {
        self.node_mut(node, Node::set_right(child));
        if let Some(c) = child {
            self.node_mut(c, Node::set_parent(Some(node)));
        }
    }

    /// Recalculate the count of `node` from its children
    fn recount(&mut self, node: NodeIndex<Ix>) {
        let left = self.count(self.node_ref(node, Node::left));
        let right = self.count(self.node_ref(node, Node::right));
        self.node_mut(node, Node::set_count(1 + left + right));
    }

    /// Update the counts towards the root
    fn update_count_bottom_up(&mut self, node: Option<NodeIndex<Ix>>) {
        let mut p = node;
        while let Some(x) = p {
            self.recount(x);
            p = self.node_ref(x, Node::parent);
        }
    }

    fn split_four_node(&mut self, node: NodeIndex<Ix>) {
        self.node_mut(node, Node::set_color(Color::Red));
        if let Some(l) = self.node_ref(node, Node::left) {
            self.node_mut(l, Node::set_color(Color::Black));
        }
        if let Some(r) = self.node_ref(node, Node::right) {
            self.node_mut(r, Node::set_color(Color::Black));
        }
    }

    /// A black node without red children.
    fn is_two_node(&self, node: NodeIndex<Ix>) -> bool {
        self.node_ref(node, Node::is_black)
            && !self.is_red(self.node_ref(node, Node::left))
            && !self.is_red(self.node_ref(node, Node::right))
    }

    /// A node with two red children.
    fn is_four_node(&self, node: NodeIndex<Ix>) -> bool {
        self.is_red(self.node_ref(node, Node::left)) && self.is_red(self.node_ref(node, Node::right))
    }

    fn is_red(&self, node: Option<NodeIndex<Ix>>) -> bool {
        node.is_some_and(|x| self.node_ref(x, Node::is_red))
    }

    fn count(&self, node: Option<NodeIndex<Ix>>) -> usize {
        node.map_or(0, |x| self.node_ref(x, Node::count))
    }

    fn sibling(&self, node: NodeIndex<Ix>, parent: NodeIndex<Ix>) -> Option<NodeIndex<Ix>> {
        if self.node_ref(parent, Node::left) == Some(node) {
            self.node_ref(parent, Node::right)
        } else {
            self.node_ref(parent, Node::left)
        }
    }

    fn left_of(&self, node: NodeIndex<Ix>) -> NodeIndex<Ix> {
        self.node_ref(node, Node::left)
            .expect("rotation requires a left child")
    }

    fn right_of(&self, node: NodeIndex<Ix>) -> NodeIndex<Ix> {
        self.node_ref(node, Node::right)
            .expect("rotation requires a right child")
    }

    /// Find the node with the minimum item.
    fn tree_minimum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while let Some(l) = self.node_ref(x, Node::left) {
            x = l;
        }
        x
    }

    /// Find the node with the maximum item.
    fn tree_maximum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while let Some(r) = self.node_ref(x, Node::right) {
            x = r;
        }
        x
    }

    /// Check the subtree below `x`, returning its black height.
    fn validate_subtree(&self, x: NodeIndex<Ix>) -> Result<usize, InvariantViolation> {
        let mut actual = 1;
        let mut heights = [0_usize; 2];
        let children = [self.node_ref(x, Node::left), self.node_ref(x, Node::right)];
        for (height, child) in heights.iter_mut().zip(children) {
            let Some(c) = child else {
                continue;
            };
            if self.node_ref(c, Node::parent) != Some(x) {
                return Err(InvariantViolation::ParentLink(c.index()));
            }
            if self.node_ref(x, Node::is_red) && self.node_ref(c, Node::is_red) {
                return Err(InvariantViolation::RedChildOfRed(x.index()));
            }
            *height = self.validate_subtree(c)?;
            actual += self.node_ref(c, Node::count);
        }
        if heights[0] != heights[1] {
            return Err(InvariantViolation::BlackHeight(x.index()));
        }
        let stored = self.node_ref(x, Node::count);
        if stored != actual {
            return Err(InvariantViolation::Count {
                node: x.index(),
                stored,
                actual,
            });
        }
        Ok(heights[0] + usize::from(self.node_ref(x, Node::is_black)))
    }
}

// Convenient methods for reference or mutate a node
impl<'a, T, C, Ix> OrderedSet<T, C, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, Ix>) -> R,
    {
        op(self.nodes[node.index()]
            .as_ref()
            .expect("node index refers to a removed node"))
    }

    fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, Ix>) -> R,
    {
        op(self.nodes[node.index()]
            .as_mut()
            .expect("node index refers to a removed node"))
    }
}

impl<'a, T, C, Ix> IntoIterator for &'a OrderedSet<T, C, Ix>
where
    Ix: IndexType,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C, Ix>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, Ix> Extend<T> for OrderedSet<T, C, Ix>
where
    C: Comparator<T>,
    Ix: IndexType,
{
    /// Insert every item, skipping the ones already present.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            let _ignore = self.insert(item);
        }
    }
}

impl<T> FromIterator<T> for OrderedSet<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        set.extend(iter);
        set
    }
}
