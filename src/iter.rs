use std::iter::FusedIterator;

use crate::index::{IndexType, NodeIndex};
use crate::node::Node;
use crate::orderedset::OrderedSet;

/// An iterator over the items of an `OrderedSet`, in ascending order.
///
/// The traversal starts on the first call to `next`, so cloning a fresh
/// iterator restarts the walk from the smallest item.
#[derive(Debug)]
pub struct Iter<'a, T, C, Ix> {
    /// Reference to the set
    set_ref: &'a OrderedSet<T, C, Ix>,
    /// Stack for iteration
    stack: Option<Vec<NodeIndex<Ix>>>,
    /// Items not yet yielded
    remaining: usize,
}

impl<'a, T, C, Ix> Iter<'a, T, C, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(set_ref: &'a OrderedSet<T, C, Ix>) -> Self {
        Iter {
            set_ref,
            stack: None,
            remaining: set_ref.len(),
        }
    }

    /// Initializes the stack
    fn init_stack(&mut self) {
        self.stack = Some(Self::left_link(self.set_ref, self.set_ref.root));
    }

    /// Pushes a link of nodes on the left to stack.
    fn left_link(
        set_ref: &OrderedSet<T, C, Ix>,
        mut x: Option<NodeIndex<Ix>>,
    ) -> Vec<NodeIndex<Ix>> {
        let mut nodes = vec![];
        while let Some(n) = x {
            nodes.push(n);
            x = set_ref.node_ref(n, Node::left);
        }
        nodes
    }
}

impl<T, C, Ix> Clone for Iter<'_, T, C, Ix>
where
    Ix: Clone,
{
    fn clone(&self) -> Self {
        Iter {
            set_ref: self.set_ref,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T, C, Ix> Iterator for Iter<'a, T, C, Ix>
where
    Ix: IndexType,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.stack.is_none() {
            self.init_stack();
        }
        let x = self.stack.as_mut()?.pop()?;
        let right = self.set_ref.node_ref(x, Node::right);
        let below = Self::left_link(self.set_ref, right);
        if let Some(stack) = self.stack.as_mut() {
            stack.extend(below);
        }
        self.remaining -= 1;
        Some(self.set_ref.node_ref(x, Node::item))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C, Ix> ExactSizeIterator for Iter<'_, T, C, Ix> where Ix: IndexType {}

impl<T, C, Ix> FusedIterator for Iter<'_, T, C, Ix> where Ix: IndexType {}

/// An iterator over a window of an `OrderedSet`, see [`OrderedSet::range`].
#[derive(Debug)]
pub struct Range<'a, T, C, Ix> {
    /// Reference to the set
    set_ref: &'a OrderedSet<T, C, Ix>,
    /// Next node to yield
    front: Option<NodeIndex<Ix>>,
    /// Last node to yield
    back: Option<NodeIndex<Ix>>,
}

impl<'a, T, C, Ix> Range<'a, T, C, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(
        set_ref: &'a OrderedSet<T, C, Ix>,
        front: Option<NodeIndex<Ix>>,
        back: Option<NodeIndex<Ix>>,
    ) -> Self {
        Range {
            set_ref,
            front,
            back,
        }
    }
}

impl<'a, T, C, Ix> Iterator for Range<'a, T, C, Ix>
where
    Ix: IndexType,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.front?;
        self.front = if Some(x) == self.back {
            None
        } else {
            self.set_ref.next(x)
        };
        Some(self.set_ref.node_ref(x, Node::item))
    }
}

impl<T, C, Ix> FusedIterator for Range<'_, T, C, Ix> where Ix: IndexType {}
