use thiserror::Error;

/// Errors returned by the set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An item comparing equal to the inserted one is already present.
    #[error("an equal item is already present in the set")]
    DuplicateKey,
    /// An interval endpoint lies outside the circular domain `[zero, modulo)`.
    #[error("interval endpoints must lie within [zero, modulo)")]
    InvalidRange,
}

/// A broken tree invariant, reported by [`OrderedSet::validate`](crate::OrderedSet::validate).
///
/// Any of these indicates a bug in the set itself rather than misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("the root node {0} is red")]
    RedRoot(usize),
    #[error("the root node {0} has a parent link")]
    RootHasParent(usize),
    #[error("red node {0} has a red child")]
    RedChildOfRed(usize),
    #[error("black height differs below node {0}")]
    BlackHeight(usize),
    #[error("node {node} stores count {stored} but its subtree holds {actual}")]
    Count {
        node: usize,
        stored: usize,
        actual: usize,
    },
    #[error("node {0} does not link back to its parent")]
    ParentLink(usize),
    #[error("node {0} is out of order with its predecessor")]
    Order(usize),
    #[error("set length {len} differs from the root count {count}")]
    Length { len: usize, count: usize },
}
