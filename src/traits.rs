//! The capability contract shared by every max-heap backend
//!
//! This module provides:
//!
//! - [`Heap`]: the uniform operation set (`insert`, `get_max`, `extract_max`,
//!   `size`, `is_empty`, `merge`) implemented by all backends
//! - [`HeapError`]: the closed set of failures an operation may report
//! - [`InvariantViolation`]: what [`Heap::check_invariants`] reports when a
//!   structural invariant does not hold
//!
//! Unlike [`std::collections::BinaryHeap`], operations on an empty heap return
//! an error rather than `None`, so callers can distinguish "empty" from the
//! other failure kinds with a single `match`.

use crate::backend::Backend;
use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `get_max` or `extract_max` was called on a heap with no elements
    EmptyHeap,
    /// `merge` was called with a donor of a different concrete backend
    IncompatibleBackend {
        /// Backend of the heap `merge` was called on
        receiver: Backend,
        /// Backend of the heap passed as the argument
        donor: Backend,
    },
    /// The backend does not implement the requested operation
    UnsupportedOperation {
        /// Backend that refused the call
        backend: Backend,
        /// Name of the refused operation, as spelled in [`Heap`]
        operation: &'static str,
    },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::EmptyHeap => write!(f, "heap is empty"),
            HeapError::IncompatibleBackend { receiver, donor } => {
                write!(f, "cannot merge a {donor} into a {receiver}: incompatible heap type")
            }
            HeapError::UnsupportedOperation { backend, operation } => {
                write!(f, "{backend} does not support the {operation} operation")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A structural invariant found broken by [`Heap::check_invariants`]
///
/// None of these can be produced through the public API; they exist so tests
/// (and curious callers) can assert the internal shape after any operation
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A child key exceeds its parent's key
    HeapOrder,
    /// The cached element count disagrees with the number of stored keys
    CountMismatch { recorded: usize, actual: usize },
    /// A node's parent link does not point at the node that owns it
    ParentLink,
    /// A node's recorded degree differs from its number of children
    DegreeMismatch { recorded: usize, children: usize },
    /// A tree is not a binomial tree of its root degree
    BinomialShape { degree: usize },
    /// Two roots of the same degree survived a consolidation pass
    DuplicateRootDegree(usize),
    /// The cached maximum is missing, not a root, or not the largest root
    StaleMaximum,
    /// The node arena holds nodes unreachable from the root list
    OrphanedNodes { reachable: usize, stored: usize },
    /// A link refers to a node that is no longer stored
    DanglingKey,
    /// The circular root list has a one-way link or does not close on itself
    BrokenRootList,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::HeapOrder => write!(f, "child key exceeds parent key"),
            InvariantViolation::CountMismatch { recorded, actual } => {
                write!(f, "recorded size {recorded} but found {actual} elements")
            }
            InvariantViolation::ParentLink => write!(f, "parent link does not match owner"),
            InvariantViolation::DegreeMismatch { recorded, children } => {
                write!(f, "degree {recorded} recorded for a node with {children} children")
            }
            InvariantViolation::BinomialShape { degree } => {
                write!(f, "tree rooted at degree {degree} is not a binomial tree")
            }
            InvariantViolation::DuplicateRootDegree(degree) => {
                write!(f, "more than one root of degree {degree}")
            }
            InvariantViolation::StaleMaximum => write!(f, "cached maximum is stale"),
            InvariantViolation::OrphanedNodes { reachable, stored } => {
                write!(f, "{stored} nodes stored but only {reachable} reachable")
            }
            InvariantViolation::DanglingKey => write!(f, "link to a node that no longer exists"),
            InvariantViolation::BrokenRootList => write!(f, "root list is not a closed ring"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Uniform capability contract for max-heaps
///
/// All three backends ([`BinaryHeap`](crate::binary::BinaryHeap),
/// [`BinomialHeap`](crate::binomial::BinomialHeap) and
/// [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)) implement this trait, as
/// does the closed variant [`AnyHeap`](crate::backend::AnyHeap).
///
/// # Example
///
/// ```rust
/// use max_heap_engine::{Heap, HeapError};
/// use max_heap_engine::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// heap.insert(3);
/// heap.insert(7);
/// heap.insert(5);
///
/// assert_eq!(heap.get_max(), Ok(&7));
/// assert_eq!(heap.extract_max(), Ok(7));
/// assert_eq!(heap.size(), 2);
///
/// let mut empty: BinomialHeap<i32> = BinomialHeap::new();
/// assert_eq!(empty.extract_max(), Err(HeapError::EmptyHeap));
/// ```
pub trait Heap<K: Ord> {
    /// Returns the concrete backend behind this heap
    fn backend(&self) -> Backend;

    /// Returns the number of elements in the heap
    fn size(&self) -> usize;

    /// Returns true if the heap holds no elements
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Inserts a key
    ///
    /// # Time Complexity
    /// O(log n) for the binary and binomial backends, O(1) for Fibonacci.
    fn insert(&mut self, key: K);

    /// Returns the maximum key without removing it
    ///
    /// # Errors
    /// [`HeapError::EmptyHeap`] if the heap has no elements.
    ///
    /// # Time Complexity
    /// O(1) for all implementations
    fn get_max(&self) -> Result<&K, HeapError>;

    /// Removes and returns the maximum key
    ///
    /// # Errors
    /// [`HeapError::EmptyHeap`] if the heap has no elements.
    ///
    /// # Time Complexity
    /// O(log n) (amortized for the Fibonacci backend)
    fn extract_max(&mut self) -> Result<K, HeapError>;

    /// Moves every element of `other` into this heap, leaving `other` empty
    ///
    /// On error neither heap is modified.
    ///
    /// # Errors
    /// - [`HeapError::UnsupportedOperation`] from the binary backend, always.
    /// - [`HeapError::IncompatibleBackend`] from [`AnyHeap`](crate::backend::AnyHeap)
    ///   when the two heaps use different backends.
    fn merge(&mut self, other: &mut Self) -> Result<(), HeapError>;

    /// Walks the whole structure and checks every internal invariant
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}
