//! Array-backed binary max-heap
//!
//! The tree is implicit: the children of index `i` live at `2i + 1` and
//! `2i + 2`, its parent at `(i - 1) / 2`. Every public operation leaves the
//! array satisfying the max-heap property before returning.
//!
//! # Time Complexity
//!
//! | Operation     | Complexity  |
//! |---------------|-------------|
//! | `insert`      | O(log n)    |
//! | `extract_max` | O(log n)    |
//! | `get_max`     | O(1)        |
//! | `merge`       | unsupported |
//!
//! `merge` always fails with [`HeapError::UnsupportedOperation`]: a union of
//! two arrays cannot restore the heap property in better than O(n), so this
//! backend does not offer it.
//!
//! # Example
//!
//! ```rust
//! use max_heap_engine::Heap;
//! use max_heap_engine::binary::BinaryHeap;
//!
//! let mut heap = BinaryHeap::new();
//! heap.insert(3);
//! heap.insert(1);
//! heap.insert(2);
//!
//! assert_eq!(heap.get_max(), Ok(&3));
//! assert_eq!(heap.extract_max(), Ok(3));
//! assert_eq!(heap.extract_max(), Ok(2));
//! assert_eq!(heap.extract_max(), Ok(1));
//! assert!(heap.extract_max().is_err());
//! ```

use crate::backend::Backend;
use crate::traits::{Heap, HeapError, InvariantViolation};

/// A binary max-heap stored in a `Vec`
#[derive(Debug, Clone)]
pub struct BinaryHeap<K: Ord> {
    /// Keys in implicit-tree order
    data: Vec<K>,
}

impl<K: Ord> BinaryHeap<K> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty heap with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.data[index] > self.data[parent] {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut largest = index;

            if left < len && self.data[left] > self.data[largest] {
                largest = left;
            }
            if right < len && self.data[right] > self.data[largest] {
                largest = right;
            }

            if largest != index {
                self.data.swap(index, largest);
                index = largest;
            } else {
                break;
            }
        }
    }
}

impl<K: Ord> Heap<K> for BinaryHeap<K> {
    fn backend(&self) -> Backend {
        Backend::Binary
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn insert(&mut self, key: K) {
        self.data.push(key);
        self.sift_up(self.data.len() - 1);
    }

    fn get_max(&self) -> Result<&K, HeapError> {
        self.data.first().ok_or(HeapError::EmptyHeap)
    }

    fn extract_max(&mut self) -> Result<K, HeapError> {
        if self.data.is_empty() {
            return Err(HeapError::EmptyHeap);
        }

        // Moves the last element into slot 0 and hands back the old root.
        let max = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Ok(max)
    }

    fn merge(&mut self, _other: &mut Self) -> Result<(), HeapError> {
        Err(HeapError::UnsupportedOperation {
            backend: Backend::Binary,
            operation: "merge",
        })
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for child in 1..self.data.len() {
            if self.data[child] > self.data[(child - 1) / 2] {
                return Err(InvariantViolation::HeapOrder);
            }
        }
        Ok(())
    }
}

impl<K: Ord> Default for BinaryHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for BinaryHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.data.reserve(iter.size_hint().0);
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BinaryHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut heap = Self::with_capacity(iter.size_hint().0);
        heap.extend(iter);
        heap
    }
}
