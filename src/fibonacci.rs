//! Fibonacci max-heap
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) insert and merge (no structural work at all)
//! - O(log n) amortized extract_max
//!
//! The structure consists of a collection of heap-ordered trees. Unlike the
//! [binomial heap](crate::binomial), trees are never combined eagerly: insert
//! and merge only append to the root list, and the whole list is consolidated
//! in one pass the next time the maximum is extracted.
//!
//! # Scope
//!
//! This heap offers no `decrease_key`, so it never cuts a subtree out of its
//! parent and never uses cascading cuts. Nodes still carry the `marked` flag
//! those operations need, but nothing sets or reads it. In practice it is a
//! lazy-merge max-heap: the O(1) amortized decrease-key that motivates real
//! Fibonacci heaps is not exercised by anything this crate offers, and every
//! tree it builds is a binomial tree.
//!
//! # Root ring
//!
//! Roots form a circular doubly-linked list threaded through the nodes'
//! `left`/`right` keys, entered at the maximum root. Merge splices two rings
//! with four link updates, and the donor's node arena is taken over segment by
//! segment (see [`SlotMapStorage::absorb`]), so no node is copied or moved.

use crate::backend::Backend;
use crate::forest::{self, Children, TreeNode};
use crate::storage::{NodeKey, SlotMapStorage};
use crate::traits::{Heap, HeapError, InvariantViolation};
use std::mem;

struct Node<K> {
    key: K,
    degree: usize,
    parent: Option<NodeKey>,
    children: Children,
    /// Neighbours in the root ring; meaningless while the node has a parent
    left: NodeKey,
    right: NodeKey,
    /// Reserved for decrease-key's cascading cuts.
    #[allow(dead_code)]
    marked: bool,
}

impl<K> Node<K> {
    fn singleton(key: K, this: NodeKey) -> Self {
        Node {
            key,
            degree: 0,
            parent: None,
            children: Children::new(),
            left: this,
            right: this,
            marked: false,
        }
    }
}

impl<K: Ord> TreeNode<K> for Node<K> {
    fn key(&self) -> &K {
        &self.key
    }

    fn into_key(self) -> K {
        self.key
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeKey] {
        &self.children
    }

    fn adopt(&mut self, child: NodeKey) {
        self.children.push(child);
        self.degree += 1;
    }

    fn take_children(&mut self) -> Children {
        self.degree = 0;
        mem::take(&mut self.children)
    }
}

/// Fibonacci max-heap
///
/// # Example
///
/// ```rust
/// use max_heap_engine::Heap;
/// use max_heap_engine::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// for key in [5, 3, 8, 1, 9, 2] {
///     heap.insert(key);
/// }
/// // Nothing has been linked yet.
/// assert_eq!(heap.root_count(), 6);
///
/// assert_eq!(heap.extract_max(), Ok(9));
/// assert_eq!(heap.get_max(), Ok(&8));
/// ```
pub struct FibonacciHeap<K: Ord> {
    nodes: SlotMapStorage<Node<K>>,
    /// Maximum root, and the entry point of the root ring
    max: Option<NodeKey>,
    /// Length of the root ring
    roots: usize,
    len: usize,
}

impl<K: Ord> FibonacciHeap<K> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self {
            nodes: SlotMapStorage::new(),
            max: None,
            roots: 0,
            len: 0,
        }
    }

    /// Number of trees in the root list
    pub fn root_count(&self) -> usize {
        self.roots
    }

    /// Degrees of the current roots, walking the ring from the maximum
    ///
    /// Pairwise distinct right after an `extract_max`; may repeat after
    /// `insert` or `merge`.
    pub fn root_degrees(&self) -> Vec<usize> {
        self.root_keys()
            .into_iter()
            .map(|r| self.nodes[r].degree)
            .collect()
    }

    /// Number of arena segments backing this heap
    ///
    /// A merge costs O(1) plus the smaller of the two heaps' segment counts,
    /// whatever the number of elements.
    pub fn segment_count(&self) -> usize {
        self.nodes.segment_count()
    }

    fn root_keys(&self) -> Vec<NodeKey> {
        let mut keys = Vec::with_capacity(self.roots);
        let Some(start) = self.max else {
            return keys;
        };
        let mut current = start;
        loop {
            keys.push(current);
            current = self.nodes[current].right;
            if current == start {
                return keys;
            }
        }
    }

    /// Joins the ring through `a` and the ring through `b` into one
    fn splice_rings(&mut self, a: NodeKey, b: NodeKey) {
        let a_left = self.nodes[a].left;
        let b_left = self.nodes[b].left;
        self.nodes[a_left].right = b;
        self.nodes[b].left = a_left;
        self.nodes[b_left].right = a;
        self.nodes[a].left = b_left;
    }

    /// Adds a parentless tree to the ring, updating the max if it is larger
    fn add_root(&mut self, root: NodeKey) {
        self.nodes[root].left = root;
        self.nodes[root].right = root;
        self.roots += 1;

        match self.max {
            Some(max) => {
                self.splice_rings(max, root);
                if self.nodes[root].key > self.nodes[max].key {
                    self.max = Some(root);
                }
            }
            None => self.max = Some(root),
        }
    }

    /// Walks the ring with lookups that cannot panic, checking both directions
    fn checked_ring(&self) -> Result<Vec<NodeKey>, InvariantViolation> {
        let mut ring = Vec::with_capacity(self.roots);
        let Some(start) = self.max else {
            return match self.roots {
                0 => Ok(ring),
                _ => Err(InvariantViolation::BrokenRootList),
            };
        };

        let mut current = start;
        loop {
            let node = self.nodes.get(current).ok_or(InvariantViolation::DanglingKey)?;
            let next = self.nodes.get(node.right).ok_or(InvariantViolation::DanglingKey)?;
            if next.left != current || ring.len() >= self.nodes.len() {
                return Err(InvariantViolation::BrokenRootList);
            }
            ring.push(current);
            current = node.right;
            if current == start {
                break;
            }
        }

        if ring.len() != self.roots {
            return Err(InvariantViolation::BrokenRootList);
        }
        Ok(ring)
    }
}

impl<K: Ord> Heap<K> for FibonacciHeap<K> {
    fn backend(&self) -> Backend {
        Backend::Fibonacci
    }

    fn size(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.max.is_none()
    }

    fn insert(&mut self, key: K) {
        let node = self.nodes.insert_with_key(|this| Node::singleton(key, this));
        self.add_root(node);
        self.len += 1;
    }

    fn get_max(&self) -> Result<&K, HeapError> {
        self.max
            .map(|max| &self.nodes[max].key)
            .ok_or(HeapError::EmptyHeap)
    }

    /// Removes and returns the maximum key
    ///
    /// **Time Complexity**: O(log n) amortized
    ///
    /// **Algorithm**:
    /// 1. Collect the ring without the max root, then append the max root's
    ///    children with their parents cleared
    /// 2. Free the max root
    /// 3. Consolidate, which leaves one tree per degree, and rebuild the ring
    ///    from the survivors, which finds the true max
    ///
    /// Every root created since the last extraction is paid for here, which
    /// is what makes insert and merge O(1) amortized.
    fn extract_max(&mut self) -> Result<K, HeapError> {
        let max = self.max.ok_or(HeapError::EmptyHeap)?;

        let mut roots: Vec<NodeKey> = self.root_keys().into_iter().skip(1).collect();
        forest::promote_children(&mut self.nodes, max, &mut roots);
        let node = self.nodes.remove(max).ok_or(HeapError::EmptyHeap)?;
        self.len -= 1;

        self.max = None;
        self.roots = 0;
        forest::consolidate(&mut self.nodes, &mut roots, self.len);
        for root in roots {
            self.add_root(root);
        }

        Ok(node.into_key())
    }

    /// Splices `other`'s root ring into this one
    ///
    /// **Time Complexity**: O(1) plus the smaller segment count
    ///
    /// The heap with fewer arena segments is absorbed into the other one, the
    /// two rings are cut open and joined, and the new maximum is the larger
    /// of the two cached maxima. No consolidation happens here; it is
    /// deferred to the next extraction.
    fn merge(&mut self, other: &mut Self) -> Result<(), HeapError> {
        if other.nodes.segment_count() > self.nodes.segment_count() {
            mem::swap(self, other);
        }

        let Some(other_max) = other.max.take() else {
            return Ok(());
        };
        self.nodes.absorb(&mut other.nodes);

        match self.max {
            Some(max) => {
                self.splice_rings(max, other_max);
                if self.nodes[other_max].key > self.nodes[max].key {
                    self.max = Some(other_max);
                }
            }
            None => self.max = Some(other_max),
        }
        self.roots += mem::take(&mut other.roots);
        self.len += mem::take(&mut other.len);
        Ok(())
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let roots = self.checked_ring()?;
        forest::validate_forest(&self.nodes, &roots, self.max, self.len, false)
    }
}

impl<K: Ord> Default for FibonacciHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for FibonacciHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for FibonacciHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord + std::fmt::Debug> std::fmt::Debug for FibonacciHeap<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FibonacciHeap")
            .field("len", &self.len)
            .field("root_degrees", &self.root_degrees())
            .field("max", &self.get_max().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct(degrees: &[usize]) -> bool {
        let mut sorted = degrees.to_vec();
        sorted.sort_unstable();
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    #[test]
    fn test_insert_is_lazy() {
        let mut heap = FibonacciHeap::new();
        for i in 0..10 {
            heap.insert(i);
        }

        assert_eq!(heap.root_count(), 10);
        assert!(heap.root_degrees().iter().all(|&d| d == 0));
        assert_eq!(heap.get_max(), Ok(&9));
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_extract_consolidates() {
        let mut heap: FibonacciHeap<i32> = (0..10).collect();

        assert_eq!(heap.extract_max(), Ok(9));

        // 9 = 0b1001
        let mut degrees = heap.root_degrees();
        degrees.sort_unstable();
        assert_eq!(degrees, vec![0, 3]);
        assert_eq!(heap.get_max(), Ok(&8));
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_extract_last_element_empties_heap() {
        let mut heap = FibonacciHeap::new();
        heap.insert(1);

        assert_eq!(heap.extract_max(), Ok(1));
        assert!(heap.is_empty());
        assert_eq!(heap.root_count(), 0);
        assert_eq!(heap.get_max(), Err(HeapError::EmptyHeap));
        assert_eq!(heap.extract_max(), Err(HeapError::EmptyHeap));
    }

    #[test]
    fn test_merge_does_not_consolidate() {
        let mut a: FibonacciHeap<i32> = [10, 20].into_iter().collect();
        let mut b: FibonacciHeap<i32> = [15, 5].into_iter().collect();

        a.merge(&mut b).unwrap();

        assert_eq!(a.size(), 4);
        assert_eq!(b.size(), 0);
        assert_eq!(a.get_max(), Ok(&20));
        assert_eq!(a.root_count(), 4);
        assert_eq!(a.check_invariants(), Ok(()));
        assert_eq!(b.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_picks_donor_max() {
        let mut small: FibonacciHeap<i32> = [1].into_iter().collect();
        let mut big: FibonacciHeap<i32> = [50, 2, 3].into_iter().collect();

        small.merge(&mut big).unwrap();
        assert_eq!(small.get_max(), Ok(&50));

        let mut big: FibonacciHeap<i32> = [4, 5, 6].into_iter().collect();
        let mut small_with_max: FibonacciHeap<i32> = [99].into_iter().collect();
        big.merge(&mut small_with_max).unwrap();
        assert_eq!(big.get_max(), Ok(&99));
        assert_eq!(big.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_of_consolidated_trees() {
        let mut a: FibonacciHeap<i32> = (0..9).collect();
        let mut b: FibonacciHeap<i32> = (100..105).collect();
        a.extract_max().unwrap();
        b.extract_max().unwrap();

        a.merge(&mut b).unwrap();
        assert_eq!(a.size(), 12);
        assert_eq!(a.get_max(), Ok(&103));
        assert_eq!(a.check_invariants(), Ok(()));

        a.extract_max().unwrap();
        assert!(distinct(&a.root_degrees()));
        assert_eq!(a.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_keeps_donor_nodes_in_place() {
        let mut a: FibonacciHeap<i32> = (0..10).collect();
        let mut b: FibonacciHeap<i32> = (100..1100).collect();
        let donor_max = b.max;

        a.merge(&mut b).unwrap();

        // The donor's max node is now this heap's max under the same key.
        assert_eq!(a.max, donor_max);
        assert_eq!(a.get_max(), Ok(&1099));
        assert_eq!(a.root_count(), 1010);
        assert_eq!(a.segment_count(), 2);
        assert_eq!(b.segment_count(), 1);
        assert_eq!(a.check_invariants(), Ok(()));

        // The emptied donor starts over with a segment of its own.
        b.insert(7);
        assert_eq!(b.get_max(), Ok(&7));
        assert_eq!(b.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_absorbs_heap_with_fewer_segments() {
        let mut a: FibonacciHeap<i32> = [1].into_iter().collect();
        let mut b: FibonacciHeap<i32> = [2].into_iter().collect();
        let mut c: FibonacciHeap<i32> = [3].into_iter().collect();
        b.merge(&mut c).unwrap();
        assert_eq!(b.segment_count(), 2);

        a.merge(&mut b).unwrap();
        assert_eq!(a.segment_count(), 3);
        assert_eq!(a.size(), 3);
        assert_eq!(a.get_max(), Ok(&3));
        assert!(b.is_empty());
        assert_eq!(a.check_invariants(), Ok(()));
    }

    #[test]
    fn test_drained_segments_are_released() {
        let mut a: FibonacciHeap<i32> = (0..4).collect();
        let mut b: FibonacciHeap<i32> = (10..14).collect();
        a.merge(&mut b).unwrap();
        assert_eq!(a.segment_count(), 2);

        for expected in (10..14).rev() {
            assert_eq!(a.extract_max(), Ok(expected));
        }
        assert_eq!(a.segment_count(), 1);
        assert_eq!(a.check_invariants(), Ok(()));
    }

    #[test]
    fn test_broken_ring_is_reported() {
        let mut heap: FibonacciHeap<i32> = (0..3).collect();
        let max = heap.max.unwrap();
        let next = heap.nodes[max].right;
        heap.nodes[next].right = next;

        assert_eq!(
            heap.check_invariants(),
            Err(InvariantViolation::BrokenRootList)
        );
    }
}
