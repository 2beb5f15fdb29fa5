//! Binomial max-heap
//!
//! A binomial heap is a collection of binomial trees with:
//! - O(log n) insert (O(1) amortized over a run of inserts)
//! - O(log n) extract_max
//! - O(log n) merge
//!
//! # Algorithm Overview
//!
//! A binomial heap maintains a forest of binomial trees, where:
//! - Each tree satisfies the (max-)heap property
//! - At most one tree of each degree (0, 1, 2, ..., log n)
//! - This is analogous to binary representation of n
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two B_{k-1} trees
//! - Bₖ has exactly 2ᵏ nodes and height k
//!
//! **Key Operations**:
//! - **Insert**: merge a single-node tree into the forest (like adding 1 to a
//!   binary counter)
//! - **Extract-max**: remove the max root, return its children to the root list,
//!   consolidate
//! - **Merge**: append the other root list, consolidate once
//!
//! **Invariant**: After every public operation, at most one tree of each degree.
//! This ensures O(log n) trees total, bounding operation costs.
//!
//! Nodes live in a segmented [`SlotMapStorage`]. Merging takes over the
//! donor's segments without moving any node, so only the O(log n) root lists
//! are touched.

use crate::backend::Backend;
use crate::forest::{self, Children, TreeNode};
use crate::storage::{NodeKey, SlotMapStorage};
use crate::traits::{Heap, HeapError, InvariantViolation};
use std::mem;

/// Internal node structure for binomial heap
///
/// **Binomial Tree Structure**: a node of degree k has exactly k children with
/// degrees 0, 1, ..., k-1 (in that order) and heads a subtree of 2ᵏ nodes.
struct Node<K> {
    key: K,
    /// Number of children
    degree: usize,
    /// Parent node (None if root); not an owning link
    parent: Option<NodeKey>,
    /// Owned subtrees
    children: Children,
}

impl<K> Node<K> {
    fn singleton(key: K) -> Self {
        Node {
            key,
            degree: 0,
            parent: None,
            children: Children::new(),
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

/// Binomial max-heap
///
/// # Example
///
/// ```rust
/// use max_heap_engine::Heap;
/// use max_heap_engine::binomial::BinomialHeap;
///
/// let mut a: BinomialHeap<i32> = [10, 20].into_iter().collect();
/// let mut b: BinomialHeap<i32> = [15, 5].into_iter().collect();
///
/// a.merge(&mut b).unwrap();
/// assert_eq!(a.size(), 4);
/// assert_eq!(b.size(), 0);
/// assert_eq!(a.get_max(), Ok(&20));
/// ```
pub struct BinomialHeap<K: Ord> {
    nodes: SlotMapStorage<Node<K>>,
    /// Root list; after consolidation, ordered by ascending degree
    roots: Vec<NodeKey>,
    /// Root holding the maximum key
    max: Option<NodeKey>,
    /// Number of elements in the heap
    len: usize,
}

impl<K: Ord> BinomialHeap<K> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self {
            nodes: SlotMapStorage::new(),
            roots: Vec::new(),
            max: None,
            len: 0,
        }
    }

    /// Degrees of the current roots, in root-list order
    ///
    /// Always pairwise distinct for this backend.
    pub fn root_degrees(&self) -> Vec<usize> {
        self.roots.iter().map(|&r| self.nodes[r].degree).collect()
    }

    /// Runs the carry-propagation pass and refreshes the max pointer
    fn consolidate(&mut self) {
        self.max = forest::consolidate(&mut self.nodes, &mut self.roots, self.len);
    }

    /// Number of arena segments backing this heap
    ///
    /// A merge costs O(log(n + m)) plus the smaller of the two heaps' segment
    /// counts.
    pub fn segment_count(&self) -> usize {
        self.nodes.segment_count()
    }
}

impl<K: Ord> Heap<K> for BinomialHeap<K> {
    fn backend(&self) -> Backend {
        Backend::Binomial
    }

    fn size(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a new key
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**: a singleton B₀ tree is added to the root list and the
    /// forest is consolidated, which links it with the existing B₀ (if any),
    /// the result with the existing B₁, and so on, exactly like incrementing
    /// a binary counter.
    fn insert(&mut self, key: K) {
        let node = self.nodes.insert(Node::singleton(key));
        self.roots.push(node);
        self.len += 1;
        self.consolidate();
    }

    fn get_max(&self) -> Result<&K, HeapError> {
        self.max
            .map(|max| &self.nodes[max].key)
            .ok_or(HeapError::EmptyHeap)
    }

    /// Removes and returns the maximum key
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Algorithm**:
    /// 1. Detach the max root from the root list
    /// 2. Its children (B_{k-1}, ..., B₀) become roots with no parent
    /// 3. Free the node and consolidate
    fn extract_max(&mut self) -> Result<K, HeapError> {
        let max = self.max.ok_or(HeapError::EmptyHeap)?;

        if let Some(position) = self.roots.iter().position(|&r| r == max) {
            self.roots.swap_remove(position);
        }
        forest::promote_children(&mut self.nodes, max, &mut self.roots);

        let node = self.nodes.remove(max).ok_or(HeapError::EmptyHeap)?;
        self.len -= 1;
        self.consolidate();

        Ok(node.into_key())
    }

    /// Merges another heap into this heap
    ///
    /// **Time Complexity**: O(log(n + m)) plus the smaller segment count
    ///
    /// **Algorithm**:
    /// 1. Keep whichever arena has more segments and absorb the other one
    /// 2. Append `other`'s root list to ours and sum the counts
    /// 3. Consolidate once over the combined list, leaving `other` empty
    fn merge(&mut self, other: &mut Self) -> Result<(), HeapError> {
        if other.nodes.segment_count() > self.nodes.segment_count() {
            mem::swap(self, other);
        }

        self.nodes.absorb(&mut other.nodes);
        self.roots.append(&mut other.roots);
        self.len += mem::take(&mut other.len);
        other.max = None;
        self.consolidate();
        Ok(())
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        forest::validate_forest(&self.nodes, &self.roots, self.max, self.len, true)
    }
}

impl<K: Ord> Default for BinomialHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Extend<K> for BinomialHeap<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BinomialHeap<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord + std::fmt::Debug> std::fmt::Debug for BinomialHeap<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinomialHeap")
            .field("len", &self.len)
            .field("root_degrees", &self.root_degrees())
            .field("max", &self.get_max().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_degrees_follow_binary_representation() {
        let mut heap = BinomialHeap::new();

        for i in 0..13 {
            heap.insert(i);
        }

        // 13 = 0b1101
        assert_eq!(heap.root_degrees(), vec![0, 2, 3]);
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_extract_restores_distinct_degrees() {
        let mut heap: BinomialHeap<i32> = (0..16).collect();
        assert_eq!(heap.root_degrees(), vec![4]);

        assert_eq!(heap.extract_max(), Ok(15));

        // The B₄'s children are B₃, B₂, B₁, B₀: 15 = 0b1111
        assert_eq!(heap.root_degrees(), vec![0, 1, 2, 3]);
        assert_eq!(heap.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_consolidates_carries() {
        let mut a: BinomialHeap<i32> = (0..3).collect();
        let mut b: BinomialHeap<i32> = (10..15).collect();

        a.merge(&mut b).unwrap();

        // 3 + 5 = 8 = 0b1000
        assert_eq!(a.root_degrees(), vec![3]);
        assert_eq!(a.get_max(), Ok(&14));
        assert!(b.is_empty());
        assert_eq!(b.get_max(), Err(HeapError::EmptyHeap));
        assert_eq!(a.check_invariants(), Ok(()));
        assert_eq!(b.check_invariants(), Ok(()));
    }

    #[test]
    fn test_merge_into_empty_and_from_empty() {
        let mut empty = BinomialHeap::new();
        let mut full: BinomialHeap<i32> = [4, 8, 6].into_iter().collect();

        empty.merge(&mut full).unwrap();
        assert_eq!(empty.size(), 3);
        assert_eq!(full.size(), 0);

        let mut nothing = BinomialHeap::new();
        empty.merge(&mut nothing).unwrap();
        assert_eq!(empty.size(), 3);
        assert_eq!(empty.get_max(), Ok(&8));
        assert_eq!(empty.check_invariants(), Ok(()));
    }

    #[test]
    fn test_donor_is_reusable_after_merge() {
        let mut a: BinomialHeap<i32> = [1, 2].into_iter().collect();
        let mut b: BinomialHeap<i32> = [3, 4, 5].into_iter().collect();

        a.merge(&mut b).unwrap();
        b.insert(42);

        assert_eq!(b.size(), 1);
        assert_eq!(b.get_max(), Ok(&42));
        assert_eq!(a.size(), 5);
        assert_eq!(a.get_max(), Ok(&5));
    }

    #[test]
    fn test_merge_takes_over_donor_arena() {
        let mut a: BinomialHeap<i32> = (0..7).collect();
        let mut b: BinomialHeap<i32> = (100..1124).collect();
        let donor_max = b.max;

        a.merge(&mut b).unwrap();

        // 7 + 1024 = 0b100_0000_0111; the donor's B₁₀ root is linked as is.
        assert_eq!(a.root_degrees(), vec![0, 1, 2, 10]);
        assert_eq!(a.max, donor_max);
        assert_eq!(a.segment_count(), 2);
        assert_eq!(b.segment_count(), 1);
        assert_eq!(a.check_invariants(), Ok(()));
    }
}
