//! Tree primitives shared by the binomial and Fibonacci backends
//!
//! Both backends keep a root list of heap-ordered trees in a
//! [`SlotMapStorage`] and combine trees with the same rule:
//!
//! - **link**: given two trees of equal degree `d`, the root with the smaller
//!   key becomes the last child of the other, which now has degree `d + 1`
//! - **consolidate**: walk the root list once with a degree-indexed table,
//!   linking on every collision and carrying the result to the next degree,
//!   exactly like carry propagation in binary addition
//!
//! They differ only in *when* consolidation runs: eagerly after every
//! mutation (binomial) or lazily at extraction time (Fibonacci).
//!
//! Since no operation ever cuts a subtree out of its parent, every tree built
//! by repeated linking is a binomial tree, in either backend. A degree-`d`
//! root has children of degrees `0, 1, ..., d-1` in that order (each link
//! appends the newest, largest child) and `2^d` nodes.
//! [`validate_forest`] checks exactly this.

use crate::storage::{NodeKey, SlotMapStorage};
use crate::traits::InvariantViolation;
use smallvec::SmallVec;

/// Child list of a tree node
pub(crate) type Children = SmallVec<[NodeKey; 8]>;

/// Node bookkeeping required by the shared forest algorithms
pub(crate) trait TreeNode<K: Ord> {
    fn key(&self) -> &K;

    fn into_key(self) -> K;

    fn degree(&self) -> usize;

    fn parent(&self) -> Option<NodeKey>;

    fn set_parent(&mut self, parent: Option<NodeKey>);

    fn children(&self) -> &[NodeKey];

    /// Appends `child` as the last child and increments the degree
    fn adopt(&mut self, child: NodeKey);

    /// Detaches and returns every child, resetting the degree to zero
    fn take_children(&mut self) -> Children;
}

/// Size of the degree table for a forest holding `total_nodes` nodes
///
/// No root can exceed degree `⌊log2 n⌋`, so `⌊log2 n⌋ + 2` slots always leave
/// room for the final carry.
pub(crate) fn degree_table_size(total_nodes: usize) -> usize {
    match total_nodes {
        0 => 1,
        n => n.ilog2() as usize + 2,
    }
}

/// Links two trees of equal degree, returning the surviving root
///
/// On equal keys `a` stays the root.
///
/// **Time Complexity**: O(1)
pub(crate) fn link<K: Ord, N: TreeNode<K>>(
    nodes: &mut SlotMapStorage<N>,
    a: NodeKey,
    b: NodeKey,
) -> NodeKey {
    debug_assert_eq!(nodes[a].degree(), nodes[b].degree());

    let (parent, child) = if nodes[a].key() < nodes[b].key() {
        (b, a)
    } else {
        (a, b)
    };

    nodes[child].set_parent(Some(parent));
    nodes[parent].adopt(child);
    parent
}

/// Rebuilds `roots` so that no two roots share a degree
///
/// Returns the key of the maximum root, found by scanning only the surviving
/// roots (at most `⌊log2 n⌋ + 1` of them). The new root list is ordered by
/// ascending degree.
///
/// **Time Complexity**: O(r + log n) where `r` is the length of the incoming
/// root list; every link removes one root, so the pass is paid for by the
/// operations that created those roots.
pub(crate) fn consolidate<K: Ord, N: TreeNode<K>>(
    nodes: &mut SlotMapStorage<N>,
    roots: &mut Vec<NodeKey>,
    total_nodes: usize,
) -> Option<NodeKey> {
    let mut table: Vec<Option<NodeKey>> = vec![None; degree_table_size(total_nodes)];

    for mut tree in roots.drain(..) {
        let mut degree = nodes[tree].degree();
        loop {
            if degree >= table.len() {
                table.resize(degree + 1, None);
            }
            match table[degree].take() {
                Some(other) => {
                    tree = link(nodes, tree, other);
                    degree = nodes[tree].degree();
                }
                None => {
                    table[degree] = Some(tree);
                    break;
                }
            }
        }
    }

    roots.extend(table.into_iter().flatten());
    find_max(nodes, roots)
}

/// Returns the root with the largest key (the first one on ties)
pub(crate) fn find_max<K: Ord, N: TreeNode<K>>(
    nodes: &SlotMapStorage<N>,
    roots: &[NodeKey],
) -> Option<NodeKey> {
    roots.iter().copied().reduce(|best, root| {
        if nodes[root].key() > nodes[best].key() {
            root
        } else {
            best
        }
    })
}

/// Moves every child of `node` onto the root list, clearing their parent links
pub(crate) fn promote_children<K: Ord, N: TreeNode<K>>(
    nodes: &mut SlotMapStorage<N>,
    node: NodeKey,
    roots: &mut Vec<NodeKey>,
) {
    for child in nodes[node].take_children() {
        nodes[child].set_parent(None);
        roots.push(child);
    }
}

/// Checks one tree and returns its node count
fn validate_tree<K: Ord, N: TreeNode<K>>(
    nodes: &SlotMapStorage<N>,
    root: NodeKey,
) -> Result<usize, InvariantViolation> {
    let node = nodes.get(root).ok_or(InvariantViolation::DanglingKey)?;
    let children = node.children();

    if node.degree() != children.len() {
        return Err(InvariantViolation::DegreeMismatch {
            recorded: node.degree(),
            children: children.len(),
        });
    }

    let mut size = 1;
    for (position, &child_key) in children.iter().enumerate() {
        let child = nodes.get(child_key).ok_or(InvariantViolation::DanglingKey)?;
        if child.parent() != Some(root) {
            return Err(InvariantViolation::ParentLink);
        }
        if child.key() > node.key() {
            return Err(InvariantViolation::HeapOrder);
        }
        if child.degree() != position {
            return Err(InvariantViolation::BinomialShape {
                degree: node.degree(),
            });
        }
        size += validate_tree(nodes, child_key)?;
    }

    if size != 1usize << node.degree() {
        return Err(InvariantViolation::BinomialShape {
            degree: node.degree(),
        });
    }
    Ok(size)
}

/// Checks a whole forest: every tree, the element count, the arena, the cached
/// maximum and, if `distinct_degrees` is set, the one-root-per-degree rule
pub(crate) fn validate_forest<K: Ord, N: TreeNode<K>>(
    nodes: &SlotMapStorage<N>,
    roots: &[NodeKey],
    max: Option<NodeKey>,
    len: usize,
    distinct_degrees: bool,
) -> Result<(), InvariantViolation> {
    let mut reachable = 0;
    for &root in roots {
        let node = nodes.get(root).ok_or(InvariantViolation::DanglingKey)?;
        if node.parent().is_some() {
            return Err(InvariantViolation::ParentLink);
        }
        reachable += validate_tree(nodes, root)?;
    }

    if reachable != len {
        return Err(InvariantViolation::CountMismatch {
            recorded: len,
            actual: reachable,
        });
    }
    if nodes.len() != reachable {
        return Err(InvariantViolation::OrphanedNodes {
            reachable,
            stored: nodes.len(),
        });
    }

    match (max, find_max(nodes, roots)) {
        (None, None) => {}
        (Some(cached), Some(actual)) => {
            if !roots.contains(&cached) || nodes[cached].key() != nodes[actual].key() {
                return Err(InvariantViolation::StaleMaximum);
            }
        }
        _ => return Err(InvariantViolation::StaleMaximum),
    }

    if distinct_degrees {
        let mut seen: SmallVec<[bool; 64]> = SmallVec::new();
        for &root in roots {
            let degree = nodes[root].degree();
            if degree >= seen.len() {
                seen.resize(degree + 1, false);
            }
            if seen[degree] {
                return Err(InvariantViolation::DuplicateRootDegree(degree));
            }
            seen[degree] = true;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal node used to exercise the primitives in isolation
    struct TestNode {
        key: i32,
        degree: usize,
        parent: Option<NodeKey>,
        children: Children,
    }

    impl TestNode {
        fn new(key: i32) -> Self {
            TestNode {
                key,
                degree: 0,
                parent: None,
                children: Children::new(),
            }
        }
    }

    impl TreeNode<i32> for TestNode {
        fn key(&self) -> &i32 {
            &self.key
        }
        fn into_key(self) -> i32 {
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
            std::mem::take(&mut self.children)
        }
    }

    fn singletons(nodes: &mut SlotMapStorage<TestNode>, keys: &[i32]) -> Vec<NodeKey> {
        keys.iter().map(|&k| nodes.insert(TestNode::new(k))).collect()
    }

    #[test]
    fn test_degree_table_size() {
        assert_eq!(degree_table_size(0), 1);
        assert_eq!(degree_table_size(1), 2);
        assert_eq!(degree_table_size(2), 3);
        assert_eq!(degree_table_size(3), 3);
        assert_eq!(degree_table_size(1024), 12);
        assert_eq!(degree_table_size(1025), 12);
    }

    #[test]
    fn test_link_larger_key_wins() {
        let mut nodes = SlotMapStorage::new();
        let keys = singletons(&mut nodes, &[3, 9]);

        let root = link(&mut nodes, keys[0], keys[1]);

        assert_eq!(root, keys[1]);
        assert_eq!(nodes[root].degree, 1);
        assert_eq!(nodes[keys[0]].parent, Some(keys[1]));
        assert_eq!(nodes[root].children.as_slice(), &[keys[0]]);
    }

    #[test]
    fn test_link_tie_keeps_first_argument() {
        let mut nodes = SlotMapStorage::new();
        let keys = singletons(&mut nodes, &[4, 4]);

        assert_eq!(link(&mut nodes, keys[0], keys[1]), keys[0]);
    }

    #[test]
    fn test_consolidate_behaves_like_binary_addition() {
        let mut nodes = SlotMapStorage::new();
        // 7 = 0b111: one tree each of degree 0, 1 and 2
        let mut roots = singletons(&mut nodes, &[5, 1, 7, 3, 2, 6, 4]);

        let max = consolidate(&mut nodes, &mut roots, 7);

        let degrees: Vec<usize> = roots.iter().map(|&r| nodes[r].degree).collect();
        assert_eq!(degrees, vec![0, 1, 2]);
        assert_eq!(max.map(|m| nodes[m].key), Some(7));
        assert_eq!(validate_forest(&nodes, &roots, max, 7, true), Ok(()));
    }

    #[test]
    fn test_consolidate_empty_forest() {
        let mut nodes: SlotMapStorage<TestNode> = SlotMapStorage::new();
        let mut roots = Vec::new();

        assert_eq!(consolidate(&mut nodes, &mut roots, 0), None);
        assert!(roots.is_empty());
    }

    #[test]
    fn test_validate_detects_heap_order_violation() {
        let mut nodes = SlotMapStorage::new();
        let keys = singletons(&mut nodes, &[1, 2]);
        let root = link(&mut nodes, keys[0], keys[1]);
        nodes[keys[0]].key = 100;

        assert_eq!(
            validate_forest(&nodes, &[root], Some(root), 2, true),
            Err(InvariantViolation::HeapOrder)
        );
    }

    #[test]
    fn test_validate_detects_duplicate_degree_and_stale_max() {
        let mut nodes = SlotMapStorage::new();
        let roots = singletons(&mut nodes, &[1, 2]);

        assert_eq!(
            validate_forest(&nodes, &roots, Some(roots[1]), 2, true),
            Err(InvariantViolation::DuplicateRootDegree(0))
        );
        assert_eq!(
            validate_forest(&nodes, &roots, Some(roots[0]), 2, false),
            Err(InvariantViolation::StaleMaximum)
        );
    }

    #[test]
    fn test_validate_detects_orphans() {
        let mut nodes = SlotMapStorage::new();
        let keys = singletons(&mut nodes, &[1, 2]);

        assert_eq!(
            validate_forest(&nodes, &keys[..1], Some(keys[0]), 1, true),
            Err(InvariantViolation::OrphanedNodes {
                reachable: 1,
                stored: 2
            })
        );
    }
}
