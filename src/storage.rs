//! Arena storage for tree nodes
//!
//! The binomial and Fibonacci backends keep their nodes in a [`SlotMapStorage`]
//! instead of individually boxed allocations. Links between nodes are
//! [`NodeKey`]s:
//!
//! - a node's child list holds the keys of the subtrees it owns
//! - a node's parent link is a plain key with no ownership attached
//!
//! Keys are generational, so a key that outlives its node is detected on
//! lookup instead of aliasing whatever reuses the slot. Dropping the storage
//! drops every node exactly once.
//!
//! # Segments
//!
//! A storage is a set of segments, each a [`SlotMap`] tagged with a
//! process-unique id. New nodes always go into the storage's own segment.
//! [`SlotMapStorage::absorb`] takes over another storage's segments as they
//! are, so every key handed out by the donor stays valid in the receiver and
//! no node is moved. This is what lets two heaps merge without paying for
//! the size of either one.
//!
//! # Characteristics
//! - Contiguous memory allocation per segment (better cache locality than
//!   `Rc<RefCell<_>>`)
//! - No reference cycles to break: parent links are just keys
//! - Removal is explicit; a node unlinked from its tree but never removed
//!   shows up as an orphan in `check_invariants`

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::mem;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    struct SlotKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SegmentId(u64);

impl SegmentId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        SegmentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Generational key addressing a node inside one heap's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    segment: SegmentId,
    slot: SlotKey,
}

/// Segmented, SlotMap-backed node arena
#[derive(Debug)]
pub struct SlotMapStorage<N> {
    home_id: SegmentId,
    /// Segment that receives new nodes
    home: SlotMap<SlotKey, N>,
    /// Segments taken over from other storages; never empty
    absorbed: FxHashMap<SegmentId, SlotMap<SlotKey, N>>,
    len: usize,
}

impl<N> Default for SlotMapStorage<N> {
    fn default() -> Self {
        Self {
            home_id: SegmentId::fresh(),
            home: SlotMap::with_key(),
            absorbed: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<N> SlotMapStorage<N> {
    /// Creates an empty arena with a segment id no other arena shares
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self, slot: SlotKey) -> NodeKey {
        NodeKey {
            segment: self.home_id,
            slot,
        }
    }

    fn segment(&self, id: SegmentId) -> Option<&SlotMap<SlotKey, N>> {
        if id == self.home_id {
            Some(&self.home)
        } else {
            self.absorbed.get(&id)
        }
    }

    fn segment_mut(&mut self, id: SegmentId) -> Option<&mut SlotMap<SlotKey, N>> {
        if id == self.home_id {
            Some(&mut self.home)
        } else {
            self.absorbed.get_mut(&id)
        }
    }

    /// Insert a node, returning a key to reference it
    #[inline]
    pub fn insert(&mut self, node: N) -> NodeKey {
        self.insert_with_key(|_| node)
    }

    /// Insert a node built from its own key, for nodes that link to themselves
    pub fn insert_with_key(&mut self, f: impl FnOnce(NodeKey) -> N) -> NodeKey {
        let home_id = self.home_id;
        let slot = self.home.insert_with_key(|slot| f(NodeKey { segment: home_id, slot }));
        self.len += 1;
        self.key(slot)
    }

    /// Remove a node by key, returning the node if it existed
    ///
    /// An absorbed segment is dropped as soon as its last node is removed.
    pub fn remove(&mut self, key: NodeKey) -> Option<N> {
        let segment = self.segment_mut(key.segment)?;
        let node = segment.remove(key.slot)?;
        if segment.is_empty() && key.segment != self.home_id {
            self.absorbed.remove(&key.segment);
        }
        self.len -= 1;
        Some(node)
    }

    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&N> {
        self.segment(key.segment)?.get(key.slot)
    }

    /// Number of live nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments holding nodes, counting the home segment even when
    /// it is empty
    pub fn segment_count(&self) -> usize {
        1 + self.absorbed.len()
    }

    /// Takes every node out of `other` without moving any of them
    ///
    /// Keys issued by `other` stay valid here. `other` is left empty, with a
    /// fresh segment id, so keys it issued no longer resolve there.
    ///
    /// **Time Complexity**: O(s) where `s` is `other`'s segment count
    pub fn absorb(&mut self, other: &mut Self) {
        let donor = mem::take(other);
        self.len += donor.len;
        if !donor.home.is_empty() {
            self.absorbed.insert(donor.home_id, donor.home);
        }
        self.absorbed.extend(donor.absorbed);
    }
}

/// Panics on a stale key; heap code only indexes with keys it holds links to.
impl<N> Index<NodeKey> for SlotMapStorage<N> {
    type Output = N;

    #[inline]
    fn index(&self, key: NodeKey) -> &N {
        match self.segment(key.segment) {
            Some(segment) => &segment[key.slot],
            None => panic!("node key from a segment this arena does not hold"),
        }
    }
}

impl<N> IndexMut<NodeKey> for SlotMapStorage<N> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut N {
        match self.segment_mut(key.segment) {
            Some(segment) => &mut segment[key.slot],
            None => panic!("node key from a segment this arena does not hold"),
        }
    }
}
