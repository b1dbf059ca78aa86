//! Red-Black Tree - ordered set of unique integer keys.
//!
//! All nodes live in a [`NodeArena`]; the tree itself only owns the
//! arena and a single root slot. The root slot is reassigned by exactly
//! two events: the first insertion, and a rotation that promotes a node
//! with no parent.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::arena::{ArenaIndex, Key, NodeArena, TreeNode, NULL_INDEX};
use crate::color::{Color, Dir};
use crate::iter::{Iter, MAX_DEPTH};

use arrayvec::ArrayVec;

/// Trees up to this size are fully re-validated after every insert in
/// debug builds.
#[cfg(debug_assertions)]
const DEBUG_VALIDATE_LIMIT: usize = 512;

/// Result of an insertion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertOutcome {
    /// A new node was attached and the tree rebalanced
    Inserted,
    /// The key was already present; the tree is unchanged
    Duplicate,
}

impl InsertOutcome {
    #[inline]
    pub const fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Where a key lives, or would live, in the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A node with this key already exists
    Occupied(ArenaIndex),
    /// The absent child position the key belongs in.
    /// `parent == NULL_INDEX` means the tree is empty.
    Vacant { parent: ArenaIndex, dir: Dir },
}

/// An arena-backed red-black tree.
///
/// Single-owner and single-threaded: callers that share a tree across
/// threads must serialize every operation themselves.
#[derive(Clone)]
pub struct RbTree {
    pub(crate) arena: NodeArena,
    pub(crate) root: ArenaIndex,
}

impl RbTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: NULL_INDEX,
        }
    }

    /// Create a new tree with room for `capacity` keys before reallocating
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            root: NULL_INDEX,
        }
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert `key` into the tree.
    ///
    /// # Algorithm
    /// 1. Descend from the root to the absent child position for `key`
    /// 2. Attach a red node there (or make it the root)
    /// 3. Rebalance upward from the new node
    /// 4. Force the root black
    ///
    /// # Returns
    /// `Duplicate` if the key was already present (tree untouched),
    /// `Inserted` otherwise.
    ///
    /// # Panics
    /// Panics if the arena's 32-bit index space is exhausted.
    pub fn insert(&mut self, key: Key) -> InsertOutcome {
        let (parent, dir) = match self.search_slot(key) {
            Slot::Occupied(_) => {
                trace!(key, "duplicate key ignored");
                return InsertOutcome::Duplicate;
            }
            Slot::Vacant { parent, dir } => (parent, dir),
        };

        let Some(node) = self.arena.alloc(key) else {
            panic!("node arena exhausted after {} keys", self.arena.len());
        };

        if parent == NULL_INDEX {
            self.root = node;
        } else {
            *self.arena.get_mut(parent).child_mut(dir) = node;
            self.arena.get_mut(node).parent = parent;
        }

        self.rebalance(node);
        self.arena.get_mut(self.root).color = Color::Black;

        #[cfg(debug_assertions)]
        if self.len() <= DEBUG_VALIDATE_LIMIT {
            if let Err(violation) = self.validate() {
                panic!("red-black invariant broken after inserting {key}: {violation}");
            }
        }

        InsertOutcome::Inserted
    }

    /// Iteratively descend from the root comparing keys.
    pub(crate) fn search_slot(&self, key: Key) -> Slot {
        let mut parent = NULL_INDEX;
        let mut dir = Dir::Left;
        let mut current = self.root;

        while current != NULL_INDEX {
            let node = self.arena.get(current);
            dir = match key.cmp(&node.key) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => return Slot::Occupied(current),
            };
            parent = current;
            current = node.child(dir);
        }

        Slot::Vacant { parent, dir }
    }

    // ========================================================================
    // Ancestor Lookup
    // ========================================================================

    /// Stored parent of `index`, `None` for the root.
    #[inline]
    pub fn parent_of(&self, index: ArenaIndex) -> Option<ArenaIndex> {
        let parent = self.arena.get(index).parent;
        (parent != NULL_INDEX).then_some(parent)
    }

    /// Find the parent of the node holding `key` by re-traversing from the
    /// root, without consulting stored parent links.
    ///
    /// Nodes are matched by key equality, which identifies them uniquely
    /// only because duplicate keys are never stored.
    ///
    /// # Returns
    /// `None` if `key` is the root's key or is not in the tree.
    pub fn locate_parent(&self, key: Key) -> Option<ArenaIndex> {
        let mut current = self.root;

        while current != NULL_INDEX {
            let node = self.arena.get(current);
            for child in [node.left, node.right] {
                if child != NULL_INDEX && self.arena.get(child).key == key {
                    return Some(current);
                }
            }
            current = node.child(Dir::of(key, node.key));
        }

        None
    }

    /// Sibling of `parent` under `grandparent`, or `NULL_INDEX`.
    ///
    /// The side is decided by comparing keys, not indices.
    pub fn uncle_of(&self, parent: ArenaIndex, grandparent: ArenaIndex) -> ArenaIndex {
        if grandparent == NULL_INDEX {
            return NULL_INDEX;
        }
        let gp = self.arena.get(grandparent);
        let parent_key = self.arena.get(parent).key;

        if gp.left != NULL_INDEX && self.arena.get(gp.left).key == parent_key {
            gp.right
        } else {
            gp.left
        }
    }

    /// Which side of `parent` the node at `index` hangs off.
    #[inline]
    pub(crate) fn side_of(&self, index: ArenaIndex, parent: ArenaIndex) -> Dir {
        Dir::of(self.arena.get(index).key, self.arena.get(parent).key)
    }

    // ========================================================================
    // Read-only Queries
    // ========================================================================

    /// Returns true iff `key` is stored in the tree.
    ///
    /// # Complexity
    /// O(log n)
    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        matches!(self.search_slot(key), Slot::Occupied(_))
    }

    /// Arena index of the node holding `key`.
    #[inline]
    pub fn index_of(&self, key: Key) -> Option<ArenaIndex> {
        match self.search_slot(key) {
            Slot::Occupied(index) => Some(index),
            Slot::Vacant { .. } => None,
        }
    }

    /// Borrow a node by index.
    #[inline]
    pub fn node(&self, index: ArenaIndex) -> &TreeNode {
        self.arena.get(index)
    }

    /// True if `index` is present and red. Absent nodes are black.
    #[inline]
    pub fn is_red(&self, index: ArenaIndex) -> bool {
        self.arena.color_of(index).is_red()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NULL_INDEX
    }

    /// Number of keys stored
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len() as usize
    }

    /// Root key and color
    pub fn root(&self) -> Option<(Key, Color)> {
        (self.root != NULL_INDEX).then(|| {
            let node = self.arena.get(self.root);
            (node.key, node.color)
        })
    }

    #[inline]
    pub fn root_index(&self) -> ArenaIndex {
        self.root
    }

    /// Smallest key
    pub fn min(&self) -> Option<Key> {
        self.extreme(Dir::Left)
    }

    /// Largest key
    pub fn max(&self) -> Option<Key> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<Key> {
        if self.root == NULL_INDEX {
            return None;
        }
        let mut current = self.root;
        loop {
            let next = self.arena.get(current).child(dir);
            if next == NULL_INDEX {
                return Some(self.arena.get(current).key);
            }
            current = next;
        }
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    ///
    /// Explicit-stack depth-first walk; the stack never holds more than
    /// one pending sibling per level.
    pub fn height(&self) -> usize {
        if self.root == NULL_INDEX {
            return 0;
        }
        let mut stack: ArrayVec<(ArenaIndex, usize), { MAX_DEPTH + 1 }> = ArrayVec::new();
        stack.push((self.root, 1));
        let mut height = 0;

        while let Some((index, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.arena.get(index);
            if node.right != NULL_INDEX {
                stack.push((node.right, depth + 1));
            }
            if node.left != NULL_INDEX {
                stack.push((node.left, depth + 1));
            }
        }

        height
    }

    /// Black nodes on the leftmost root-to-leaf path.
    ///
    /// Equal to the black height on every path when the tree is valid;
    /// use [`RbTree::validate`] to check that.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut current = self.root;
        while current != NULL_INDEX {
            let node = self.arena.get(current);
            count += usize::from(node.color == Color::Black);
            current = node.left;
        }
        count
    }

    /// All keys in ascending order
    pub fn in_order_sequence(&self) -> Vec<Key> {
        self.iter().collect()
    }

    /// Ascending iterator over the keys
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.arena, self.root, self.len())
    }

    /// Keys and colors level by level, `max_depth` levels deep.
    ///
    /// Each level lists present nodes left to right; an empty inner
    /// vector is never produced.
    pub fn levels(&self, max_depth: usize) -> Vec<Vec<(Key, Color)>> {
        let mut levels = Vec::new();
        let mut frontier = Vec::new();
        if self.root != NULL_INDEX {
            frontier.push(self.root);
        }

        while !frontier.is_empty() && levels.len() < max_depth {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            let mut level = Vec::with_capacity(frontier.len());
            for &index in &frontier {
                let node = self.arena.get(index);
                level.push((node.key, node.color));
                next.extend([node.left, node.right].into_iter().filter(|&c| c != NULL_INDEX));
            }
            levels.push(level);
            frontier = next;
        }

        levels
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NULL_INDEX;
    }

    /// Pre-fault reserved node storage.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Hash of the tree shape and coloring, for determinism testing.
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.len().hash(&mut hasher);
        for level in self.levels(usize::MAX) {
            level.hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RbTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbTree")
            .field("len", &self.len())
            .field("root", &self.root())
            .field("height", &self.height())
            .finish()
    }
}

impl Extend<Key> for RbTree {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}

impl FromIterator<Key> for RbTree {
    fn from_iter<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        let mut tree = RbTree::new();
        tree.extend(keys);
        tree
    }
}

impl<'a> IntoIterator for &'a RbTree {
    type Item = Key;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = RbTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.root(), None);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert!(tree.in_order_sequence().is_empty());
        assert!(!tree.contains(0));
    }

    #[test]
    fn test_default_is_empty() {
        let mut tree = RbTree::default();
        assert!(tree.is_empty());
        tree.insert(1);
        assert_eq!(tree.root(), Some((1, Color::Black)));
    }

    #[test]
    fn test_first_insert_becomes_black_root() {
        let mut tree = RbTree::new();
        assert_eq!(tree.insert(7), InsertOutcome::Inserted);
        assert_eq!(tree.root(), Some((7, Color::Black)));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.parent_of(tree.root_index()), None);
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut tree = RbTree::new();
        tree.insert(1);
        tree.insert(2);
        let before = tree.state_hash();

        assert_eq!(tree.insert(2), InsertOutcome::Duplicate);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.state_hash(), before);
    }

    #[test]
    fn test_contains() {
        let tree: RbTree = [5_i64, -3, 12, 0, 8].into_iter().collect();
        for key in [5, -3, 12, 0, 8] {
            assert!(tree.contains(key), "missing {key}");
        }
        for key in [-4, 1, 7, 13] {
            assert!(!tree.contains(key), "phantom {key}");
        }
    }

    #[test]
    fn test_min_max() {
        let tree: RbTree = [40_i64, 10, 90, -7, 55].into_iter().collect();
        assert_eq!(tree.min(), Some(-7));
        assert_eq!(tree.max(), Some(90));
    }

    #[test]
    fn test_locate_parent_agrees_with_stored_links() {
        let tree: RbTree = (0..64_i64).map(|k| (k * 37) % 101).collect();

        for key in tree.iter() {
            let index = tree.index_of(key).unwrap();
            assert_eq!(tree.locate_parent(key), tree.parent_of(index), "key {key}");
        }
        assert_eq!(tree.locate_parent(1_000), None);
    }

    #[test]
    fn test_uncle_of() {
        // After 0, 1, 6: root 1 with children 0 and 6
        let tree: RbTree = [0_i64, 1, 6].into_iter().collect();
        let root = tree.root_index();
        let left = tree.index_of(0).unwrap();
        let right = tree.index_of(6).unwrap();

        assert_eq!(tree.uncle_of(left, root), right);
        assert_eq!(tree.uncle_of(right, root), left);
        assert_eq!(tree.uncle_of(left, NULL_INDEX), NULL_INDEX);
    }

    #[test]
    fn test_levels() {
        let tree: RbTree = [0_i64, 1, 6].into_iter().collect();
        let levels = tree.levels(8);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0], vec![(1, Color::Black)]);
        assert_eq!(levels[1], vec![(0, Color::Red), (6, Color::Red)]);
        assert_eq!(tree.levels(1).len(), 1);
    }

    #[test]
    fn test_black_height_matches_validate() {
        let tree: RbTree = (0..1000_i64).map(|k| (k * 7919) % 1000).collect();
        assert_eq!(Ok(tree.black_height()), tree.validate());
        assert_eq!(RbTree::new().black_height(), 0);
    }

    #[test]
    fn test_clear() {
        let mut tree: RbTree = (0..10_i64).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        tree.insert(3);
        assert_eq!(tree.root(), Some((3, Color::Black)));
    }

    #[test]
    fn test_is_red_absent() {
        let tree: RbTree = [1_i64, 2].into_iter().collect();
        assert!(!tree.is_red(NULL_INDEX));
        assert!(!tree.is_red(tree.root_index()));
        assert!(tree.is_red(tree.index_of(2).unwrap()));
    }
}
