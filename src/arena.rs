//! Node Arena - append-only slab of tree nodes addressed by 32-bit indices.
//!
//! Nodes are created only by insertion and never freed individually,
//! so the arena is a plain growable vector with no free list. Child and
//! parent relations are stored as indices, which keeps ownership strictly
//! with the arena and makes cycles impossible to express through borrows.

use std::fmt;

use crate::color::{Color, Dir};

/// Sentinel value representing an absent node (like nullptr)
pub const NULL_INDEX: u32 = u32::MAX;

/// Type alias for arena indices - our "compressed pointers"
pub type ArenaIndex = u32;

/// Key type stored in the tree
pub type Key = i64;

/// A single node of the tree - 24 bytes.
///
/// # Memory Layout
///
/// | Field      | Type  | Offset | Size |
/// |------------|-------|--------|------|
/// | key        | i64   | 0      | 8    |
/// | parent     | u32   | 8      | 4    |
/// | left       | u32   | 12     | 4    |
/// | right      | u32   | 16     | 4    |
/// | color      | u8    | 20     | 1    |
/// | (padding)  | -     | 21     | 3    |
/// | **Total**  |       |        | 24   |
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub key: Key,

    /// Index of the parent node, `NULL_INDEX` for the root
    pub parent: ArenaIndex,

    /// Index of the left child (keys strictly less)
    pub left: ArenaIndex,

    /// Index of the right child (keys strictly greater)
    pub right: ArenaIndex,

    pub color: Color,
}

const _: () = assert!(
    std::mem::size_of::<TreeNode>() == 24,
    "TreeNode must stay 24 bytes"
);

impl TreeNode {
    /// Create a detached red node
    #[inline]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            parent: NULL_INDEX,
            left: NULL_INDEX,
            right: NULL_INDEX,
            color: Color::Red,
        }
    }

    /// Child index on the given side
    #[inline]
    pub const fn child(&self, dir: Dir) -> ArenaIndex {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    /// Mutable child slot on the given side
    #[inline]
    pub fn child_mut(&mut self, dir: Dir) -> &mut ArenaIndex {
        match dir {
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }

    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.left == NULL_INDEX && self.right == NULL_INDEX
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("key", &self.key)
            .field("color", &self.color)
            .field("parent", &self.parent)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

/// Append-only node storage.
///
/// Indices handed out by [`NodeArena::alloc`] stay valid until
/// [`NodeArena::clear`] is called.
#[derive(Clone, Default)]
pub struct NodeArena {
    nodes: Vec<TreeNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create an arena with room for `capacity` nodes before reallocating.
    ///
    /// # Panics
    /// Panics if capacity is not below `NULL_INDEX` (reserved as the sentinel)
    pub fn with_capacity(capacity: u32) -> Self {
        assert!(capacity < NULL_INDEX, "Capacity must be less than NULL_INDEX");
        Self {
            nodes: Vec::with_capacity(capacity as usize),
        }
    }

    /// Allocate a new red node holding `key`.
    ///
    /// Returns `None` if the 32-bit index space is exhausted.
    ///
    /// # Complexity
    /// Amortized O(1)
    #[inline]
    pub fn alloc(&mut self, key: Key) -> Option<ArenaIndex> {
        let index = u32::try_from(self.nodes.len()).ok()?;
        if index == NULL_INDEX {
            return None;
        }
        self.nodes.push(TreeNode::new(key));
        Some(index)
    }

    /// # Complexity
    /// O(1) - direct array access
    #[inline]
    pub fn get(&self, index: ArenaIndex) -> &TreeNode {
        debug_assert!(index != NULL_INDEX, "Dereferenced NULL_INDEX");
        &self.nodes[index as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, index: ArenaIndex) -> &mut TreeNode {
        debug_assert!(index != NULL_INDEX, "Dereferenced NULL_INDEX");
        &mut self.nodes[index as usize]
    }

    /// Color of `index`, treating an absent node as black.
    #[inline]
    pub fn color_of(&self, index: ArenaIndex) -> Color {
        if index == NULL_INDEX {
            Color::Black
        } else {
            self.nodes[index as usize].color
        }
    }

    /// Returns the number of allocated nodes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.nodes.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes that fit before the next reallocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drop every node. All previously issued indices become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Pre-fault the reserved-but-unused part of the arena.
    ///
    /// Writes a placeholder into every spare slot and truncates back,
    /// forcing the OS to back the allocation with physical pages before
    /// the first insertion touches them.
    pub fn warm_up(&mut self) {
        let len = self.nodes.len();
        let spare = self.nodes.capacity() - len;
        self.nodes.extend(std::iter::repeat(TreeNode::new(0)).take(spare));
        std::hint::black_box(&self.nodes);
        self.nodes.truncate(len);
    }
}

impl fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeArena")
            .field("len", &self.nodes.len())
            .field("capacity", &self.nodes.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_node_size() {
        assert_eq!(std::mem::size_of::<TreeNode>(), 24);
    }

    #[test]
    fn test_arena_creation() {
        let arena = NodeArena::with_capacity(100);
        assert!(arena.capacity() >= 100);
        assert_eq!(arena.len(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_arena_alloc_sequential_indices() {
        let mut arena = NodeArena::new();

        let idx0 = arena.alloc(10).expect("Should allocate");
        let idx1 = arena.alloc(20).expect("Should allocate");
        let idx2 = arena.alloc(30).expect("Should allocate");

        assert_eq!((idx0, idx1, idx2), (0, 1, 2));
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(idx1).key, 20);
    }

    #[test]
    fn test_new_node_is_detached_red() {
        let node = TreeNode::new(42);
        assert_eq!(node.key, 42);
        assert_eq!(node.color, Color::Red);
        assert_eq!(node.parent, NULL_INDEX);
        assert!(node.is_leaf());
    }

    #[test]
    fn test_child_slots() {
        let mut node = TreeNode::new(5);
        *node.child_mut(Dir::Left) = 7;
        *node.child_mut(Dir::Right) = 9;
        assert_eq!(node.child(Dir::Left), 7);
        assert_eq!(node.child(Dir::Right), 9);
        assert!(!node.is_leaf());
    }

    #[test]
    fn test_color_of_absent_is_black() {
        let mut arena = NodeArena::new();
        let idx = arena.alloc(1).unwrap();
        assert_eq!(arena.color_of(idx), Color::Red);
        assert_eq!(arena.color_of(NULL_INDEX), Color::Black);
    }

    #[test]
    fn test_arena_clear() {
        let mut arena = NodeArena::new();
        arena.alloc(1).unwrap();
        arena.alloc(2).unwrap();
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.alloc(3), Some(0));
    }

    #[test]
    fn test_arena_warm_up() {
        let mut arena = NodeArena::with_capacity(1000);
        arena.alloc(1).unwrap();
        arena.warm_up(); // Should not panic
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(0).key, 1);
    }
}
