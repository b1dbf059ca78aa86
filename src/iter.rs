//! In-order iteration with a fixed-size explicit stack.

use std::iter::FusedIterator;

use arrayvec::ArrayVec;

use crate::arena::{ArenaIndex, Key, NodeArena, NULL_INDEX};

/// Upper bound on the height of a valid tree.
///
/// With at most `2^32 - 1` nodes the red-black bound `2·log2(n+1)`
/// never exceeds 64.
pub const MAX_DEPTH: usize = 2 * u32::BITS as usize;

/// Ascending iterator over the keys of an [`RbTree`](crate::RbTree).
///
/// Holds the left spine of the unvisited part of the tree, so the stack
/// never grows past the tree height.
pub struct Iter<'a> {
    arena: &'a NodeArena,
    stack: ArrayVec<ArenaIndex, MAX_DEPTH>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(arena: &'a NodeArena, root: ArenaIndex, len: usize) -> Self {
        let mut iter = Self {
            arena,
            stack: ArrayVec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut index: ArenaIndex) {
        while index != NULL_INDEX {
            self.stack.push(index);
            index = self.arena.get(index).left;
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let index = self.stack.pop()?;
        let node = self.arena.get(index);
        self.push_left_spine(node.right);
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
