//! Rotation primitives.
//!
//! A rotation changes which node roots a subtree while leaving the
//! in-order key sequence untouched, then re-attaches the new subtree
//! root to the old root's parent (or to the tree root slot).

use tracing::debug;

use crate::arena::{ArenaIndex, NULL_INDEX};
use crate::color::Dir;
use crate::tree::RbTree;

impl RbTree {
    /// Rotate left at `h`, promoting its right child.
    ///
    /// # Returns
    /// The new subtree root, or `h` unchanged if it has no right child.
    #[inline]
    pub(crate) fn rotate_left(&mut self, h: ArenaIndex) -> ArenaIndex {
        self.rotate(h, Dir::Left)
    }

    /// Rotate right at `h`, promoting its left child.
    ///
    /// # Returns
    /// The new subtree root, or `h` unchanged if it has no left child.
    #[inline]
    pub(crate) fn rotate_right(&mut self, h: ArenaIndex) -> ArenaIndex {
        self.rotate(h, Dir::Right)
    }

    /// Rotate at `h` in direction `dir`.
    ///
    /// `h` moves down on the `dir` side; its child on the opposite side
    /// (`c`) moves up. `c`'s inner child, the one on the `dir` side, is
    /// handed over to `h`:
    ///
    /// ```text
    ///        h                 c
    ///       / \               / \
    ///      a   c     =>      h   z
    ///         / \           / \
    ///        y   z         a   y
    /// ```
    ///
    /// The side `c` is re-attached on under the old parent of `h` is
    /// decided by comparing keys against that parent.
    fn rotate(&mut self, h: ArenaIndex, dir: Dir) -> ArenaIndex {
        let promoted_side = dir.opposite();
        let child = self.arena.get(h).child(promoted_side);
        if child == NULL_INDEX {
            return h;
        }

        let parent = self.arena.get(h).parent;
        let inner = self.arena.get(child).child(dir);

        // Hand the inner grandchild to h
        *self.arena.get_mut(h).child_mut(promoted_side) = inner;
        if inner != NULL_INDEX {
            self.arena.get_mut(inner).parent = h;
        }

        // h goes under child
        *self.arena.get_mut(child).child_mut(dir) = h;
        self.arena.get_mut(h).parent = child;

        // child takes h's place
        self.arena.get_mut(child).parent = parent;
        if parent == NULL_INDEX {
            debug!(key = self.arena.get(child).key, "rotation promoted new root");
            self.root = child;
        } else {
            let side = self.side_of(child, parent);
            *self.arena.get_mut(parent).child_mut(side) = child;
        }

        child
    }
}
