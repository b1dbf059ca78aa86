//! Rebalancer - the rotation/recolor case machine run after insertion.
//!
//! Walks from the new node toward the root:
//! 1. Node is root, or parent is black: done
//! 2. Parent is red but is the root: done (caller blackens the root)
//! 3. Uncle is red: flip grandparent, parent and uncle, continue at grandparent
//! 4. Uncle is black, triangle shape: straighten through the parent, then
//!    rotate through the grandparent
//! 5. Uncle is black, line shape: rotate through the grandparent
//!
//! Cases 4 and 5 are terminal. Only case 3 moves the walk upward.

use tracing::trace;

use crate::arena::{ArenaIndex, NULL_INDEX};
use crate::color::{Color, Dir};
use crate::tree::RbTree;

type Rotation = fn(&mut RbTree, ArenaIndex) -> ArenaIndex;

impl RbTree {
    /// Restore the red-black invariants after attaching the red `node`.
    ///
    /// The root may be left red; the caller blackens it unconditionally.
    pub(crate) fn rebalance(&mut self, mut node: ArenaIndex) {
        loop {
            let parent = self.arena.get(node).parent;
            if parent == NULL_INDEX || !self.is_red(parent) {
                return;
            }

            let grandparent = self.arena.get(parent).parent;
            if grandparent == NULL_INDEX {
                return;
            }

            let uncle = self.uncle_of(parent, grandparent);
            if self.is_red(uncle) {
                trace!(
                    key = self.arena.get(node).key,
                    grandparent = self.arena.get(grandparent).key,
                    "uncle red: recolor and continue upward"
                );
                self.flip_colors(grandparent);
                node = grandparent;
                continue;
            }

            let parent_side = self.side_of(parent, grandparent);
            let node_side = self.side_of(node, parent);

            // Straighten toward the parent's side, then lift from the other
            let (straighten, lift): (Rotation, Rotation) = match parent_side {
                Dir::Left => (Self::rotate_left, Self::rotate_right),
                Dir::Right => (Self::rotate_right, Self::rotate_left),
            };

            if node_side != parent_side {
                trace!(key = self.arena.get(node).key, ?parent_side, "triangle: double rotation");
                straighten(self, parent);
                self.arena.get_mut(node).color = Color::Black;
                self.arena.get_mut(grandparent).color = Color::Red;
                lift(self, grandparent);
            } else {
                trace!(key = self.arena.get(node).key, ?parent_side, "line: single rotation");
                lift(self, grandparent);
                self.arena.get_mut(parent).color = Color::Black;
                self.arena.get_mut(grandparent).color = Color::Red;
            }
            return;
        }
    }

    /// Toggle the color of `h` and of each of its present children.
    pub(crate) fn flip_colors(&mut self, h: ArenaIndex) {
        if h == NULL_INDEX {
            return;
        }
        let node = self.arena.get_mut(h);
        node.color = node.color.flip();
        let (left, right) = (node.left, node.right);

        for child in [left, right] {
            if child != NULL_INDEX {
                let child = self.arena.get_mut(child);
                child.color = child.color.flip();
            }
        }
    }
}
