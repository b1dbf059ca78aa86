//! Invariant checker.
//!
//! Walks the whole tree with an explicit heap stack, so it works on any
//! shape, including a corrupted one that is far deeper than a valid
//! red-black tree could be.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::arena::{ArenaIndex, Key, NULL_INDEX};
use crate::color::Color;
use crate::tree::RbTree;

/// A broken structural invariant.
///
/// Any of these after a completed insertion means the rebalancer has a
/// bug; none of them is a recoverable condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root {key} is red")]
    RedRoot { key: Key },

    #[error("key {key} violates search order (bounds {lower:?}..{upper:?})")]
    OutOfOrder {
        key: Key,
        lower: Option<Key>,
        upper: Option<Key>,
    },

    #[error("key {key} is stored more than once")]
    DuplicateKey { key: Key },

    #[error("red node {parent} has red child {child}")]
    RedRedEdge { parent: Key, child: Key },

    #[error("black height below {key} is {found}, expected {expected}")]
    BlackHeightMismatch { key: Key, expected: usize, found: usize },

    #[error("node {key} has a stale parent link")]
    BrokenParentLink { key: Key },

    #[error("{reachable} nodes reachable from the root but {stored} stored")]
    LengthMismatch { reachable: usize, stored: usize },
}

/// One pending node in the validation walk
struct Frame {
    index: ArenaIndex,
    parent: ArenaIndex,
    lower: Option<Key>,
    upper: Option<Key>,
    /// Black nodes strictly above `index`
    blacks_above: usize,
}

impl RbTree {
    /// Check every red-black and bookkeeping invariant.
    ///
    /// # Returns
    /// The black height of the tree (black nodes on any root-to-leaf
    /// path), or the first violation found.
    ///
    /// Structural checks run first. Stored parent links are then
    /// cross-checked with a top-down re-traversal by key, so a duplicated
    /// key is reported as [`InvariantViolation::DuplicateKey`].
    ///
    /// # Complexity
    /// O(n log n).
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        if self.root == NULL_INDEX {
            return match self.len() {
                0 => Ok(0),
                stored => Err(InvariantViolation::LengthMismatch { reachable: 0, stored }),
            };
        }

        let root = self.arena.get(self.root);
        if root.color == Color::Red {
            return Err(InvariantViolation::RedRoot { key: root.key });
        }

        let mut seen = FxHashSet::default();
        let mut visited = Vec::with_capacity(self.len());
        let mut black_height: Option<usize> = None;
        let mut stack = vec![Frame {
            index: self.root,
            parent: NULL_INDEX,
            lower: None,
            upper: None,
            blacks_above: 0,
        }];

        while let Some(frame) = stack.pop() {
            let node = self.arena.get(frame.index);
            let key = node.key;

            if !seen.insert(key) {
                return Err(InvariantViolation::DuplicateKey { key });
            }
            if frame.lower.is_some_and(|lo| key <= lo) || frame.upper.is_some_and(|hi| key >= hi) {
                return Err(InvariantViolation::OutOfOrder {
                    key,
                    lower: frame.lower,
                    upper: frame.upper,
                });
            }
            if node.parent != frame.parent {
                return Err(InvariantViolation::BrokenParentLink { key });
            }
            visited.push((key, frame.parent));

            let blacks = frame.blacks_above + usize::from(node.color == Color::Black);

            for (child, lower, upper) in [
                (node.left, frame.lower, Some(key)),
                (node.right, Some(key), frame.upper),
            ] {
                if child == NULL_INDEX {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantViolation::BlackHeightMismatch {
                                key,
                                expected,
                                found: blacks,
                            });
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                let child_node = self.arena.get(child);
                if node.color == Color::Red && child_node.color == Color::Red {
                    return Err(InvariantViolation::RedRedEdge {
                        parent: key,
                        child: child_node.key,
                    });
                }
                stack.push(Frame {
                    index: child,
                    parent: frame.index,
                    lower,
                    upper,
                    blacks_above: blacks,
                });
            }
        }

        if seen.len() != self.len() {
            return Err(InvariantViolation::LengthMismatch {
                reachable: seen.len(),
                stored: self.len(),
            });
        }

        // Key lookups are only meaningful once keys are known to be unique
        for (key, parent) in visited {
            if self.locate_parent(key).unwrap_or(NULL_INDEX) != parent {
                return Err(InvariantViolation::BrokenParentLink { key });
            }
        }

        Ok(black_height.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_is_valid() {
        assert_eq!(RbTree::new().validate(), Ok(0));
    }

    #[test]
    fn test_valid_tree_black_height() {
        let tree: RbTree = [0_i64, 1, 6, 3, 2, 4].into_iter().collect();
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn test_detects_red_root() {
        let mut tree: RbTree = [5_i64].into_iter().collect();
        let root = tree.root;
        tree.arena.get_mut(root).color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot { key: 5 }));
    }

    #[test]
    fn test_detects_red_red_edge() {
        let mut tree: RbTree = [2_i64, 1, 3, 4].into_iter().collect();
        let three = tree.index_of(3).unwrap();
        tree.arena.get_mut(three).color = Color::Red;
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::RedRedEdge { parent: 3, child: 4 })
                | Err(InvariantViolation::BlackHeightMismatch { .. })
        ));
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let mut tree: RbTree = [2_i64, 1, 3].into_iter().collect();
        let one = tree.index_of(1).unwrap();
        tree.arena.get_mut(one).color = Color::Black;
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch { .. })
        ));
    }

    #[test]
    fn test_detects_out_of_order() {
        let mut tree: RbTree = [2_i64, 1, 3].into_iter().collect();
        let one = tree.index_of(1).unwrap();
        tree.arena.get_mut(one).key = 9;
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::OutOfOrder { key: 9, .. })
        ));
    }

    #[test]
    fn test_detects_duplicate_key() {
        let mut tree: RbTree = [2_i64, 1, 3].into_iter().collect();
        let one = tree.index_of(1).unwrap();
        tree.arena.get_mut(one).key = 2;
        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::DuplicateKey { key: 2 })
        ));
    }

    #[test]
    fn test_duplicate_of_inner_key_reported_before_links() {
        let mut tree: RbTree = [2_i64, 1, 3, 4].into_iter().collect();
        let four = tree.index_of(4).unwrap();
        tree.arena.get_mut(four).key = 3;
        assert_eq!(tree.validate(), Err(InvariantViolation::DuplicateKey { key: 3 }));
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut tree: RbTree = [2_i64, 1, 3].into_iter().collect();
        let one = tree.index_of(1).unwrap();
        let three = tree.index_of(3).unwrap();
        tree.arena.get_mut(one).parent = three;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BrokenParentLink { key: 1 })
        );
    }

    #[test]
    fn test_detects_unreachable_nodes() {
        let mut tree: RbTree = [2_i64, 1, 3].into_iter().collect();
        let root = tree.root;
        tree.arena.get_mut(root).right = NULL_INDEX;
        // 1 is red, so dropping 3 keeps black heights equal
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LengthMismatch { reachable: 2, stored: 3 })
        );
    }

    #[test]
    fn test_violation_messages() {
        let err = InvariantViolation::RedRedEdge { parent: 3, child: 4 };
        assert_eq!(err.to_string(), "red node 3 has red child 4");
    }
}
