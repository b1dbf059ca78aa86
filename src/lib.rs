//! # rb-index
//!
//! An arena-backed red-black tree: an in-memory ordered set of unique
//! integer keys with logarithmic height.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One owner mutates the tree (no internal locking)
//! - **Arena Storage**: Nodes live in one vector, linked by 32-bit indices
//! - **Parent Links**: Stored per node and kept in step with every rotation
//! - **Bounded Stacks**: Traversals never recurse; stacks are sized by height
//!
//! ## Insertion
//!
//! ```text
//! insert --> search to leaf --> attach red leaf --> rebalance upward --> blacken root
//!                                                        |
//!                                             [recolor | rotate | rotate x2]
//! ```

pub mod arena;
pub mod color;
pub mod tree;
pub mod iter;
pub mod rotation;
pub mod rebalance;
pub mod validate;
pub mod driver;
pub mod logging;

// Re-exports for convenience
pub use arena::{ArenaIndex, Key, NodeArena, TreeNode, NULL_INDEX};
pub use color::{Color, Dir};
pub use tree::{InsertOutcome, RbTree};
pub use iter::Iter;
pub use validate::InvariantViolation;
pub use driver::{DriverConfig, DriverError, OutputFormat, StepRecord};
