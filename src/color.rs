//! Color and side tags for tree nodes.
//!
//! Sidedness is always derived from key comparison: `Left` means the
//! key is strictly less than the key it is compared against.

use serde::Serialize;

use crate::arena::Key;

/// Node color (red-black discipline)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    /// Freshly inserted nodes start red
    Red = 0,
    /// Root and absent children count as black
    Black = 1,
}

impl Color {
    /// Returns the opposite color
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    #[inline]
    pub const fn is_red(self) -> bool {
        matches!(self, Color::Red)
    }
}

/// Which child slot a node occupies under its parent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    Left,
    Right,
}

impl Dir {
    /// Returns the mirrored direction
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Side a `key` falls on relative to `pivot` (equal keys go right).
    #[inline]
    pub fn of(key: Key, pivot: Key) -> Self {
        if key < pivot {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}
