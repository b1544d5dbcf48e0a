//! Cell capability flags.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};
use taxis_common::Axis;

/// A bitmask of per-cell capabilities.
///
/// The placer interprets only [`X_MOVABLE`](Self::X_MOVABLE) and
/// [`Y_MOVABLE`](Self::Y_MOVABLE); hosts may stash additional bits in the
/// upper part of the mask and they are carried through untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellFlags(u8);

impl CellFlags {
    /// No capabilities; the cell is fully fixed.
    pub const NONE: CellFlags = CellFlags(0);
    /// The cell may move along the x axis.
    pub const X_MOVABLE: CellFlags = CellFlags(1 << 0);
    /// The cell may move along the y axis.
    pub const Y_MOVABLE: CellFlags = CellFlags(1 << 1);
    /// The cell may move along both axes.
    pub const MOVABLE: CellFlags = CellFlags(0b11);

    /// Creates a flag set from a raw bitmask.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bitmask.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub fn intersects(self, other: CellFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the cell may move along `axis`.
    pub fn movable(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.contains(Self::X_MOVABLE),
            Axis::Y => self.contains(Self::Y_MOVABLE),
        }
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: Self) -> Self {
        CellFlags(self.0 | rhs.0)
    }
}

impl BitAnd for CellFlags {
    type Output = CellFlags;

    fn bitand(self, rhs: Self) -> Self {
        CellFlags(self.0 & rhs.0)
    }
}
