//! Squares, orientations and ship placement instructions.

use core::fmt;
use serde::{Deserialize, Serialize};

/// A position on the grid, addressed by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: usize,
    pub column: usize,
}

impl Square {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns `true` when both coordinates fall inside a `side`×`side` grid.
    pub fn is_within(&self, side: usize) -> bool {
        self.row < side && self.column < side
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Where to put a ship: its origin square, its length and which way it extends.
///
/// This is only an instruction. Once applied, a board keeps ship parts and no
/// longer knows which squares belonged to which ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipInfo {
    pub origin: Square,
    pub size: usize,
    pub orientation: Orientation,
}

impl ShipInfo {
    pub const fn new(origin: Square, size: usize, orientation: Orientation) -> Self {
        Self {
            origin,
            size,
            orientation,
        }
    }

    /// Squares covered by the ship: the origin plus `size - 1` steps along the
    /// orientation. Steps that would overflow `usize` are skipped, which can only
    /// happen for squares that are out of any board anyway.
    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        (0..self.size).filter_map(move |i| match self.orientation {
            Orientation::Horizontal => self
                .origin
                .column
                .checked_add(i)
                .map(|c| Square::new(self.origin.row, c)),
            Orientation::Vertical => self
                .origin
                .row
                .checked_add(i)
                .map(|r| Square::new(r, self.origin.column)),
        })
    }

    /// Returns `true` if every square of the ship lies inside a `side`×`side` grid.
    pub fn fits(&self, side: usize) -> bool {
        // The size bound comes first so `squares()` never walks more than `side` steps.
        self.size > 0
            && self.size <= side
            && self.squares().count() == self.size
            && self.squares().all(|sq| sq.is_within(side))
    }
}
