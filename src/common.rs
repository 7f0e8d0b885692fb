//! Common types for Battleship: board errors and shot results.

use crate::ship::Square;

/// Result of a single shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotResult {
    /// Shot landed on a ship part.
    Hit,
    /// Shot landed on water.
    Miss,
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Layout string is not a square grid or uses an unknown character.
    #[error("invalid board layout: {0}")]
    InvalidFormat(String),
    /// Square lies outside the board.
    #[error("square {0} is outside the board")]
    OutOfBounds(Square),
    /// Ship would leave the board or has no length.
    #[error("ship at {origin} with size {size} does not fit on the board")]
    InvalidShip { origin: Square, size: usize },
    /// Ship placement overlaps a square that is not water.
    #[error("ship placement overlaps another ship at {0}")]
    Overlap(Square),
    /// Square was already resolved by an earlier shot.
    #[error("square {0} was already shot")]
    AlreadyShot(Square),
}
