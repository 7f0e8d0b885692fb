//! Errors surfaced to callers of the game, lobby and service operations.

use crate::common::BoardError;
use crate::game::{GameId, GameState};
use crate::store::LobbyId;

/// Failures of a game or lobby operation. None of them are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game {0} not found")]
    GameNotFound(GameId),
    #[error("lobby entry {0} not found")]
    LobbyNotFound(LobbyId),
    /// Caller is not a participant, it is not their turn, or the lobby entry is not theirs.
    #[error("forbidden: {0}")]
    ForbiddenAccess(String),
    #[error("operation requires state {expected:?} but the game is {actual:?}")]
    WrongState {
        expected: GameState,
        actual: GameState,
    },
    #[error("ships were already placed for this player")]
    AlreadyPlaced,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The phase timed out; the cancelled game has already been persisted.
    #[error("timeout exceeded: {0}")]
    TimeoutExceeded(String),
    /// A restored snapshot breaks a game invariant.
    #[error("invalid game snapshot: {0}")]
    InvalidSnapshot(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        GameError::InvalidParameter(err.to_string())
    }
}

/// Failures of a persistence collaborator. Any of them aborts the whole transition.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored game changed since the snapshot was loaded.
    #[error("game {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict { id: GameId, expected: u64, found: u64 },
    #[error("game {0} does not exist in the store")]
    Missing(GameId),
    #[error("snapshot encoding failed: {0}")]
    Codec(#[from] bincode::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
