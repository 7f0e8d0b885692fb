//! Commonly used types and utilities for ease of import.

pub use crate::{
    default_rules, service, Board, Fleet, Game, GameError, GameRules, GameState, JoinOutcome, Lobby,
    MemoryStore, Orientation, ShipInfo, Square, UnitOfWork,
};
