mod board;
mod clock;
mod common;
mod config;
mod error;
mod game;
pub mod lobby;
mod logging;
mod player;
mod player_ai;
mod rules;
pub mod runner;
pub mod service;
mod ship;
mod stats;
pub mod store;

pub use board::*;
pub use clock::*;
pub use common::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use lobby::{JoinOutcome, Lobby};
pub use logging::{init_logging, level_from_env, LOG_ENV};
pub use player::*;
pub use player_ai::*;
pub use rules::*;
pub use runner::{run_match, MatchReport, Seat};
pub use ship::*;
pub use stats::*;
pub use store::in_memory::MemoryStore;
pub use store::{GameStore, LobbyEntry, LobbyId, LobbyStore, UnitOfWork};
pub mod prelude;
