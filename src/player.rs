use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::BoardError;
use crate::rules::GameRules;
use crate::ship::{ShipInfo, Square};

/// Interface implemented by automated players.
pub trait Player: Send {
    /// Choose a fleet satisfying `rules`.
    fn choose_fleet(&mut self, rng: &mut SmallRng, rules: &GameRules) -> Result<Vec<ShipInfo>, BoardError>;

    /// Choose `count` distinct squares to fire at, given the opponent's board as
    /// this player may see it.
    fn select_shots(&mut self, rng: &mut SmallRng, target: &Board, count: usize) -> Vec<Square>;
}
