use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::{Board, SquareType};
use crate::common::BoardError;
use crate::player::Player;
use crate::rules::GameRules;
use crate::ship::{ShipInfo, Square};

/// Bot that fires next to known hits when it can and at random otherwise.
/// It never fires at a square that was already resolved.
pub struct RandomPlayer;

impl RandomPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomPlayer {
    fn choose_fleet(&mut self, rng: &mut SmallRng, rules: &GameRules) -> Result<Vec<ShipInfo>, BoardError> {
        Board::random_fleet(rng, rules)
    }

    fn select_shots(&mut self, rng: &mut SmallRng, target: &Board, count: usize) -> Vec<Square> {
        let mut open: Vec<Square> = target.unresolved_squares().collect();
        // Squares next to a hit go to the front.
        let (mut near_hits, mut rest): (Vec<_>, Vec<_>) = open.drain(..).partition(|&sq| {
            target
                .neighbours(sq)
                .any(|n| matches!(target.get(n), Ok(SquareType::Hit)))
        });

        let mut shots = Vec::with_capacity(count);
        for pool in [&mut near_hits, &mut rest] {
            while shots.len() < count && !pool.is_empty() {
                let i = rng.random_range(0..pool.len());
                shots.push(pool.swap_remove(i));
            }
        }
        shots
    }
}
