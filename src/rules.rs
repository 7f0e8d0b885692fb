//! Game configuration: board size, shots per turn, timeouts and fleet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::GameError;

/// Milliseconds.
pub type TimeoutMillis = u64;

/// Required fleet: ship size → number of ships of that size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipRules {
    pub name: String,
    pub fleet_composition: BTreeMap<usize, usize>,
}

impl ShipRules {
    pub fn new(name: impl Into<String>, fleet_composition: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            name: name.into(),
            fleet_composition: fleet_composition.into_iter().collect(),
        }
    }

    /// Total number of ship squares in the fleet, `None` if it overflows `usize`.
    pub fn total_squares(&self) -> Option<usize> {
        self.fleet_composition
            .iter()
            .try_fold(0usize, |total, (size, count)| total.checked_add(size.checked_mul(*count)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    pub shots_per_turn: usize,
    pub board_side: usize,
    pub play_timeout: TimeoutMillis,
    pub layout_definition_timeout: TimeoutMillis,
    pub ship_rules: ShipRules,
}

impl GameRules {
    /// Check that `board` holds exactly the required fleet: same sizes, same
    /// counts, nothing missing and nothing extra.
    pub fn validate_fleet(&self, board: &Board) -> Result<(), GameError> {
        let actual = board.fleet_composition();
        if actual == self.ship_rules.fleet_composition {
            return Ok(());
        }
        let required = self
            .ship_rules
            .fleet_composition
            .iter()
            .map(|(size, count)| format!("{count} ship(s) of {size} squares"))
            .collect::<Vec<_>>()
            .join(", ");
        Err(GameError::InvalidParameter(format!(
            "fleet must be: {required}"
        )))
    }

    /// Reject rules no game could be played under.
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |msg: &str| Err(GameError::InvalidParameter(msg.to_string()));
        if self.board_side == 0 {
            return invalid("board side must be positive");
        }
        if self.shots_per_turn == 0 {
            return invalid("at least one shot per turn is required");
        }
        if self.ship_rules.fleet_composition.is_empty() {
            return invalid("fleet must contain at least one ship");
        }
        // Boards never report zero counts, so such an entry could never be matched.
        if self.ship_rules.fleet_composition.values().any(|&c| c == 0) {
            return invalid("every ship size needs a positive count");
        }
        if self
            .ship_rules
            .fleet_composition
            .keys()
            .any(|&size| size == 0 || size > self.board_side)
        {
            return invalid("every ship must fit on the board");
        }
        let Some(area) = self.board_side.checked_mul(self.board_side) else {
            return invalid("board side is too large");
        };
        match self.ship_rules.total_squares() {
            Some(total) if total <= area => {}
            _ => return invalid("fleet does not fit on the board"),
        }
        Ok(())
    }
}
