use std::env;

use crate::rules::{GameRules, ShipRules};

pub const BOARD_SIDE: usize = 10;
pub const SHOTS_PER_TURN: usize = 1;
pub const PLAY_TIMEOUT_MS: u64 = 60_000;
pub const LAYOUT_TIMEOUT_MS: u64 = 60_000;

/// Classic fleet: one ship each of sizes 5, 4, 3, 2 and 1.
pub const CLASSIC_FLEET: [(usize, usize); 5] = [(5, 1), (4, 1), (3, 1), (2, 1), (1, 1)];

/// Rules used for every game created by the lobby unless overridden.
pub fn default_rules() -> GameRules {
    GameRules {
        shots_per_turn: SHOTS_PER_TURN,
        board_side: BOARD_SIDE,
        play_timeout: PLAY_TIMEOUT_MS,
        layout_definition_timeout: LAYOUT_TIMEOUT_MS,
        ship_rules: ShipRules::new("Classic", CLASSIC_FLEET),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("configured rules are not playable: {0}")]
    Unplayable(String),
}

fn override_from_env<T: std::str::FromStr>(name: &'static str, field: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = env::var(name) {
        *field = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })?;
    }
    Ok(())
}

/// Default rules with individual fields overridden by `BATTLESHIP_SHOTS_PER_TURN`,
/// `BATTLESHIP_BOARD_SIDE`, `BATTLESHIP_PLAY_TIMEOUT_MS` and
/// `BATTLESHIP_LAYOUT_TIMEOUT_MS`.
pub fn rules_from_env() -> Result<GameRules, ConfigError> {
    let mut rules = default_rules();
    override_from_env("BATTLESHIP_SHOTS_PER_TURN", &mut rules.shots_per_turn)?;
    override_from_env("BATTLESHIP_BOARD_SIDE", &mut rules.board_side)?;
    override_from_env("BATTLESHIP_PLAY_TIMEOUT_MS", &mut rules.play_timeout)?;
    override_from_env("BATTLESHIP_LAYOUT_TIMEOUT_MS", &mut rules.layout_definition_timeout)?;
    rules
        .validate()
        .map_err(|e| ConfigError::Unplayable(e.to_string()))?;
    Ok(rules)
}
