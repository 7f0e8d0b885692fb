//! The game aggregate: two boards, the rules, the turn pointer and the phase.
//!
//! A [`Game`] is an immutable snapshot. [`Game::place_ships`] and
//! [`Game::make_play`] are pure: they take the current time as an argument and
//! return a new snapshot, leaving the receiver untouched. Timeouts are lazy:
//! a phase that ran out of time is only cancelled when the next transition is
//! attempted.

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardView};
use crate::clock::Timestamp;
use crate::error::GameError;
use crate::rules::GameRules;
use crate::ship::{ShipInfo, Square};

pub type PlayerId = u64;
pub type GameId = u64;

/// Phase of a game. `Finished` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    PlacingShips,
    Playing,
    Finished,
    Cancelled,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Finished | GameState::Cancelled)
    }

    /// Both fleets are on the board.
    pub fn has_begun(self) -> bool {
        matches!(self, GameState::Playing | GameState::Finished)
    }
}

/// Which of the two boards a viewer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fleet {
    Mine,
    Opponent,
}

/// Public summary of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateInfo {
    pub state: GameState,
    pub winner: Option<PlayerId>,
}

/// Outcome of a transition that did not fail validation.
///
/// `TimedOut` carries the cancelled game. It must still be persisted, and the
/// caller reports the timeout after the write succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    Advanced(Game),
    TimedOut(Game),
}

impl Transition {
    pub fn game(&self) -> &Game {
        match self {
            Transition::Advanced(game) | Transition::TimedOut(game) => game,
        }
    }

    pub fn into_game(self) -> Game {
        match self {
            Transition::Advanced(game) | Transition::TimedOut(game) => game,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Transition::TimedOut(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGame")]
pub struct Game {
    id: Option<GameId>,
    version: u64,
    state: GameState,
    rules: GameRules,
    boards: [(PlayerId, Board); 2],
    turn: PlayerId,
    last_updated: Timestamp,
}

/// Unchecked mirror of [`Game`] used when decoding snapshots.
#[derive(Deserialize)]
struct RawGame {
    id: Option<GameId>,
    version: u64,
    state: GameState,
    rules: GameRules,
    boards: [(PlayerId, Board); 2],
    turn: PlayerId,
    last_updated: Timestamp,
}

impl TryFrom<RawGame> for Game {
    type Error = GameError;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        let game = Game {
            id: raw.id,
            version: raw.version,
            state: raw.state,
            rules: raw.rules,
            boards: raw.boards,
            turn: raw.turn,
            last_updated: raw.last_updated,
        };
        game.check_invariants()?;
        Ok(game)
    }
}

impl Game {
    /// A fresh game: both boards empty, placing ships, `players.0` moves first.
    pub fn new(players: (PlayerId, PlayerId), rules: GameRules, now: Timestamp) -> Result<Self, GameError> {
        if players.0 == players.1 {
            return Err(GameError::InvalidParameter(
                "a game needs two distinct players".into(),
            ));
        }
        rules.validate()?;
        let side = rules.board_side;
        Ok(Game {
            id: None,
            version: 0,
            state: GameState::PlacingShips,
            rules,
            boards: [(players.0, Board::empty(side)), (players.1, Board::empty(side))],
            turn: players.0,
            last_updated: now,
        })
    }

    /// Rebuild a game from stored parts, checking every invariant.
    pub fn restore(
        id: GameId,
        version: u64,
        state: GameState,
        rules: GameRules,
        boards: [(PlayerId, Board); 2],
        turn: PlayerId,
        last_updated: Timestamp,
    ) -> Result<Self, GameError> {
        RawGame {
            id: Some(id),
            version,
            state,
            rules,
            boards,
            turn,
            last_updated,
        }
        .try_into()
    }

    fn check_invariants(&self) -> Result<(), GameError> {
        let fail = |msg: &str| Err(GameError::InvalidSnapshot(msg.to_string()));
        let [(p1, b1), (p2, b2)] = &self.boards;
        if p1 == p2 {
            return fail("both boards belong to the same player");
        }
        if b1.side() != self.rules.board_side || b2.side() != self.rules.board_side {
            return fail("board side differs from the rules");
        }
        if self.turn != *p1 && self.turn != *p2 {
            return fail("turn belongs to neither player");
        }
        if self.state.has_begun()
            && [b1, b2]
                .iter()
                .any(|b| b.fleet_composition() != self.rules.ship_rules.fleet_composition)
        {
            return fail("fleet composition differs from the rules");
        }
        if self.state == GameState::Finished && !(b1.is_fleet_destroyed() || b2.is_fleet_destroyed()) {
            return fail("finished game without a destroyed fleet");
        }
        Ok(())
    }

    pub fn id(&self) -> Option<GameId> {
        self.id
    }

    /// Store revision this snapshot was loaded at; 0 before the first write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Snapshot as stored under `id` at `version`. Only stores call this.
    pub fn with_identity(mut self, id: GameId, version: u64) -> Self {
        self.id = Some(id);
        self.version = version;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Player whose turn it is.
    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.boards[0].0, self.boards[1].0]
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.boards.iter().any(|(p, _)| *p == player)
    }

    pub fn board(&self, player: PlayerId) -> Option<&Board> {
        self.boards.iter().find(|(p, _)| *p == player).map(|(_, b)| b)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.players() {
            [a, b] if a == player => Some(b),
            [a, b] if b == player => Some(a),
            _ => None,
        }
    }

    fn require_begun(&self) -> Result<(), GameError> {
        if self.state.has_begun() {
            Ok(())
        } else {
            Err(GameError::WrongState {
                expected: GameState::Playing,
                actual: self.state,
            })
        }
    }

    /// The player who is not on turn. Only defined once both fleets are placed.
    pub fn opposite_turn_id(&self) -> Result<PlayerId, GameError> {
        self.require_begun()?;
        self.opponent_of(self.turn)
            .ok_or_else(|| GameError::InvalidSnapshot("turn belongs to neither player".into()))
    }

    pub fn opposite_turn_board(&self) -> Result<&Board, GameError> {
        let id = self.opposite_turn_id()?;
        self.board(id)
            .ok_or_else(|| GameError::InvalidSnapshot("no board for the opposite turn".into()))
    }

    /// The player who made the play that destroyed the other fleet.
    pub fn winner(&self) -> Result<PlayerId, GameError> {
        if self.state != GameState::Finished {
            return Err(GameError::WrongState {
                expected: GameState::Finished,
                actual: self.state,
            });
        }
        // The turn already moved on to the loser.
        self.opposite_turn_id()
    }

    pub fn state_info(&self) -> GameStateInfo {
        GameStateInfo {
            state: self.state,
            winner: self.winner().ok(),
        }
    }

    fn phase_timeout(&self) -> Option<u64> {
        match self.state {
            GameState::PlacingShips => Some(self.rules.layout_definition_timeout),
            GameState::Playing => Some(self.rules.play_timeout),
            GameState::Finished | GameState::Cancelled => None,
        }
    }

    /// Milliseconds left in the current phase, 0 once exceeded. `None` when terminal.
    pub fn remaining_time(&self, now: Timestamp) -> Option<u64> {
        let timeout = self.phase_timeout()?;
        Some(timeout.saturating_sub(now.saturating_sub(self.last_updated)))
    }

    fn ran_out_of_time(&self, now: Timestamp) -> bool {
        self.phase_timeout()
            .is_some_and(|timeout| now.saturating_sub(self.last_updated) > timeout)
    }

    fn touched(mut self, now: Timestamp) -> Self {
        self.last_updated = self.last_updated.max(now);
        self
    }

    fn cancelled(&self, now: Timestamp) -> Self {
        Game {
            state: GameState::Cancelled,
            ..self.clone()
        }
        .touched(now)
    }

    fn require_state(&self, expected: GameState) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::WrongState {
                expected,
                actual: self.state,
            })
        }
    }

    fn replace_board(&self, player: PlayerId, board: Board) -> Self {
        let mut next = self.clone();
        for (p, b) in next.boards.iter_mut() {
            if *p == player {
                *b = board.clone();
            }
        }
        next
    }

    /// Place `player`'s fleet.
    ///
    /// Once both fleets are placed the game starts playing. If the layout phase
    /// ran out of time the game is cancelled instead, whatever the ships are.
    pub fn place_ships(
        &self,
        player: PlayerId,
        ships: &[ShipInfo],
        now: Timestamp,
    ) -> Result<Transition, GameError> {
        self.require_state(GameState::PlacingShips)?;
        let current = self
            .board(player)
            .ok_or_else(|| GameError::ForbiddenAccess(format!("player {player} is not in this game")))?;
        if current.has_ships() {
            return Err(GameError::AlreadyPlaced);
        }
        if self.ran_out_of_time(now) {
            return Ok(Transition::TimedOut(self.cancelled(now)));
        }

        let board = Board::empty(self.rules.board_side).place_ships(ships)?;
        self.rules.validate_fleet(&board)?;

        let next = self.replace_board(player, board);
        if next.boards.iter().all(|(_, b)| b.has_ships()) {
            Ok(Transition::Advanced(
                Game {
                    state: GameState::Playing,
                    ..next
                }
                .touched(now),
            ))
        } else {
            Ok(Transition::Advanced(next))
        }
    }

    /// Fire the turn player's shots at the opponent's board and pass the turn.
    ///
    /// The play is all or nothing: a rejected shot leaves the game unchanged.
    /// When the opponent's fleet is destroyed the game is finished and the
    /// player who made this play is the winner.
    pub fn make_play(&self, shots: &[Square], now: Timestamp) -> Result<Transition, GameError> {
        self.require_state(GameState::Playing)?;
        if self.ran_out_of_time(now) {
            return Ok(Transition::TimedOut(self.cancelled(now)));
        }
        if shots.len() != self.rules.shots_per_turn {
            return Err(GameError::InvalidParameter(format!(
                "a play requires exactly {} shot(s), got {}",
                self.rules.shots_per_turn,
                shots.len()
            )));
        }

        let target = self.opposite_turn_id()?;
        let board = self.opposite_turn_board()?.make_shots(shots)?;
        let destroyed = board.is_fleet_destroyed();

        let next = self.replace_board(target, board);
        Ok(Transition::Advanced(
            Game {
                turn: target,
                state: if destroyed { GameState::Finished } else { GameState::Playing },
                ..next
            }
            .touched(now),
        ))
    }

    /// `viewer`'s view of one of the two boards. The opponent's un-hit ship
    /// parts are never shown.
    pub fn view(&self, viewer: PlayerId, fleet: Fleet) -> Result<BoardView, GameError> {
        let not_participant = || GameError::ForbiddenAccess(format!("player {viewer} is not in this game"));
        match fleet {
            Fleet::Mine => self.board(viewer).map(Board::view).ok_or_else(not_participant),
            Fleet::Opponent => {
                let opponent = self.opponent_of(viewer).ok_or_else(not_participant)?;
                self.board(opponent)
                    .map(|b| b.redacted().view())
                    .ok_or_else(not_participant)
            }
        }
    }
}
