//! Caller-facing game operations.
//!
//! Each operation receives an authenticated player id and the unit of work to
//! run against. It loads the game, checks that the caller may act on it, runs
//! the pure transition and writes the result back. A store failure aborts the
//! whole operation, so no partial state is ever written.

use log::{debug, info, warn};

use crate::board::BoardView;
use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Fleet, Game, GameId, GameState, GameStateInfo, PlayerId, Transition};
use crate::ship::{ShipInfo, Square};
use crate::stats::{leaderboard, PlayerStatistics};
use crate::store::UnitOfWork;

async fn load<U>(uow: &U, id: GameId) -> Result<Game, GameError>
where
    U: UnitOfWork + ?Sized,
{
    uow.games().get(id).await?.ok_or(GameError::GameNotFound(id))
}

fn require_participant(game: &Game, user: PlayerId) -> Result<(), GameError> {
    if game.is_participant(user) {
        Ok(())
    } else {
        Err(GameError::ForbiddenAccess(format!(
            "player {user} is not part of this game"
        )))
    }
}

/// Persist the outcome; a timeout is reported only after the cancelled game is stored.
async fn commit<U>(uow: &U, transition: Transition, timeout_msg: &str) -> Result<GameStateInfo, GameError>
where
    U: UnitOfWork + ?Sized,
{
    let timed_out = transition.is_timed_out();
    let game = transition.into_game();
    let id = uow.games().persist(&game).await?;
    if timed_out {
        warn!("game {id} cancelled: {timeout_msg}");
        return Err(GameError::TimeoutExceeded(timeout_msg.to_string()));
    }
    debug!("game {id} is now {:?}", game.state());
    Ok(game.state_info())
}

/// The whole snapshot of a game `user` takes part in.
pub async fn game<U>(uow: &U, user: PlayerId, id: GameId) -> Result<Game, GameError>
where
    U: UnitOfWork + ?Sized,
{
    let game = load(uow, id).await?;
    require_participant(&game, user)?;
    Ok(game)
}

pub async fn game_state<U>(uow: &U, user: PlayerId, id: GameId) -> Result<GameStateInfo, GameError>
where
    U: UnitOfWork + ?Sized,
{
    Ok(game(uow, user, id).await?.state_info())
}

/// `user`'s own board, or the opponent's board with un-hit ship parts hidden.
pub async fn fleet<U>(uow: &U, user: PlayerId, id: GameId, which: Fleet) -> Result<BoardView, GameError>
where
    U: UnitOfWork + ?Sized,
{
    game(uow, user, id).await?.view(user, which)
}

pub async fn define_fleet_layout<U, C>(
    uow: &U,
    clock: &C,
    user: PlayerId,
    id: GameId,
    ships: &[ShipInfo],
) -> Result<GameStateInfo, GameError>
where
    U: UnitOfWork + ?Sized,
    C: Clock + ?Sized,
{
    let current = game(uow, user, id).await?;
    let transition = current.place_ships(user, ships, clock.now())?;
    let info = commit(uow, transition, "ships were not placed in time").await?;
    if info.state == GameState::Playing {
        info!("game {id} started");
    }
    Ok(info)
}

pub async fn make_shots<U, C>(
    uow: &U,
    clock: &C,
    user: PlayerId,
    id: GameId,
    shots: &[Square],
) -> Result<GameStateInfo, GameError>
where
    U: UnitOfWork + ?Sized,
    C: Clock + ?Sized,
{
    let current = game(uow, user, id).await?;
    if current.state() == GameState::Playing && current.turn() != user {
        return Err(GameError::ForbiddenAccess("not your turn".into()));
    }
    let transition = current.make_play(shots, clock.now())?;
    let info = commit(uow, transition, "shots were not made in time").await?;
    if let Some(winner) = info.winner {
        info!("game {id} finished, player {winner} won");
    }
    Ok(info)
}

/// Ids of every game `user` takes part in.
pub async fn games_of<U>(uow: &U, user: PlayerId) -> Result<Vec<GameId>, GameError>
where
    U: UnitOfWork + ?Sized,
{
    Ok(uow
        .games()
        .list()
        .await?
        .iter()
        .filter(|g| g.is_participant(user))
        .filter_map(Game::id)
        .collect())
}

/// Ranked statistics over every finished game.
pub async fn statistics<U>(uow: &U) -> Result<Vec<PlayerStatistics>, GameError>
where
    U: UnitOfWork + ?Sized,
{
    Ok(leaderboard(&uow.games().list().await?))
}
