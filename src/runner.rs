//! Drives two automated players through a complete game: lobby pairing,
//! fleet placement and alternating plays, all through the service layer.

use anyhow::{bail, Context};
use log::debug;
use rand::rngs::SmallRng;
use serde::Serialize;

use crate::clock::Clock;
use crate::game::{GameId, GameState, PlayerId};
use crate::lobby::{JoinOutcome, Lobby};
use crate::player::Player;
use crate::service;
use crate::store::UnitOfWork;

/// One automated participant.
pub struct Seat {
    pub id: PlayerId,
    pub player: Box<dyn Player>,
    pub rng: SmallRng,
}

impl Seat {
    pub fn new(id: PlayerId, player: Box<dyn Player>, rng: SmallRng) -> Self {
        Self { id, player, rng }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub game_id: GameId,
    pub state: GameState,
    pub winner: Option<PlayerId>,
    pub plays: usize,
}

/// Play a whole game between `first` and `second`. `first` joins the lobby first
/// and therefore moves first. Fails if the game is not over after `max_plays`.
pub async fn run_match<U, C>(
    uow: &U,
    clock: &C,
    lobby: &Lobby,
    mut first: Seat,
    mut second: Seat,
    max_plays: usize,
) -> anyhow::Result<MatchReport>
where
    U: UnitOfWork + ?Sized,
    C: Clock + ?Sized,
{
    if let JoinOutcome::Matched(id) = lobby.join(uow, clock, first.id).await? {
        bail!("player {} was matched into game {id} before the match started", first.id);
    }
    let game_id = match lobby.join(uow, clock, second.id).await? {
        JoinOutcome::Matched(id) => id,
        JoinOutcome::Waiting(_) => bail!("player {} was not paired", second.id),
    };

    let rules = lobby.rules().clone();
    for seat in [&mut first, &mut second] {
        let ships = seat
            .player
            .choose_fleet(&mut seat.rng, &rules)
            .with_context(|| format!("player {} could not choose a fleet", seat.id))?;
        service::define_fleet_layout(uow, clock, seat.id, game_id, &ships).await?;
    }

    let mut plays = 0;
    loop {
        let game = service::game(uow, first.id, game_id).await?;
        if game.state().is_terminal() {
            return Ok(MatchReport {
                game_id,
                state: game.state(),
                winner: game.winner().ok(),
                plays,
            });
        }
        if plays >= max_plays {
            bail!("game {game_id} not over after {max_plays} plays");
        }

        let seat = if game.turn() == first.id { &mut first } else { &mut second };
        let target = game.opposite_turn_board()?.redacted();
        let shots = seat
            .player
            .select_shots(&mut seat.rng, &target, rules.shots_per_turn);
        debug!("player {} fires at {:?}", seat.id, shots);
        service::make_shots(uow, clock, seat.id, game_id, &shots).await?;
        plays += 1;
    }
}
