//! Waiting-player matchmaking.

use log::{debug, info};

use crate::clock::Clock;
use crate::error::GameError;
use crate::game::{Game, GameId, PlayerId};
use crate::rules::GameRules;
use crate::store::{LobbyEntry, LobbyId, UnitOfWork};

/// How often a join retries after losing a claim race before it queues instead.
const CLAIM_ATTEMPTS: usize = 3;

/// What a join request led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No partner yet; the caller waits in this lobby entry.
    Waiting(LobbyId),
    /// Paired with a waiting player in a new game.
    Matched(GameId),
}

/// Pairs waiting users into games created under `rules`.
#[derive(Debug, Clone)]
pub struct Lobby {
    rules: GameRules,
}

impl Lobby {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Pair `user` with the oldest waiting player, or queue them.
    ///
    /// The new game is inserted before the entry is claimed so the claim can
    /// record its id. When another joiner wins the claim, the game is discarded
    /// and the lookup is retried. A user who is already waiting withdraws their
    /// own entry before claiming another one, so they end up in one game only.
    pub async fn join<U, C>(&self, uow: &U, clock: &C, user: PlayerId) -> Result<JoinOutcome, GameError>
    where
        U: UnitOfWork + ?Sized,
        C: Clock + ?Sized,
    {
        for _ in 0..CLAIM_ATTEMPTS {
            let Some(entry) = uow.lobby().find_waiting_entry(user).await? else {
                break;
            };
            if let Some(game_id) = self.withdraw(uow, user).await? {
                debug!("player {user} was claimed while re-joining, game {game_id}");
                return Ok(JoinOutcome::Matched(game_id));
            }
            let game = Game::new((entry.player1, user), self.rules.clone(), clock.now())?;
            let game_id = uow.games().persist(&game).await?;
            if uow.lobby().claim_entry(entry.id, user, game_id).await? {
                info!(
                    "matched player {} with player {user} in game {game_id}",
                    entry.player1
                );
                return Ok(JoinOutcome::Matched(game_id));
            }
            debug!("player {user} lost the claim on lobby entry {}", entry.id);
            uow.games().discard(game_id).await?;
        }

        if let Some(entry) = uow.lobby().waiting_entry_of(user).await? {
            debug!("player {user} is already waiting in lobby entry {}", entry.id);
            return Ok(JoinOutcome::Waiting(entry.id));
        }
        let id = uow.lobby().create_entry(user).await?;
        info!("player {user} is waiting in lobby entry {id}");
        Ok(JoinOutcome::Waiting(id))
    }

    /// Cancel `user`'s own waiting entry, if any. When another joiner claimed it
    /// first, returns the game that claim created.
    async fn withdraw<U>(&self, uow: &U, user: PlayerId) -> Result<Option<GameId>, GameError>
    where
        U: UnitOfWork + ?Sized,
    {
        let Some(own) = uow.lobby().waiting_entry_of(user).await? else {
            return Ok(None);
        };
        if uow.lobby().cancel_entry(user).await? {
            debug!("player {user} withdrew lobby entry {}", own.id);
            return Ok(None);
        }
        Ok(uow.lobby().get_entry(own.id).await?.and_then(|e| e.game_id))
    }

    /// A lobby entry `user` takes part in, so a waiting player can poll for its game.
    pub async fn status<U>(&self, uow: &U, user: PlayerId, id: LobbyId) -> Result<LobbyEntry, GameError>
    where
        U: UnitOfWork + ?Sized,
    {
        let entry = uow
            .lobby()
            .get_entry(id)
            .await?
            .ok_or(GameError::LobbyNotFound(id))?;
        if entry.player1 != user && entry.player2 != Some(user) {
            return Err(GameError::ForbiddenAccess(format!(
                "player {user} is not part of lobby entry {id}"
            )));
        }
        Ok(entry)
    }

    /// Cancel `user`'s own waiting entry.
    pub async fn leave<U>(&self, uow: &U, user: PlayerId) -> Result<(), GameError>
    where
        U: UnitOfWork + ?Sized,
    {
        if uow.lobby().cancel_entry(user).await? {
            info!("player {user} left the lobby");
            Ok(())
        } else {
            Err(GameError::ForbiddenAccess(format!(
                "player {user} is not waiting in the lobby"
            )))
        }
    }
}
