//! Persistence collaborators the game core relies on.
//!
//! Both stores are consumed through traits so a database-backed implementation
//! can replace [`in_memory::MemoryStore`]. Implementations must honour two
//! atomicity contracts:
//!
//! * [`GameStore::persist`] replaces a stored game only if it still holds the
//!   version the snapshot was loaded at, so two transitions racing on the same
//!   game can never both commit.
//! * [`LobbyStore::claim_entry`] is a single compare-and-set on an entry that has
//!   no second player and is not cancelled.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::game::{Game, GameId, PlayerId};

pub type LobbyId = u64;

/// A matchmaking record. Created waiting, then either completed or cancelled,
/// and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    pub id: LobbyId,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    pub game_id: Option<GameId>,
    pub cancelled: bool,
}

impl LobbyEntry {
    pub fn is_waiting(&self) -> bool {
        self.player2.is_none() && !self.cancelled
    }
}

#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    async fn get(&self, id: GameId) -> Result<Option<Game>, StoreError>;
    /// Insert `game` if it has no id yet, otherwise replace the stored game if its
    /// version still matches. Returns the game id.
    async fn persist(&self, game: &Game) -> Result<GameId, StoreError>;
    /// Drop a game inserted by a unit of work that could not complete.
    async fn discard(&self, id: GameId) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<Game>, StoreError>;
}

#[async_trait::async_trait]
pub trait LobbyStore: Send + Sync {
    async fn create_entry(&self, player: PlayerId) -> Result<LobbyId, StoreError>;
    async fn get_entry(&self, id: LobbyId) -> Result<Option<LobbyEntry>, StoreError>;
    /// Oldest waiting entry whose first player is not `excluding`.
    async fn find_waiting_entry(&self, excluding: PlayerId) -> Result<Option<LobbyEntry>, StoreError>;
    /// `player`'s own waiting entry, if any.
    async fn waiting_entry_of(&self, player: PlayerId) -> Result<Option<LobbyEntry>, StoreError>;
    /// Atomically complete a waiting entry. Returns `false` if it was no longer waiting.
    async fn claim_entry(&self, id: LobbyId, player2: PlayerId, game_id: GameId) -> Result<bool, StoreError>;
    /// Cancel `player`'s waiting entry. Returns `false` if there was none.
    async fn cancel_entry(&self, player: PlayerId) -> Result<bool, StoreError>;
}

/// The stores one lobby or game operation works against.
pub trait UnitOfWork: Send + Sync {
    fn games(&self) -> &dyn GameStore;
    fn lobby(&self) -> &dyn LobbyStore;
}

pub mod in_memory;
