//! Process-local game and lobby store.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::game::{Game, GameId, PlayerId};
use crate::store::{GameStore, LobbyEntry, LobbyId, LobbyStore, UnitOfWork};

/// Process-local store for games and lobby entries.
///
/// Games are kept bincode-encoded, so every read hands out an independent
/// snapshot. Each table sits behind its own lock, which is the serialization
/// point for the version check and the lobby claim.
#[derive(Default)]
pub struct MemoryStore {
    games: Mutex<GameTable>,
    lobby: Mutex<LobbyTable>,
}

#[derive(Default)]
struct GameTable {
    last_id: GameId,
    rows: HashMap<GameId, StoredGame>,
}

struct StoredGame {
    version: u64,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct LobbyTable {
    last_id: LobbyId,
    rows: BTreeMap<LobbyId, LobbyEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode(id: GameId, row: &StoredGame) -> Result<Game, StoreError> {
        let game: Game = bincode::deserialize(&row.bytes)?;
        Ok(game.with_identity(id, row.version))
    }
}

#[async_trait::async_trait]
impl GameStore for MemoryStore {
    async fn get(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        let table = self.games.lock().await;
        table.rows.get(&id).map(|row| Self::decode(id, row)).transpose()
    }

    async fn persist(&self, game: &Game) -> Result<GameId, StoreError> {
        let bytes = bincode::serialize(game)?;
        let mut table = self.games.lock().await;
        match game.id() {
            None => {
                table.last_id += 1;
                let id = table.last_id;
                table.rows.insert(id, StoredGame { version: 1, bytes });
                debug!("inserted game {id}");
                Ok(id)
            }
            Some(id) => {
                let row = table.rows.get_mut(&id).ok_or(StoreError::Missing(id))?;
                if row.version != game.version() {
                    return Err(StoreError::Conflict {
                        id,
                        expected: game.version(),
                        found: row.version,
                    });
                }
                row.version += 1;
                row.bytes = bytes;
                trace!("game {id} now at version {}", row.version);
                Ok(id)
            }
        }
    }

    async fn discard(&self, id: GameId) -> Result<(), StoreError> {
        let mut table = self.games.lock().await;
        table.rows.remove(&id).map(|_| ()).ok_or(StoreError::Missing(id))
    }

    async fn list(&self) -> Result<Vec<Game>, StoreError> {
        let table = self.games.lock().await;
        let mut ids: Vec<_> = table.rows.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| Self::decode(id, &table.rows[&id]))
            .collect()
    }
}

#[async_trait::async_trait]
impl LobbyStore for MemoryStore {
    async fn create_entry(&self, player: PlayerId) -> Result<LobbyId, StoreError> {
        let mut table = self.lobby.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            LobbyEntry {
                id,
                player1: player,
                player2: None,
                game_id: None,
                cancelled: false,
            },
        );
        Ok(id)
    }

    async fn get_entry(&self, id: LobbyId) -> Result<Option<LobbyEntry>, StoreError> {
        Ok(self.lobby.lock().await.rows.get(&id).cloned())
    }

    async fn find_waiting_entry(&self, excluding: PlayerId) -> Result<Option<LobbyEntry>, StoreError> {
        let table = self.lobby.lock().await;
        Ok(table
            .rows
            .values()
            .find(|e| e.is_waiting() && e.player1 != excluding)
            .cloned())
    }

    async fn waiting_entry_of(&self, player: PlayerId) -> Result<Option<LobbyEntry>, StoreError> {
        let table = self.lobby.lock().await;
        Ok(table
            .rows
            .values()
            .find(|e| e.is_waiting() && e.player1 == player)
            .cloned())
    }

    async fn claim_entry(&self, id: LobbyId, player2: PlayerId, game_id: GameId) -> Result<bool, StoreError> {
        let mut table = self.lobby.lock().await;
        match table.rows.get_mut(&id) {
            Some(entry) if entry.is_waiting() && entry.player1 != player2 => {
                entry.player2 = Some(player2);
                entry.game_id = Some(game_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cancel_entry(&self, player: PlayerId) -> Result<bool, StoreError> {
        let mut table = self.lobby.lock().await;
        match table
            .rows
            .values_mut()
            .find(|e| e.is_waiting() && e.player1 == player)
        {
            Some(entry) => {
                entry.cancelled = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl UnitOfWork for MemoryStore {
    fn games(&self) -> &dyn GameStore {
        self
    }

    fn lobby(&self) -> &dyn LobbyStore {
        self
    }
}
