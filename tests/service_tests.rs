use std::sync::Arc;

use battleship_rules::service;
use battleship_rules::{
    Fleet, GameError, GameId, GameRules, GameState, GameStore, JoinOutcome, Lobby, ManualClock,
    MemoryStore, Orientation, ShipInfo, ShipRules, Square, StoreError,
};

const P1: u64 = 1;
const P2: u64 = 2;
const STRANGER: u64 = 3;

fn rules() -> GameRules {
    GameRules {
        shots_per_turn: 1,
        board_side: 4,
        play_timeout: 30_000,
        layout_definition_timeout: 60_000,
        ship_rules: ShipRules::new("Test", [(2, 1)]),
    }
}

fn fleet() -> Vec<ShipInfo> {
    vec![ShipInfo::new(Square::new(0, 0), 2, Orientation::Horizontal)]
}

async fn matched_game(store: &MemoryStore, clock: &ManualClock) -> GameId {
    let lobby = Lobby::new(rules());
    lobby.join(store, clock, P1).await.unwrap();
    match lobby.join(store, clock, P2).await.unwrap() {
        JoinOutcome::Matched(id) => id,
        other => panic!("expected a match, got {other:?}"),
    }
}

async fn playing_game(store: &MemoryStore, clock: &ManualClock) -> GameId {
    let id = matched_game(store, clock).await;
    service::define_fleet_layout(store, clock, P1, id, &fleet()).await.unwrap();
    let info = service::define_fleet_layout(store, clock, P2, id, &fleet()).await.unwrap();
    assert_eq!(info.state, GameState::Playing);
    id
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    assert!(matches!(
        service::game(&store, P1, 99).await,
        Err(GameError::GameNotFound(99))
    ));
    assert!(matches!(
        service::make_shots(&store, &clock, P1, 99, &[Square::new(0, 0)]).await,
        Err(GameError::GameNotFound(99))
    ));
}

#[tokio::test]
async fn test_strangers_are_forbidden() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = matched_game(&store, &clock).await;

    assert!(matches!(
        service::game_state(&store, STRANGER, id).await,
        Err(GameError::ForbiddenAccess(_))
    ));
    assert!(matches!(
        service::fleet(&store, STRANGER, id, Fleet::Mine).await,
        Err(GameError::ForbiddenAccess(_))
    ));
    assert!(matches!(
        service::define_fleet_layout(&store, &clock, STRANGER, id, &fleet()).await,
        Err(GameError::ForbiddenAccess(_))
    ));
}

#[tokio::test]
async fn test_full_game_through_service() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;

    clock.advance(1_000);
    assert!(matches!(
        service::make_shots(&store, &clock, P2, id, &[Square::new(0, 0)]).await,
        Err(GameError::ForbiddenAccess(_))
    ));
    let info = service::make_shots(&store, &clock, P1, id, &[Square::new(0, 0)]).await.unwrap();
    assert_eq!(info.state, GameState::Playing);
    assert_eq!(info.winner, None);

    service::make_shots(&store, &clock, P2, id, &[Square::new(3, 3)]).await.unwrap();
    let info = service::make_shots(&store, &clock, P1, id, &[Square::new(0, 1)]).await.unwrap();
    assert_eq!(info.state, GameState::Finished);
    assert_eq!(info.winner, Some(P1));

    let state = service::game_state(&store, P2, id).await.unwrap();
    assert_eq!(state.winner, Some(P1));
    assert!(matches!(
        service::make_shots(&store, &clock, P2, id, &[Square::new(1, 1)]).await,
        Err(GameError::WrongState { .. })
    ));
}

#[tokio::test]
async fn test_fleet_views() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;
    service::make_shots(&store, &clock, P1, id, &[Square::new(0, 1)]).await.unwrap();

    let mine = service::fleet(&store, P2, id, Fleet::Mine).await.unwrap();
    assert_eq!(mine.ship_parts, vec![Square::new(0, 0)]);
    assert_eq!(mine.hits, vec![Square::new(0, 1)]);

    let theirs = service::fleet(&store, P1, id, Fleet::Opponent).await.unwrap();
    assert!(theirs.ship_parts.is_empty());
    assert_eq!(theirs.hits, vec![Square::new(0, 1)]);
    assert_eq!(theirs.side, 4);
}

#[tokio::test]
async fn test_rejected_play_is_not_stored() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;
    let before = store.get(id).await.unwrap().unwrap();

    assert!(matches!(
        service::make_shots(&store, &clock, P1, id, &[Square::new(4, 0)]).await,
        Err(GameError::InvalidParameter(_))
    ));
    assert_eq!(store.get(id).await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn test_play_timeout_cancels_and_persists() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;

    clock.advance(rules().play_timeout + 1);
    assert!(matches!(
        service::make_shots(&store, &clock, P1, id, &[Square::new(0, 0)]).await,
        Err(GameError::TimeoutExceeded(_))
    ));
    let state = service::game_state(&store, P1, id).await.unwrap();
    assert_eq!(state.state, GameState::Cancelled);
    assert_eq!(state.winner, None);

    assert!(matches!(
        service::make_shots(&store, &clock, P1, id, &[Square::new(0, 0)]).await,
        Err(GameError::WrongState { .. })
    ));
}

#[tokio::test]
async fn test_layout_timeout_cancels_and_persists() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let id = matched_game(&store, &clock).await;

    clock.set(rules().layout_definition_timeout + 1);
    assert!(matches!(
        service::define_fleet_layout(&store, &clock, P1, id, &fleet()).await,
        Err(GameError::TimeoutExceeded(_))
    ));
    let game = service::game(&store, P2, id).await.unwrap();
    assert_eq!(game.state(), GameState::Cancelled);
    assert!(!game.board(P1).unwrap().has_ships());
}

#[tokio::test]
async fn test_games_of_and_statistics() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let finished = playing_game(&store, &clock).await;
    for (user, square) in [(P1, (0, 0)), (P2, (2, 2)), (P1, (0, 1))] {
        service::make_shots(&store, &clock, user, finished, &[Square::new(square.0, square.1)])
            .await
            .unwrap();
    }
    let unfinished = matched_game(&store, &clock).await;

    assert_eq!(service::games_of(&store, P1).await.unwrap(), vec![finished, unfinished]);
    assert!(service::games_of(&store, STRANGER).await.unwrap().is_empty());

    let stats = service::statistics(&store).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!((stats[0].rank, stats[0].player, stats[0].wins, stats[0].total_games), (1, P1, 1, 1));
    assert_eq!((stats[1].rank, stats[1].player, stats[1].wins, stats[1].total_games), (2, P2, 0, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_writes_from_one_snapshot_commit_once() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;
    let snapshot = store.get(id).await.unwrap().unwrap();

    let mut handles = Vec::new();
    for square in [Square::new(0, 0), Square::new(3, 3)] {
        let store = store.clone();
        let next = snapshot.make_play(&[square], 1).unwrap().into_game();
        handles.push(tokio::spawn(async move { store.persist(&next).await }));
    }
    let mut committed = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => committed += 1,
            Err(StoreError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected store error {other:?}"),
        }
    }
    assert_eq!((committed, conflicts), (1, 1));

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.version(), snapshot.version() + 1);
    let target = stored.board(P2).unwrap().view();
    assert_eq!(target.hits.len() + target.misses.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_plays_through_service_apply_one() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(0);
    let id = playing_game(&store, &clock).await;

    let mut handles = Vec::new();
    for square in [Square::new(0, 0), Square::new(3, 3)] {
        let (store, clock) = (store.clone(), clock.clone());
        handles.push(tokio::spawn(async move {
            service::make_shots(store.as_ref(), &clock, P1, id, &[square]).await
        }));
    }
    let mut applied = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => applied += 1,
            // Lost the version race, or loaded after the winner passed the turn.
            Err(GameError::Store(StoreError::Conflict { .. })) | Err(GameError::ForbiddenAccess(_)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(applied, 1);

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.turn(), P2);
    let target = stored.board(P2).unwrap().view();
    assert_eq!(target.hits.len() + target.misses.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_placements_never_lose_a_fleet() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(0);
    let id = matched_game(&store, &clock).await;

    let mut handles = Vec::new();
    for user in [P1, P2] {
        let (store, clock) = (store.clone(), clock.clone());
        handles.push(tokio::spawn(async move {
            service::define_fleet_layout(store.as_ref(), &clock, user, id, &fleet()).await
        }));
    }
    let mut placed = Vec::new();
    for (h, user) in handles.into_iter().zip([P1, P2]) {
        match h.await.unwrap() {
            Ok(_) => placed.push(user),
            Err(GameError::Store(StoreError::Conflict { .. })) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert!(!placed.is_empty());

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.version(), 1 + placed.len() as u64);
    for user in [P1, P2] {
        assert_eq!(stored.board(user).unwrap().has_ships(), placed.contains(&user));
    }
    let expected = if placed.len() == 2 { GameState::Playing } else { GameState::PlacingShips };
    assert_eq!(stored.state(), expected);
}
