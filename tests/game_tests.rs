use battleship_rules::{
    Board, Fleet, Game, GameError, GameRules, GameState, Orientation, ShipInfo, ShipRules, Square,
    Transition,
};

const P1: u64 = 1;
const P2: u64 = 2;
const START: u64 = 1_000_000;

fn rules() -> GameRules {
    GameRules {
        shots_per_turn: 1,
        board_side: 4,
        play_timeout: 60_000,
        layout_definition_timeout: 60_000,
        ship_rules: ShipRules::new("Test", [(2, 1)]),
    }
}

fn fleet() -> Vec<ShipInfo> {
    vec![ShipInfo::new(Square::new(0, 0), 2, Orientation::Horizontal)]
}

fn advanced(t: Transition) -> Game {
    match t {
        Transition::Advanced(game) => game,
        Transition::TimedOut(_) => panic!("unexpected timeout"),
    }
}

fn playing_game() -> Game {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let game = advanced(game.place_ships(P1, &fleet(), START + 10).unwrap());
    advanced(game.place_ships(P2, &fleet(), START + 20).unwrap())
}

#[test]
fn test_new_game() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    assert_eq!(game.state(), GameState::PlacingShips);
    assert_eq!(game.turn(), P1);
    assert_eq!(game.id(), None);
    assert_eq!(game.players(), [P1, P2]);
    assert_eq!(game.board(P1), Some(&Board::empty(4)));
    assert_eq!(game.board(P2), Some(&Board::empty(4)));
    assert_eq!(game.last_updated(), START);
}

#[test]
fn test_new_game_rejects_same_player_and_bad_rules() {
    assert!(matches!(
        Game::new((P1, P1), rules(), START),
        Err(GameError::InvalidParameter(_))
    ));
    let mut bad = rules();
    bad.ship_rules = ShipRules::new("Huge", [(5, 1)]);
    assert!(matches!(
        Game::new((P1, P2), bad, START),
        Err(GameError::InvalidParameter(_))
    ));
}

#[test]
fn test_placement_sequence_starts_game() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let game = advanced(game.place_ships(P1, &fleet(), START + 10).unwrap());
    assert_eq!(game.state(), GameState::PlacingShips);
    assert_eq!(game.last_updated(), START);

    let game = advanced(game.place_ships(P2, &fleet(), START + 20).unwrap());
    assert_eq!(game.state(), GameState::Playing);
    assert_eq!(game.turn(), P1);
    assert_eq!(game.last_updated(), START + 20);
}

#[test]
fn test_placing_twice_is_rejected() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let game = advanced(game.place_ships(P1, &fleet(), START).unwrap());
    assert!(matches!(
        game.place_ships(P1, &fleet(), START),
        Err(GameError::AlreadyPlaced)
    ));
}

#[test]
fn test_invalid_fleet_leaves_game_unchanged() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let too_many = vec![
        ShipInfo::new(Square::new(0, 0), 2, Orientation::Horizontal),
        ShipInfo::new(Square::new(2, 0), 2, Orientation::Horizontal),
    ];
    assert!(matches!(
        game.place_ships(P1, &too_many, START),
        Err(GameError::InvalidParameter(_))
    ));
    let out_of_bounds = vec![ShipInfo::new(Square::new(0, 3), 2, Orientation::Horizontal)];
    assert!(matches!(
        game.place_ships(P1, &out_of_bounds, START),
        Err(GameError::InvalidParameter(_))
    ));
    assert!(matches!(
        game.place_ships(P1, &[], START),
        Err(GameError::InvalidParameter(_))
    ));
    assert!(!game.board(P1).unwrap().has_ships());
}

#[test]
fn test_oversized_ship_is_invalid_parameter() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let huge = [ShipInfo::new(Square::new(0, 0), usize::MAX, Orientation::Horizontal)];
    assert!(matches!(
        game.place_ships(P1, &huge, START),
        Err(GameError::InvalidParameter(_))
    ));
}

#[test]
fn test_placement_timeout_cancels_even_with_invalid_ships() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let later = START + rules().layout_definition_timeout + 1;
    let transition = game.place_ships(P1, &[], later).unwrap();
    assert!(transition.is_timed_out());
    let cancelled = transition.into_game();
    assert_eq!(cancelled.state(), GameState::Cancelled);
    assert_eq!(cancelled.last_updated(), later);
}

#[test]
fn test_placement_at_exact_timeout_is_allowed() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    let deadline = START + rules().layout_definition_timeout;
    assert!(!game.place_ships(P1, &fleet(), deadline).unwrap().is_timed_out());
}

#[test]
fn test_play_before_start_is_wrong_state() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    assert!(matches!(
        game.make_play(&[Square::new(0, 0)], START),
        Err(GameError::WrongState {
            expected: GameState::Playing,
            actual: GameState::PlacingShips
        })
    ));
    assert!(matches!(game.opposite_turn_id(), Err(GameError::WrongState { .. })));
    assert!(matches!(game.winner(), Err(GameError::WrongState { .. })));
}

#[test]
fn test_placing_after_start_is_wrong_state() {
    let game = playing_game();
    assert!(matches!(
        game.place_ships(P1, &fleet(), START),
        Err(GameError::WrongState { .. })
    ));
}

#[test]
fn test_full_game_last_mover_wins() {
    let game = playing_game();

    let game = advanced(game.make_play(&[Square::new(0, 0)], START + 30).unwrap());
    assert_eq!(game.turn(), P2);
    let game = advanced(game.make_play(&[Square::new(0, 0)], START + 40).unwrap());
    assert_eq!(game.turn(), P1);
    assert_eq!(game.state(), GameState::Playing);

    // P1 sinks the only ship of P2.
    let game = advanced(game.make_play(&[Square::new(0, 1)], START + 50).unwrap());
    assert_eq!(game.state(), GameState::Finished);
    assert_eq!(game.winner().unwrap(), P1);
    assert!(game.board(P2).unwrap().is_fleet_destroyed());
    assert!(!game.board(P1).unwrap().is_fleet_destroyed());
    assert_eq!(game.state_info().winner, Some(P1));

    assert!(matches!(
        game.make_play(&[Square::new(0, 1)], START + 60),
        Err(GameError::WrongState {
            expected: GameState::Playing,
            actual: GameState::Finished
        })
    ));
}

#[test]
fn test_wrong_shot_count_is_rejected() {
    let game = playing_game();
    assert!(matches!(
        game.make_play(&[Square::new(0, 0), Square::new(1, 1)], START + 30),
        Err(GameError::InvalidParameter(_))
    ));
    assert!(matches!(game.make_play(&[], START + 30), Err(GameError::InvalidParameter(_))));
}

#[test]
fn test_repeated_shot_is_rejected_without_passing_turn() {
    let game = playing_game();
    let game = advanced(game.make_play(&[Square::new(3, 3)], START + 30).unwrap());
    let game = advanced(game.make_play(&[Square::new(3, 3)], START + 40).unwrap());
    assert!(matches!(
        game.make_play(&[Square::new(3, 3)], START + 50),
        Err(GameError::InvalidParameter(_))
    ));
    assert_eq!(game.turn(), P1);
}

#[test]
fn test_multi_shot_play_is_all_or_nothing() {
    let mut r = rules();
    r.shots_per_turn = 2;
    let game = Game::new((P1, P2), r, START).unwrap();
    let game = advanced(game.place_ships(P1, &fleet(), START).unwrap());
    let game = advanced(game.place_ships(P2, &fleet(), START).unwrap());

    let shots = [Square::new(0, 0), Square::new(0, 0)];
    assert!(matches!(
        game.make_play(&shots, START + 1),
        Err(GameError::InvalidParameter(_))
    ));
    assert!(!game.board(P2).unwrap().view().hits.contains(&Square::new(0, 0)));

    let game = advanced(game.make_play(&[Square::new(0, 0), Square::new(0, 1)], START + 2).unwrap());
    assert_eq!(game.state(), GameState::Finished);
    assert_eq!(game.winner().unwrap(), P1);
}

#[test]
fn test_play_timeout_cancels_valid_play() {
    let game = playing_game();
    let later = game.last_updated() + rules().play_timeout + 1;
    let transition = game.make_play(&[Square::new(0, 0)], later).unwrap();
    assert!(transition.is_timed_out());
    let cancelled = transition.game();
    assert_eq!(cancelled.state(), GameState::Cancelled);
    assert_eq!(cancelled.turn(), P1);
    assert!(!cancelled.board(P2).unwrap().view().hits.contains(&Square::new(0, 0)));
}

#[test]
fn test_last_updated_never_goes_back() {
    let game = playing_game();
    let game = advanced(game.make_play(&[Square::new(2, 2)], START).unwrap());
    assert_eq!(game.last_updated(), START + 20);
}

#[test]
fn test_remaining_time() {
    let game = Game::new((P1, P2), rules(), START).unwrap();
    assert_eq!(game.remaining_time(START + 1_000), Some(59_000));
    assert_eq!(game.remaining_time(START + 100_000), Some(0));
    let cancelled = game.place_ships(P1, &fleet(), START + 100_000).unwrap().into_game();
    assert_eq!(cancelled.remaining_time(START + 100_000), None);
}

#[test]
fn test_views_redact_opponent_ships() {
    let game = playing_game();
    let game = advanced(game.make_play(&[Square::new(0, 0)], START + 30).unwrap());
    let game = advanced(game.make_play(&[Square::new(3, 3)], START + 40).unwrap());

    let mine = game.view(P1, Fleet::Mine).unwrap();
    assert_eq!(mine.ship_parts, vec![Square::new(0, 0), Square::new(0, 1)]);
    assert_eq!(mine.misses, vec![Square::new(3, 3)]);

    let theirs = game.view(P1, Fleet::Opponent).unwrap();
    assert!(theirs.ship_parts.is_empty());
    assert_eq!(theirs.hits, vec![Square::new(0, 0)]);

    assert!(matches!(game.view(99, Fleet::Mine), Err(GameError::ForbiddenAccess(_))));
}

#[test]
fn test_restore_checks_invariants() {
    let ok = Game::restore(
        7,
        3,
        GameState::PlacingShips,
        rules(),
        [(P1, Board::empty(4)), (P2, Board::empty(4))],
        P1,
        START,
    )
    .unwrap();
    assert_eq!(ok.id(), Some(7));
    assert_eq!(ok.version(), 3);

    let wrong_side = Game::restore(
        7,
        3,
        GameState::PlacingShips,
        rules(),
        [(P1, Board::empty(5)), (P2, Board::empty(4))],
        P1,
        START,
    );
    assert!(matches!(wrong_side, Err(GameError::InvalidSnapshot(_))));

    let empty_fleets_playing = Game::restore(
        7,
        3,
        GameState::Playing,
        rules(),
        [(P1, Board::empty(4)), (P2, Board::empty(4))],
        P1,
        START,
    );
    assert!(matches!(empty_fleets_playing, Err(GameError::InvalidSnapshot(_))));

    let stranger_turn = Game::restore(
        7,
        3,
        GameState::PlacingShips,
        rules(),
        [(P1, Board::empty(4)), (P2, Board::empty(4))],
        42,
        START,
    );
    assert!(matches!(stranger_turn, Err(GameError::InvalidSnapshot(_))));
}
