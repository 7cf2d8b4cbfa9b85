//! Integration tests for morris-rust
//!
//! Most scenarios run on the six men's board (two rings, 16 points):
//!
//! ```text
//! inner ring  a b c d e f g h   (a, c, e, g are corners)
//! outer ring  i j k l m n o p
//! ```
//!
//! Mills are the four sides of each ring (`abc cde efg gha`, `ijk klm mno opi`)
//! and the midpoints `b d f h` link to `j l n p`.

use std::sync::Arc;

use serde_json::json;

use morris_rust::MorrisError;
use morris_rust::board::{Board, MillLayout};
use morris_rust::constants::{MAX_RINGS, MIN_RINGS};
use morris_rust::moves::{NextMoves, legal_actions};
use morris_rust::rules::{Action, is_valid_action, is_valid_selection, reduce};
use morris_rust::state::{GameState, PerPlayer, Phase, Player, Turn, TurnKind};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn six_board() -> Arc<Board> {
    Arc::new(Board::generate(2, MillLayout::Rings).unwrap())
}

fn new_game() -> GameState {
    GameState::new(six_board())
}

/// Apply placements in order, alternating players as the rules dictate.
/// Every action must be accepted.
fn play(state: &GameState, actions: &[Action]) -> GameState {
    actions.iter().fold(state.clone(), |s, action| {
        let next = reduce(&s, action).unwrap();
        assert_ne!(next, s, "`{action}` was rejected");
        next
    })
}

fn places(ids: &[&str]) -> Vec<Action> {
    ids.iter().map(|&id| Action::place(id)).collect()
}

/// Assert that `action` leaves `state` untouched.
fn assert_rejected(state: &GameState, action: &Action) {
    assert!(!is_valid_action(action, state), "`{action}` should be invalid");
    assert_eq!(&reduce(state, action).unwrap(), state, "`{action}` changed the state");
}

/// A position in the movement phase: a on a, b, d and b on i, k, m.
fn movement_position() -> GameState {
    GameState::setup(
        six_board(),
        &[
            ("a", Player::A),
            ("b", Player::A),
            ("d", Player::A),
            ("i", Player::B),
            ("k", Player::B),
            ("m", Player::B),
        ],
        PerPlayer::new(0, 0),
        Turn::first(),
    )
    .unwrap()
}

// =============================================================================
// Topology
// =============================================================================

#[test]
fn test_topology_is_deterministic() {
    for rings in MIN_RINGS..=MAX_RINGS {
        for layout in [MillLayout::Rings, MillLayout::RingsAndSpokes] {
            let first = Board::generate(rings, layout).unwrap();
            let second = Board::generate(rings, layout).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.to_string(), second.to_string());
        }
    }
}

#[test]
fn test_largest_board_ids() {
    let board = Board::generate(MAX_RINGS, MillLayout::Rings).unwrap();
    assert_eq!(board.len(), 48);
    assert_eq!(&**board.id(0), "a");
    assert_eq!(&**board.id(26), "aa");
    assert_eq!(&**board.id(47), "vv");
    assert_eq!(board.parse_id("vv"), Some(47));
}

#[test]
fn test_unsupported_ring_counts_are_rejected() {
    assert!(matches!(
        GameState::generate(1, MillLayout::Rings),
        Err(MorrisError::UnsupportedRingCount { rings: 1, .. })
    ));
    assert!(matches!(
        GameState::generate(7, MillLayout::Rings),
        Err(MorrisError::UnsupportedRingCount { rings: 7, .. })
    ));
}

#[test]
fn test_mill_symmetry() {
    for rings in MIN_RINGS..=MAX_RINGS {
        let board = Arc::new(Board::generate(rings, MillLayout::RingsAndSpokes).unwrap());
        for (index, line) in board.lines().iter().enumerate() {
            let ids: Vec<&str> = line.iter().map(|&pt| &**board.id(pt)).collect();

            let full: Vec<(&str, Player)> = ids.iter().map(|&id| (id, Player::A)).collect();
            let state = GameState::setup(board.clone(), &full, PerPlayer::new(3, 3), Turn::first()).unwrap();
            assert_eq!(state.mills()[index].occupancy, Some(Player::A), "{ids:?}");

            for broken in 0..3 {
                let mut pieces = full.clone();
                pieces[broken].1 = Player::B;
                let state =
                    GameState::setup(board.clone(), &pieces, PerPlayer::new(3, 3), Turn::first()).unwrap();
                assert_eq!(state.mills()[index].occupancy, None, "{ids:?} with {} broken", ids[broken]);
            }
        }
    }
}

// =============================================================================
// End-to-end placement
// =============================================================================

#[test]
fn test_initial_state() {
    let state = new_game();
    assert_eq!(state.phase(), Phase::Placement);
    assert_eq!(state.remaining_men(), PerPlayer::new(6, 6));
    assert_eq!(
        state.turn(),
        Turn {
            count: 0,
            player: Player::A,
            kind: TurnKind::Regular
        }
    );
    assert_eq!(state.winner(), None);
}

#[test]
fn test_twelve_placements_without_mills_reach_movement() {
    let state = play(
        &new_game(),
        &places(&["a", "c", "b", "d", "e", "g", "f", "h", "i", "k", "j", "l"]),
    );
    assert_eq!(state.phase(), Phase::Movement);
    assert_eq!(state.remaining_men(), PerPlayer::new(0, 0));
    assert_eq!(state.turn().count, 12);
    assert_eq!(state.turn().player, Player::A);
    assert_eq!(state.turn().kind, TurnKind::Regular);
    assert!(state.mills().iter().all(|m| m.occupancy.is_none()));
    assert!(matches!(state.next_moves(), NextMoves::Moves(_)));

    // No further placements once the supply is gone.
    assert_rejected(&state, &Action::place("m"));
}

#[test]
fn test_mill_forces_removal_then_capture() {
    let state = play(&new_game(), &places(&["a", "i", "b", "j", "c"]));
    assert_eq!(
        state.turn(),
        Turn {
            count: 5,
            player: Player::A,
            kind: TurnKind::Remove
        }
    );
    assert_eq!(state.next_moves(), &NextMoves::Points(vec!["i".into(), "j".into()]));

    let after = reduce(&state, &Action::remove("i")).unwrap();
    assert_eq!(after.count_men_on_board(Player::B), 1);
    assert_eq!(after.occupant_of("i").unwrap(), None);
    assert_eq!(after.turn().player, Player::B);
    assert_eq!(after.turn().kind, TurnKind::Regular);
    assert_eq!(after.winner(), None, "no wins during placement");
}

#[test]
fn test_removal_only_targets_opponent() {
    let state = play(&new_game(), &places(&["a", "i", "b", "j", "c"]));
    assert_rejected(&state, &Action::remove("a"));
    assert_rejected(&state, &Action::remove("e"));
    assert_rejected(&state, &Action::remove("nowhere"));
}

#[test]
fn test_resting_mill_needs_reforming() {
    let state = play(&new_game(), &places(&["a", "i", "b", "j", "c"]));
    let state = play(&state, &[Action::remove("i")]);
    // The abc mill stays occupied but is spent: placing elsewhere grants nothing.
    let state = play(&state, &places(&["m", "g"]));
    assert_eq!(state.turn().player, Player::B);
    assert_eq!(state.turn().kind, TurnKind::Regular);
    assert_eq!(state.mills()[0].occupancy, Some(Player::A));
    assert!(!state.mills()[0].active);
}

// =============================================================================
// Mill-removal caveat
// =============================================================================

#[test]
fn test_milled_piece_protected_while_others_free() {
    // b closes ijk and takes e.
    let state = play(&new_game(), &places(&["a", "i", "b", "j", "e", "k"]));
    assert_eq!(state.turn().player, Player::B);
    assert!(state.turn().is_removal());
    let state = play(&state, &[Action::remove("e")]);

    // a closes abc while b has m outside its mill.
    let state = play(&state, &places(&["g", "m", "c"]));
    assert!(state.turn().is_removal());
    assert_eq!(state.turn().player, Player::A);

    assert_rejected(&state, &Action::remove("i"));
    assert_rejected(&state, &Action::remove("j"));
    assert!(is_valid_action(&Action::remove("m"), &state));
    assert_eq!(state.next_moves(), &NextMoves::Points(vec!["m".into()]));
}

#[test]
fn test_milled_piece_removable_when_all_milled() {
    let state = play(&new_game(), &places(&["a", "i", "b", "j", "e", "k"]));
    let state = play(&state, &[Action::remove("e")]);
    let state = play(&state, &places(&["c"]));
    assert!(state.turn().is_removal());

    for id in ["i", "j", "k"] {
        assert!(is_valid_action(&Action::remove(id), &state), "{id}");
    }
    let after = reduce(&state, &Action::remove("j")).unwrap();
    assert_eq!(after.mills()[4].occupancy, None, "ijk is broken");
}

// =============================================================================
// Movement legality
// =============================================================================

#[test]
fn test_movement_rules() {
    let state = movement_position();
    assert_eq!(state.phase(), Phase::Movement);

    assert_rejected(&state, &Action::movement("a", "c")); // not adjacent
    assert_rejected(&state, &Action::movement("a", "b")); // occupied
    assert_rejected(&state, &Action::movement("i", "j")); // not the mover's piece
    assert_rejected(&state, &Action::movement("c", "d")); // empty source
    assert_rejected(&state, &Action::place("c")); // placement is over
    assert_rejected(&state, &Action::remove("i")); // not a removal turn

    let moved = reduce(&state, &Action::movement("a", "h")).unwrap();
    assert_eq!(moved.occupant_of("a").unwrap(), None);
    assert_eq!(moved.occupant_of("h").unwrap(), Some(Player::A));
    assert_eq!(moved.turn().player, Player::B);
}

#[test]
fn test_move_rejected_while_men_remain() {
    let state = movement_position();
    let mut value = serde_json::to_value(&state).unwrap();
    value["remainingMen"] = json!({"a": 1, "b": 0});
    let state: GameState = serde_json::from_value(value).unwrap();
    assert_eq!(state.phase(), Phase::Movement);

    assert_rejected(&state, &Action::movement("a", "h"));
    assert!(state.next_moves().is_exhausted());
}

#[test]
fn test_selection() {
    let state = movement_position();
    assert!(is_valid_selection("a", &state));
    assert!(!is_valid_selection("i", &state));
    assert!(!is_valid_selection("c", &state));
}

#[test]
fn test_legal_actions_are_exactly_the_valid_ones() {
    let states = [
        new_game(),
        play(&new_game(), &places(&["a", "i", "b", "j", "c"])),
        movement_position(),
    ];
    for state in &states {
        let actions = legal_actions(state);
        assert_eq!(actions.len(), state.next_moves().count());
        for action in &actions {
            assert!(is_valid_action(action, state), "{action}");
        }
    }
}

// =============================================================================
// Winning
// =============================================================================

#[test]
fn test_win_threshold_in_movement() {
    let state = play(&movement_position(), &[Action::movement("d", "c")]);
    assert!(state.turn().is_removal());
    let state = play(&state, &[Action::remove("i")]);
    assert_eq!(state.winner(), Some(Player::A));
    assert!(state.is_terminal());
    assert!(state.next_moves().is_exhausted());

    // A decided game only accepts a reset.
    assert_rejected(&state, &Action::movement("k", "j"));
    assert_rejected(&state, &Action::movement("c", "d"));
    assert_eq!(reduce(&state, &Action::reset(None)).unwrap(), GameState::default());
}

#[test]
fn test_no_win_during_placement() {
    let state = GameState::setup(
        six_board(),
        &[
            ("a", Player::A),
            ("b", Player::A),
            ("i", Player::B),
            ("k", Player::B),
            ("m", Player::B),
        ],
        PerPlayer::new(1, 1),
        Turn::first(),
    )
    .unwrap();
    let state = play(&state, &[Action::place("c"), Action::remove("i")]);
    assert_eq!(state.count_men_on_board(Player::B), 2);
    assert_eq!(state.phase(), Phase::Placement);
    assert_eq!(state.winner(), None);
}

#[test]
fn test_phase_advances_only_once_supply_is_empty() {
    let state = GameState::setup(
        six_board(),
        &[("a", Player::A), ("i", Player::B)],
        PerPlayer::new(1, 1),
        Turn::first(),
    )
    .unwrap();
    let state = play(&state, &[Action::place("e")]);
    assert_eq!(state.phase(), Phase::Placement);
    let state = play(&state, &[Action::place("m")]);
    assert_eq!(state.phase(), Phase::Movement);
}

// =============================================================================
// Snapshots and reset
// =============================================================================

#[test]
fn test_reset_to_snapshot() {
    let snapshot = movement_position();
    let state = play(&new_game(), &places(&["a"]));
    let restored = reduce(&state, &Action::reset(Some(snapshot.clone()))).unwrap();
    assert_eq!(restored, snapshot);
}

#[test]
fn test_json_roundtrip_through_a_game() {
    let mut state = new_game();
    let sequence = places(&["a", "i", "b", "j", "c"]);
    for action in sequence.iter().chain([Action::remove("i")].iter()) {
        state = reduce(&state, action).unwrap();
        let text = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state, "after {action}");
    }
}

#[test]
fn test_reset_action_from_json() {
    let snapshot = serde_json::to_value(movement_position()).unwrap();
    let action: Action = serde_json::from_value(json!({"type": "reset", "state": snapshot})).unwrap();
    let state = reduce(&new_game(), &action).unwrap();
    assert_eq!(state, movement_position());
}

#[test]
fn test_unknown_action_is_rejected_at_the_boundary() {
    let err = serde_json::from_value::<Action>(json!({"type": "fly", "to": "a"}));
    assert!(err.is_err());
}
