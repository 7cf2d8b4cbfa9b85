//! Legal-move enumeration.
//!
//! During placement and removal turns the mover only picks a target point,
//! so the legal moves are a flat list. In the movement phase the mover has
//! not chosen a piece yet, so legal destinations are listed for every piece
//! they own. This lets a UI highlight destinations for whichever piece gets
//! selected without the core knowing about selection.

use serde::{Deserialize, Serialize};

use crate::board::PointId;
use crate::rules::{Action, can_move, can_place, removable_points};
use crate::state::{GameState, Phase};

/// The legal-move index stored in every [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextMoves {
    /// Points that may be placed on or removed from.
    Points(Vec<PointId>),
    /// For each piece of the mover, the points it may slide to.
    Moves(#[serde(with = "crate::snapshot::ordered_map")] Vec<(PointId, Vec<PointId>)>),
}

impl NextMoves {
    /// Number of distinct actions described.
    pub fn count(&self) -> usize {
        match self {
            NextMoves::Points(points) => points.len(),
            NextMoves::Moves(moves) => moves.iter().map(|(_, to)| to.len()).sum(),
        }
    }

    /// True when the mover has nothing legal to do.
    pub fn is_exhausted(&self) -> bool {
        self.count() == 0
    }

    /// Legal destinations of the piece on `from` (movement phase only).
    pub fn destinations(&self, from: &str) -> &[PointId] {
        match self {
            NextMoves::Points(_) => &[],
            NextMoves::Moves(moves) => moves
                .iter()
                .find(|(source, _)| &**source == from)
                .map(|(_, to)| to.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// Compute the legal-move index of `state`.
///
/// Expects mills, turn and phase to be up to date.
pub fn next_valid_moves(state: &GameState) -> NextMoves {
    if state.is_terminal() {
        return NextMoves::Points(Vec::new());
    }

    if state.turn.is_removal() {
        return NextMoves::Points(
            removable_points(state)
                .into_iter()
                .map(|pt| state.id(pt))
                .collect(),
        );
    }

    match state.phase {
        Phase::Placement => NextMoves::Points(
            state
                .board
                .points()
                .filter(|&pt| can_place(state, pt))
                .map(|pt| state.id(pt))
                .collect(),
        ),
        Phase::Movement => NextMoves::Moves(
            state
                .pieces(state.turn.player)
                .map(|from| {
                    let to = state
                        .board
                        .neighbors(from)
                        .iter()
                        .filter(|&&to| can_move(state, from, to))
                        .map(|&to| state.id(to))
                        .collect();
                    (state.id(from), to)
                })
                .collect(),
        ),
        // TODO: flying moves once phase three gets rules of its own.
        Phase::Flying => NextMoves::Points(Vec::new()),
    }
}

/// Expand the legal-move index of `state` into actions, in index order.
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    match &state.next_moves {
        NextMoves::Points(points) if state.turn.is_removal() => {
            points.iter().map(|to| Action::Remove { to: to.clone() }).collect()
        }
        NextMoves::Points(points) => points
            .iter()
            .map(|to| Action::Place { to: to.clone() })
            .collect(),
        NextMoves::Moves(moves) => moves
            .iter()
            .flat_map(|(from, dests)| {
                dests.iter().map(move |to| Action::Move {
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::board::{Board, MillLayout};
    use crate::state::{PerPlayer, Player, Turn, TurnKind};

    fn six_board() -> Arc<Board> {
        Arc::new(Board::generate(2, MillLayout::Rings).unwrap())
    }

    fn ids(points: &[PointId]) -> Vec<&str> {
        points.iter().map(|p| &**p).collect()
    }

    #[test]
    fn test_placement_lists_empty_points() {
        let state = GameState::setup(
            six_board(),
            &[("a", Player::A), ("i", Player::B)],
            PerPlayer::new(5, 5),
            Turn::first(),
        )
        .unwrap();
        let NextMoves::Points(points) = state.next_moves() else {
            panic!("placement uses a point list");
        };
        assert_eq!(points.len(), 14);
        assert!(!ids(points).contains(&"a"));
        assert!(!ids(points).contains(&"i"));
        assert_eq!(legal_actions(&state).len(), 14);
    }

    #[test]
    fn test_movement_maps_every_piece() {
        let state = GameState::setup(
            six_board(),
            &[
                ("a", Player::A),
                ("c", Player::A),
                ("e", Player::A),
                ("b", Player::B),
                ("h", Player::B),
                ("k", Player::B),
            ],
            PerPlayer::new(0, 0),
            Turn::first(),
        )
        .unwrap();
        let NextMoves::Moves(moves) = state.next_moves() else {
            panic!("movement uses a per-piece map");
        };
        let sources: Vec<&str> = moves.iter().map(|(from, _)| &**from).collect();
        assert_eq!(sources, ["a", "c", "e"]);
        assert!(state.next_moves().destinations("a").is_empty(), "a is boxed in by b and h");
        assert_eq!(ids(state.next_moves().destinations("c")), ["d"]);
        assert_eq!(ids(state.next_moves().destinations("e")), ["d", "f"]);
        assert_eq!(state.next_moves().count(), 3);

        let actions = legal_actions(&state);
        assert_eq!(
            actions,
            [
                Action::movement("c", "d"),
                Action::movement("e", "d"),
                Action::movement("e", "f"),
            ]
        );
    }

    #[test]
    fn test_removal_lists_opponent_pieces() {
        let state = GameState::setup(
            six_board(),
            &[("a", Player::A), ("i", Player::B), ("m", Player::B)],
            PerPlayer::new(4, 4),
            Turn {
                count: 5,
                player: Player::A,
                kind: TurnKind::Remove,
            },
        )
        .unwrap();
        assert_eq!(
            state.next_moves(),
            &NextMoves::Points(vec!["i".into(), "m".into()])
        );
        assert_eq!(legal_actions(&state), [Action::remove("i"), Action::remove("m")]);
    }

    #[test]
    fn test_terminal_state_has_no_moves() {
        let state = GameState::setup(
            six_board(),
            &[("a", Player::A), ("c", Player::A), ("e", Player::A), ("i", Player::B)],
            PerPlayer::new(0, 0),
            Turn::first(),
        )
        .unwrap();
        assert_eq!(state.winner(), Some(Player::A));
        assert!(state.next_moves().is_exhausted());
        assert!(legal_actions(&state).is_empty());
    }
}
