//! The rules engine: a pure reducer from `(state, action)` to the next state.
//!
//! Illegal actions are not errors. The reducer logs a warning and returns the
//! prior state unchanged, so a stale or malicious action can never corrupt a
//! game. `Err` is reserved for broken invariants.
//!
//! Every successful transition runs the same pipeline on the new board:
//! mills, then turn, then winner (not after a placement), then phase, and
//! finally the legal-move index.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{Point, PointId};
use crate::constants::MIN_MEN_ON_BOARD;
use crate::error::MorrisError;
use crate::moves::next_valid_moves;
use crate::state::{GameState, Mill, Phase, Player, Turn, TurnKind};

/// Everything a player (or a reset) can do to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Put a man from the supply on an empty point.
    Place { to: PointId },
    /// Slide a man to an adjacent empty point.
    Move { from: PointId, to: PointId },
    /// Capture an opponent's man after closing a mill.
    Remove { to: PointId },
    /// Start over, from `state` if given or from the default board.
    Reset {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<Box<GameState>>,
    },
}

impl Action {
    pub fn place(to: impl Into<PointId>) -> Self {
        Action::Place { to: to.into() }
    }

    pub fn movement(from: impl Into<PointId>, to: impl Into<PointId>) -> Self {
        Action::Move {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn remove(to: impl Into<PointId>) -> Self {
        Action::Remove { to: to.into() }
    }

    pub fn reset(state: Option<GameState>) -> Self {
        Action::Reset {
            state: state.map(Box::new),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place { to } => write!(f, "place {to}"),
            Action::Move { from, to } => write!(f, "move {from} {to}"),
            Action::Remove { to } => write!(f, "remove {to}"),
            Action::Reset { state: None } => f.write_str("reset"),
            Action::Reset { state: Some(_) } => f.write_str("reset <snapshot>"),
        }
    }
}

/// Apply `action` to `state`.
///
/// # Errors
/// Only on internal invariant violations, such as an active mill that is
/// not occupied or a phase advancing past its last value.
pub fn reduce(state: &GameState, action: &Action) -> Result<GameState, MorrisError> {
    match action {
        Action::Place { to } => next_state_after_place(state, to),
        Action::Move { from, to } => next_state_after_move(state, from, to),
        Action::Remove { to } => next_state_after_remove(state, to),
        Action::Reset { state: Some(snapshot) } => Ok(snapshot.as_ref().clone().refreshed()),
        Action::Reset { state: None } => Ok(GameState::default()),
    }
}

fn next_state_after_place(state: &GameState, to: &str) -> Result<GameState, MorrisError> {
    let Some(pt) = state.board.parse_id(to).filter(|&pt| can_place(state, pt)) else {
        warn!(to, player = %state.turn.player, "invalid place action");
        return Ok(state.clone());
    };

    let player = state.turn.player;
    let mut next = state.clone();
    next.occupancy[pt] = Some(player);
    next.remaining_men[player] -= 1;

    // No win check here: men placed so far say nothing about a loss.
    advance(next, false)
}

fn next_state_after_move(state: &GameState, from: &str, to: &str) -> Result<GameState, MorrisError> {
    let board = &state.board;
    let points = board.parse_id(from).zip(board.parse_id(to));
    let Some((src, dst)) = points.filter(|&(src, dst)| can_move(state, src, dst)) else {
        warn!(from, to, player = %state.turn.player, "invalid move action");
        return Ok(state.clone());
    };

    let mut next = state.clone();
    next.occupancy[dst] = Some(state.turn.player);
    next.occupancy[src] = None;
    advance(next, true)
}

fn next_state_after_remove(state: &GameState, to: &str) -> Result<GameState, MorrisError> {
    let Some(pt) = state.board.parse_id(to).filter(|&pt| can_remove(state, pt)) else {
        warn!(to, player = %state.turn.player, "invalid remove action");
        return Ok(state.clone());
    };

    let mut next = state.clone();
    next.occupancy[pt] = None;
    advance(next, true)
}

/// Recompute every derived field after the board changed.
fn advance(mut next: GameState, check_winner: bool) -> Result<GameState, MorrisError> {
    next.mills = next_mills(&next)?;
    next.turn = next_turn(&next);
    if check_winner {
        next.winner = winner(&next);
        if let Some(player) = next.winner {
            debug!(%player, count = next.turn.count, "game decided");
        }
    }
    if is_next_phase(&next) {
        next.phase = next.phase.next()?;
        debug!(phase = %next.phase, count = next.turn.count, "phase advanced");
    }
    next.next_moves = next_valid_moves(&next);
    Ok(next)
}

/// Mills of `state` after its latest board change.
///
/// A standing mill that was active has been used for a capture and rests.
/// A line that just filled up becomes occupied and active. A broken mill is
/// cleared. Captures therefore need a mill to be broken and re-formed.
pub fn next_mills(state: &GameState) -> Result<Vec<Mill>, MorrisError> {
    state
        .mills
        .iter()
        .enumerate()
        .map(|(i, mill)| {
            let first = state.occupancy[mill.points[0]];
            let qualifies =
                first.is_some() && mill.points.iter().all(|&pt| state.occupancy[pt] == first);

            match (qualifies, mill.occupancy) {
                (true, Some(_)) => Ok(Mill {
                    active: false,
                    ..*mill
                }),
                (true, None) if mill.active => Err(MorrisError::MillInvariant { mill: i }),
                (true, None) => Ok(Mill {
                    occupancy: first,
                    active: true,
                    ..*mill
                }),
                (false, Some(_)) => Ok(Mill::open(mill.points)),
                (false, None) if mill.active => Err(MorrisError::MillInvariant { mill: i }),
                (false, None) => Ok(*mill),
            }
        })
        .collect()
}

/// The turn following `state`, whose mills are already updated.
///
/// A player who closes a mill on a regular turn keeps the move and must
/// capture. Otherwise play passes to the opponent.
pub fn next_turn(state: &GameState) -> Turn {
    let player = state.turn.player;
    let removal = !state.turn.is_removal()
        && state
            .mills
            .iter()
            .any(|mill| mill.active && mill.occupancy == Some(player));

    Turn {
        count: state.turn.count + 1,
        player: if removal { player } else { player.opponent() },
        kind: if removal {
            TurnKind::Remove
        } else {
            TurnKind::Regular
        },
    }
}

/// The winner of `state`, if any.
///
/// Wins are never reported during placement, where men still in the supply
/// make on-board counts meaningless. Later, a player with fewer than three
/// men on the board loses.
pub fn winner(state: &GameState) -> Option<Player> {
    if state.phase == Phase::Placement {
        return None;
    }
    Player::ALL
        .into_iter()
        .find(|&player| state.count_men_on_board(player) < MIN_MEN_ON_BOARD)
        .map(Player::opponent)
}

fn is_next_phase(state: &GameState) -> bool {
    match state.phase {
        Phase::Placement => state.remaining_men.a == 0 && state.remaining_men.b == 0,
        Phase::Movement | Phase::Flying => false,
    }
}

pub(crate) fn can_place(state: &GameState, to: Point) -> bool {
    let player = state.turn.player;
    !state.is_terminal()
        && state.phase == Phase::Placement
        && !state.turn.is_removal()
        && state.occupancy[to].is_none()
        && state.remaining_men[player] >= 1
}

pub(crate) fn can_move(state: &GameState, from: Point, to: Point) -> bool {
    let player = state.turn.player;
    !state.is_terminal()
        && state.phase == Phase::Movement
        && !state.turn.is_removal()
        && state.occupancy[to].is_none()
        && state.board.is_neighbor(from, to)
        && state.occupancy[from] == Some(player)
        && state.remaining_men[player] == 0
}

pub(crate) fn can_remove(state: &GameState, to: Point) -> bool {
    !state.is_terminal()
        && state.turn.is_removal()
        && state.occupancy[to] == Some(state.turn.player.opponent())
        && satisfies_mill_removal_caveat(state, to)
}

/// A man standing in a mill may only be taken when every other man of that
/// player stands in a mill as well.
fn satisfies_mill_removal_caveat(state: &GameState, to: Point) -> bool {
    if !state.is_part_of_mill(to) {
        return true;
    }
    let opponent = state.turn.player.opponent();
    state.pieces(opponent).all(|pt| state.is_part_of_mill(pt))
}

/// Points the mover may capture on, in board order.
pub(crate) fn removable_points(state: &GameState) -> Vec<Point> {
    if state.is_terminal() || !state.turn.is_removal() {
        return Vec::new();
    }
    let (milled, free): (Vec<Point>, Vec<Point>) = state
        .pieces(state.turn.player.opponent())
        .partition(|&pt| state.is_part_of_mill(pt));
    if free.is_empty() { milled } else { free }
}

/// Whether `action` would change `state`.
pub fn is_valid_action(action: &Action, state: &GameState) -> bool {
    let board = &state.board;
    match action {
        Action::Place { to } => board.parse_id(to).is_some_and(|pt| can_place(state, pt)),
        Action::Move { from, to } => board
            .parse_id(from)
            .zip(board.parse_id(to))
            .is_some_and(|(src, dst)| can_move(state, src, dst)),
        Action::Remove { to } => board.parse_id(to).is_some_and(|pt| can_remove(state, pt)),
        Action::Reset { .. } => true,
    }
}

/// Whether the player to act may pick up the man on `id`.
pub fn is_valid_selection(id: &str, state: &GameState) -> bool {
    state
        .board
        .parse_id(id)
        .is_some_and(|pt| state.occupancy[pt] == Some(state.turn.player))
}
