//! Game state model.
//!
//! A [`GameState`] is never mutated in place by callers. The reducer in
//! [`crate::rules`] clones the prior state, applies one action and recomputes
//! every derived field (mills, turn, winner, phase and the legal-move index).
//! The board topology is shared between states behind an [`Arc`], so a clone
//! only copies occupancy and mill bookkeeping.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Board, MillLayout, MillLine, Point, PointId};
use crate::constants::{DEFAULT_RINGS, MEN_PER_RING, POINTS_PER_RING};
use crate::error::MorrisError;
use crate::moves::{NextMoves, next_valid_moves};
use crate::rules::winner;
use crate::snapshot::GameStateRepr;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves first.
    #[serde(rename = "a")]
    A,
    #[serde(rename = "b")]
    B,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::A, Player::B];

    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => f.write_str("a"),
            Player::B => f.write_str("b"),
        }
    }
}

/// Game phase. Serialized as its number (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    /// Men are placed on empty points.
    Placement = 1,
    /// Men slide to adjacent empty points.
    Movement = 2,
    /// Reserved. Not reachable by the current rules.
    Flying = 3,
}

impl Phase {
    /// The following phase.
    ///
    /// # Errors
    /// [`MorrisError::PhaseOverflow`] when called on [`Phase::Flying`].
    pub fn next(self) -> Result<Self, MorrisError> {
        match self {
            Phase::Placement => Ok(Phase::Movement),
            Phase::Movement => Ok(Phase::Flying),
            Phase::Flying => Err(MorrisError::PhaseOverflow),
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = MorrisError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Phase::Placement),
            2 => Ok(Phase::Movement),
            3 => Ok(Phase::Flying),
            other => Err(MorrisError::InvalidPhase(other)),
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase as u8
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Placement => f.write_str("placement"),
            Phase::Movement => f.write_str("movement"),
            Phase::Flying => f.write_str("flying"),
        }
    }
}

/// Whether a turn is an ordinary move or a forced capture after a mill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    #[default]
    Regular,
    Remove,
}

impl fmt::Display for TurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnKind::Regular => f.write_str("regular"),
            TurnKind::Remove => f.write_str("remove"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Turn {
    /// Number of transitions applied so far.
    pub count: u32,
    /// Player to act.
    pub player: Player,
    #[serde(rename = "type")]
    pub kind: TurnKind,
}

impl Turn {
    /// Opening turn: player `a`, regular, count 0.
    pub fn first() -> Self {
        Self {
            count: 0,
            player: Player::A,
            kind: TurnKind::Regular,
        }
    }

    pub fn is_removal(&self) -> bool {
        self.kind == TurnKind::Remove
    }
}

impl Default for Turn {
    fn default() -> Self {
        Self::first()
    }
}

/// A value held for each player, serialized as `{"a": .., "b": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PerPlayer<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerPlayer<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }
}

impl<T> Index<Player> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: Player) -> &T {
        match player {
            Player::A => &self.a,
            Player::B => &self.b,
        }
    }
}

impl<T> IndexMut<Player> for PerPlayer<T> {
    fn index_mut(&mut self, player: Player) -> &mut T {
        match player {
            Player::A => &mut self.a,
            Player::B => &mut self.b,
        }
    }
}

/// A mill line together with its standing.
///
/// `active` marks a mill completed by the latest transition; it grants one
/// capture and then rests until broken and re-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mill {
    pub points: MillLine,
    pub occupancy: Option<Player>,
    pub active: bool,
}

impl Mill {
    /// An unoccupied, inactive mill.
    pub fn open(points: MillLine) -> Self {
        Self {
            points,
            occupancy: None,
            active: false,
        }
    }

    pub fn contains(&self, pt: Point) -> bool {
        self.points.contains(&pt)
    }
}

/// The aggregate game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameStateRepr", into = "GameStateRepr")]
pub struct GameState {
    pub(crate) board: Arc<Board>,
    pub(crate) phase: Phase,
    pub(crate) turn: Turn,
    pub(crate) occupancy: Vec<Option<Player>>,
    pub(crate) mills: Vec<Mill>,
    pub(crate) remaining_men: PerPlayer<u32>,
    pub(crate) winner: Option<Player>,
    pub(crate) next_moves: NextMoves,
}

impl Default for GameState {
    /// Nine Men's Morris (three rings, same-ring mills).
    fn default() -> Self {
        Self::new(Arc::new(Board::build(DEFAULT_RINGS, MillLayout::Rings)))
    }
}

impl GameState {
    /// Initial state for `board`: empty points, full supply, `a` to place.
    pub fn new(board: Arc<Board>) -> Self {
        let men = (board.len() / POINTS_PER_RING) as u32 * MEN_PER_RING;
        let mills = board.lines().iter().copied().map(Mill::open).collect();
        let occupancy = vec![None; board.len()];
        Self {
            board,
            phase: Phase::Placement,
            turn: Turn::first(),
            occupancy,
            mills,
            remaining_men: PerPlayer::new(men, men),
            winner: None,
            next_moves: NextMoves::Points(Vec::new()),
        }
        .refreshed()
    }

    /// Initial state for a freshly generated board.
    pub fn generate(rings: usize, layout: MillLayout) -> Result<Self, MorrisError> {
        Ok(Self::new(Arc::new(Board::generate(rings, layout)?)))
    }

    /// Arrange a position directly.
    ///
    /// The phase is placement while either player still has men to place and
    /// movement otherwise. Lines already filled by one player are treated as
    /// resting mills (occupied, not active), so they grant no capture.
    ///
    /// # Errors
    /// [`MorrisError::UnknownPoint`] if a piece names a point not on `board`.
    pub fn setup(
        board: Arc<Board>,
        pieces: &[(&str, Player)],
        remaining_men: PerPlayer<u32>,
        turn: Turn,
    ) -> Result<Self, MorrisError> {
        let mut occupancy = vec![None; board.len()];
        for &(id, player) in pieces {
            let pt = board
                .parse_id(id)
                .ok_or_else(|| MorrisError::UnknownPoint(id.to_string()))?;
            occupancy[pt] = Some(player);
        }

        let mills = board
            .lines()
            .iter()
            .map(|&points| {
                let first = occupancy[points[0]];
                let standing = first.filter(|_| points.iter().all(|&p| occupancy[p] == first));
                Mill {
                    points,
                    occupancy: standing,
                    active: false,
                }
            })
            .collect();

        let phase = if remaining_men.a > 0 || remaining_men.b > 0 {
            Phase::Placement
        } else {
            Phase::Movement
        };

        let mut state = Self {
            board,
            phase,
            turn,
            occupancy,
            mills,
            remaining_men,
            winner: None,
            next_moves: NextMoves::Points(Vec::new()),
        };
        state.winner = winner(&state);
        Ok(state.refreshed())
    }

    /// Recompute the legal-move index. Always the last step of a transition.
    pub(crate) fn refreshed(mut self) -> Self {
        self.next_moves = next_valid_moves(&self);
        self
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn remaining_men(&self) -> PerPlayer<u32> {
        self.remaining_men
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// A decided game accepts no further moves, only a reset.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    pub fn mills(&self) -> &[Mill] {
        &self.mills
    }

    /// Legal moves for the player to act.
    pub fn next_moves(&self) -> &NextMoves {
        &self.next_moves
    }

    pub fn occupant(&self, pt: Point) -> Option<Player> {
        self.occupancy[pt]
    }

    /// Occupant of the point named `id`.
    ///
    /// # Errors
    /// [`MorrisError::UnknownPoint`] if `id` is not on the board.
    pub fn occupant_of(&self, id: &str) -> Result<Option<Player>, MorrisError> {
        self.board
            .parse_id(id)
            .map(|pt| self.occupancy[pt])
            .ok_or_else(|| MorrisError::UnknownPoint(id.to_string()))
    }

    /// Points occupied by `player`, in board order.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Point> + '_ {
        self.board
            .points()
            .filter(move |&pt| self.occupancy[pt] == Some(player))
    }

    pub fn count_men_on_board(&self, player: Player) -> usize {
        self.occupancy.iter().filter(|&&o| o == Some(player)).count()
    }

    /// Whether the man on `pt` belongs to one of its owner's standing mills.
    pub fn is_part_of_mill(&self, pt: Point) -> bool {
        let Some(owner) = self.occupancy[pt] else {
            return false;
        };
        self.mills
            .iter()
            .any(|mill| mill.contains(pt) && mill.occupancy == Some(owner))
    }

    /// Number of mills currently occupied by `player`.
    pub fn count_mills(&self, player: Player) -> usize {
        self.mills
            .iter()
            .filter(|mill| mill.occupancy == Some(player))
            .count()
    }

    /// Men of `player` with no empty neighbor.
    pub fn count_blocked(&self, player: Player) -> usize {
        self.pieces(player)
            .filter(|&pt| {
                self.board
                    .neighbors(pt)
                    .iter()
                    .all(|&n| self.occupancy[n].is_some())
            })
            .count()
    }

    pub(crate) fn id(&self, pt: Point) -> PointId {
        self.board.id(pt).clone()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "phase {} ({}), turn {}: {} to act ({}), remaining a={} b={}",
            u8::from(self.phase),
            self.phase,
            self.turn.count,
            self.turn.player,
            self.turn.kind,
            self.remaining_men.a,
            self.remaining_men.b,
        )?;
        let points: Vec<Point> = self.board.points().collect();
        for (ring, chunk) in points.chunks(POINTS_PER_RING).enumerate() {
            write!(f, "ring {ring}:")?;
            for &pt in chunk {
                let mark = match self.occupancy[pt] {
                    Some(Player::A) => 'A',
                    Some(Player::B) => 'B',
                    None => '.',
                };
                write!(f, " {}={mark}", self.board.id(pt))?;
            }
            writeln!(f)?;
        }
        if let Some(player) = self.winner {
            writeln!(f, "winner: {player}")?;
        }
        Ok(())
    }
}
