//! Computer opponents.
//!
//! Every strategy picks from the legal-move index of the state it is given,
//! so a returned action is always legal for that state. Randomized
//! strategies own a `fastrand::Rng` and can be seeded for reproducible games.

use std::fmt;
use std::str::FromStr;

use crate::board::{Point, PointId};
use crate::error::MorrisError;
use crate::minimax::MinimaxOpponent;
use crate::moves::NextMoves;
use crate::rules::Action;
use crate::state::{GameState, Phase};

/// A move-selection strategy.
pub trait Opponent {
    fn name(&self) -> &'static str;

    /// Choose an action for the player to act in `state`.
    ///
    /// # Errors
    /// [`MorrisError::NoLegalMove`] when `state` offers nothing to play,
    /// which includes decided games.
    fn select_move(&mut self, state: &GameState) -> Result<Action, MorrisError>;
}

/// Names accepted on the command line and by the text protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Random,
    Heuristic,
    Minimax,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Random, Strategy::Heuristic, Strategy::Minimax];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Random => f.write_str("random"),
            Strategy::Heuristic => f.write_str("heuristic"),
            Strategy::Minimax => f.write_str("minimax"),
        }
    }
}

impl FromStr for Strategy {
    type Err = MorrisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| MorrisError::UnknownStrategy(s.to_string()))
    }
}

/// Build an opponent. `depth` only matters for minimax.
pub fn make_opponent(strategy: Strategy, seed: Option<u64>, depth: u32) -> Box<dyn Opponent + Send> {
    let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    match strategy {
        Strategy::Random => Box::new(RandomOpponent { rng }),
        Strategy::Heuristic => Box::new(HeuristicOpponent { rng }),
        Strategy::Minimax => Box::new(MinimaxOpponent::new(depth)),
    }
}

fn no_legal_move(state: &GameState) -> MorrisError {
    MorrisError::NoLegalMove {
        player: state.turn().player,
    }
}

/// Uniform choice from the legal-move index.
///
/// In the movement phase a source piece that can move is drawn first, then
/// one of its destinations, so pieces are equally likely regardless of how
/// many destinations they have.
pub fn random_move(rng: &mut fastrand::Rng, state: &GameState) -> Result<Action, MorrisError> {
    if state.is_terminal() {
        return Err(no_legal_move(state));
    }
    match state.next_moves() {
        NextMoves::Points(points) if points.is_empty() => Err(no_legal_move(state)),
        NextMoves::Points(points) => {
            let to = points[rng.usize(..points.len())].clone();
            Ok(if state.turn().is_removal() {
                Action::Remove { to }
            } else {
                Action::Place { to }
            })
        }
        NextMoves::Moves(moves) => {
            let movable: Vec<&(PointId, Vec<PointId>)> =
                moves.iter().filter(|(_, to)| !to.is_empty()).collect();
            if movable.is_empty() {
                return Err(no_legal_move(state));
            }
            let (from, dests) = movable[rng.usize(..movable.len())];
            Ok(Action::Move {
                from: from.clone(),
                to: dests[rng.usize(..dests.len())].clone(),
            })
        }
    }
}

/// Picks any legal action with equal probability.
pub struct RandomOpponent {
    rng: fastrand::Rng,
}

impl RandomOpponent {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Opponent for RandomOpponent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select_move(&mut self, state: &GameState) -> Result<Action, MorrisError> {
        random_move(&mut self.rng, state)
    }
}

/// Greedy placement next to its own men; random everywhere else.
///
/// Captures pick uniformly among the legal targets. Movement has no
/// heuristic of its own and plays a random legal move.
pub struct HeuristicOpponent {
    rng: fastrand::Rng,
}

impl HeuristicOpponent {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Empty points adjacent to one of the mover's men, in board order.
    fn expansion_points(state: &GameState) -> Vec<Point> {
        let board = state.board();
        let player = state.turn().player;
        board
            .points()
            .filter(|&pt| state.occupant(pt).is_none())
            .filter(|&pt| {
                board
                    .neighbors(pt)
                    .iter()
                    .any(|&n| state.occupant(n) == Some(player))
            })
            .collect()
    }
}

impl Default for HeuristicOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Opponent for HeuristicOpponent {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn select_move(&mut self, state: &GameState) -> Result<Action, MorrisError> {
        if state.is_terminal() || state.turn().is_removal() || state.phase() != Phase::Placement {
            return random_move(&mut self.rng, state);
        }

        let candidates = Self::expansion_points(state);
        if candidates.is_empty() {
            return random_move(&mut self.rng, state);
        }
        let pt = candidates[self.rng.usize(..candidates.len())];
        Ok(Action::Place {
            to: state.board().id(pt).clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::board::{Board, MillLayout};
    use crate::rules::is_valid_action;
    use crate::state::{PerPlayer, Player, Turn};

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("random".parse::<Strategy>(), Ok(Strategy::Random));
        assert_eq!("Minimax".parse::<Strategy>(), Ok(Strategy::Minimax));
        assert_eq!(
            "greedy".parse::<Strategy>(),
            Err(MorrisError::UnknownStrategy("greedy".into()))
        );
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let state = GameState::default();
        let mut first = RandomOpponent::with_seed(7);
        let mut second = RandomOpponent::with_seed(7);
        for _ in 0..10 {
            assert_eq!(first.select_move(&state), second.select_move(&state));
        }
    }

    #[test]
    fn test_random_move_is_legal_in_movement() {
        let board = Arc::new(Board::generate(2, MillLayout::Rings).unwrap());
        let state = GameState::setup(
            board,
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
        let mut opponent = RandomOpponent::with_seed(3);
        for _ in 0..50 {
            let action = opponent.select_move(&state).unwrap();
            assert!(matches!(action, Action::Move { .. }));
            assert!(is_valid_action(&action, &state), "{action}");
        }
    }

    #[test]
    fn test_heuristic_places_next_to_own_men() {
        let board = Arc::new(Board::generate(2, MillLayout::Rings).unwrap());
        let state = GameState::setup(
            board,
            &[("a", Player::A), ("m", Player::B)],
            PerPlayer::new(5, 5),
            Turn::first(),
        )
        .unwrap();
        let mut opponent = HeuristicOpponent::with_seed(11);
        for _ in 0..30 {
            let action = opponent.select_move(&state).unwrap();
            assert!(
                action == Action::place("b") || action == Action::place("h"),
                "{action}"
            );
        }
    }

    #[test]
    fn test_heuristic_falls_back_without_own_men() {
        let state = GameState::generate(2, MillLayout::Rings).unwrap();
        let mut opponent = HeuristicOpponent::with_seed(5);
        let action = opponent.select_move(&state).unwrap();
        assert!(is_valid_action(&action, &state));
    }

    #[test]
    fn test_terminal_state_has_no_move() {
        let board = Arc::new(Board::generate(2, MillLayout::Rings).unwrap());
        let state = GameState::setup(
            board,
            &[("a", Player::A), ("c", Player::A), ("e", Player::A), ("i", Player::B)],
            PerPlayer::new(0, 0),
            Turn::first(),
        )
        .unwrap();
        for strategy in Strategy::ALL {
            let mut opponent = make_opponent(strategy, Some(1), 2);
            assert_eq!(
                opponent.select_move(&state),
                Err(MorrisError::NoLegalMove { player: Player::A }),
                "{}",
                opponent.name()
            );
        }
    }
}
