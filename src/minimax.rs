//! Minimax search with alpha-beta pruning.
//!
//! The tree is walked through the reducer itself, so every node is a real
//! [`GameState`] and only legal actions are ever expanded. Scores are taken
//! from the point of view of the player to act at the root. A node is
//! maximizing whenever that player is to act, which keeps capture turns
//! (the same player acting twice) scored correctly.

use tracing::debug;

use crate::constants::{FLYING_WEIGHTS, MINIMAX_DEPTH, MOVEMENT_WEIGHTS, PLACEMENT_WEIGHTS, Weights};
use crate::error::MorrisError;
use crate::moves::legal_actions;
use crate::opponent::Opponent;
use crate::rules::{Action, reduce};
use crate::state::{GameState, Phase, Player};

/// Raw evaluation features, each signed in favour of the evaluating player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    /// +1 when the evaluating player is about to capture, -1 for the opponent.
    pub ismill: i32,
    pub mills: i32,
    /// Blocked opponent men minus blocked own men.
    pub blocks: i32,
    pub men: i32,
    /// +1 won, -1 lost, 0 undecided.
    pub win: i32,
}

impl Features {
    pub fn score(&self, weights: &Weights) -> i32 {
        weights.ismill * self.ismill
            + weights.mills * self.mills
            + weights.blocks * self.blocks
            + weights.men * self.men
            + weights.win * self.win
    }
}

fn diff(own: usize, other: usize) -> i32 {
    own as i32 - other as i32
}

/// Evaluation features of `state` for player `me`.
pub fn features(state: &GameState, me: Player) -> Features {
    let opp = me.opponent();
    let turn = state.turn();

    let ismill = match (turn.is_removal(), turn.player == me) {
        (true, true) => 1,
        (true, false) => -1,
        (false, _) => 0,
    };
    let win = match state.winner() {
        Some(player) if player == me => 1,
        Some(_) => -1,
        None => 0,
    };

    Features {
        ismill,
        mills: diff(state.count_mills(me), state.count_mills(opp)),
        blocks: diff(state.count_blocked(opp), state.count_blocked(me)),
        men: diff(state.count_men_on_board(me), state.count_men_on_board(opp)),
        win,
    }
}

/// Static evaluation of `state` for `me`, weighted by phase.
pub fn evaluate(state: &GameState, me: Player) -> i32 {
    let weights = match state.phase() {
        Phase::Placement => &PLACEMENT_WEIGHTS,
        Phase::Movement => &MOVEMENT_WEIGHTS,
        Phase::Flying => &FLYING_WEIGHTS,
    };
    features(state, me).score(weights)
}

/// Outcome of a root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub action: Action,
    pub evaluation: i32,
    /// Nodes visited below the root.
    pub nodes: u64,
}

struct Searcher {
    me: Player,
    nodes: u64,
}

impl Searcher {
    fn minimax(&mut self, state: &GameState, depth: u32, mut alpha: i32, mut beta: i32) -> Result<i32, MorrisError> {
        self.nodes += 1;
        if depth == 0 || state.is_terminal() {
            return Ok(evaluate(state, self.me));
        }
        let actions = legal_actions(state);
        if actions.is_empty() {
            return Ok(evaluate(state, self.me));
        }

        if state.turn().player == self.me {
            let mut best = i32::MIN;
            for action in &actions {
                let child = reduce(state, action)?;
                best = best.max(self.minimax(&child, depth - 1, alpha, beta)?);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            Ok(best)
        } else {
            let mut best = i32::MAX;
            for action in &actions {
                let child = reduce(state, action)?;
                best = best.min(self.minimax(&child, depth - 1, alpha, beta)?);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            Ok(best)
        }
    }
}

/// Search `depth` plies (at least one) below `state` and pick the best action.
///
/// Ties keep the first action in legal-move order, so the result is fully
/// deterministic.
///
/// # Errors
/// [`MorrisError::NoLegalMove`] if the root offers no action, plus any
/// invariant failure raised by the reducer during the walk.
pub fn search(state: &GameState, depth: u32) -> Result<SearchResult, MorrisError> {
    let me = state.turn().player;
    let actions = if state.is_terminal() {
        Vec::new()
    } else {
        legal_actions(state)
    };

    let mut searcher = Searcher { me, nodes: 0 };
    let mut best: Option<(Action, i32)> = None;
    let mut alpha = i32::MIN;
    for action in actions {
        let child = reduce(state, &action)?;
        let score = searcher.minimax(&child, depth.max(1) - 1, alpha, i32::MAX)?;
        if best.as_ref().is_none_or(|&(_, top)| score > top) {
            best = Some((action, score));
        }
        alpha = alpha.max(score);
    }

    let (action, evaluation) = best.ok_or(MorrisError::NoLegalMove { player: me })?;
    Ok(SearchResult {
        action,
        evaluation,
        nodes: searcher.nodes,
    })
}

/// Alpha-beta opponent with a fixed search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimaxOpponent {
    depth: u32,
}

impl MinimaxOpponent {
    pub fn new(depth: u32) -> Self {
        Self { depth: depth.max(1) }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Default for MinimaxOpponent {
    fn default() -> Self {
        Self::new(MINIMAX_DEPTH)
    }
}

impl Opponent for MinimaxOpponent {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn select_move(&mut self, state: &GameState) -> Result<Action, MorrisError> {
        let result = search(state, self.depth)?;
        debug!(
            action = %result.action,
            evaluation = result.evaluation,
            nodes = result.nodes,
            depth = self.depth,
            "minimax search finished"
        );
        Ok(result.action)
    }
}
