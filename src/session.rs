//! A single game owned by its caller.
//!
//! [`Session`] holds the authoritative [`GameState`] of one game. Several
//! sessions can run side by side without sharing anything. Computer moves
//! can be computed on a background thread with [`Session::think`]; the
//! result is only applied by [`Session::commit`] if the session still holds
//! the exact state the opponent looked at.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::board::Board;
use crate::error::MorrisError;
use crate::opponent::Opponent;
use crate::rules::{Action, reduce};
use crate::state::GameState;

type ThinkingResult = (Box<dyn Opponent + Send>, Result<Action, MorrisError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: GameState,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_state(GameState::default())
    }
}

impl Session {
    /// A fresh game on `board`.
    pub fn new(board: Arc<Board>) -> Self {
        Self::from_state(GameState::new(board))
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Arc<Board> {
        self.state.board()
    }

    /// Run `action` through the reducer. Returns whether the state changed.
    ///
    /// # Errors
    /// Invariant failures from [`reduce`]. The session keeps its prior state.
    pub fn dispatch(&mut self, action: &Action) -> Result<bool, MorrisError> {
        let next = reduce(&self.state, action)?;
        if next == self.state {
            return Ok(false);
        }
        if next.winner().is_some() && self.state.winner().is_none() {
            info!(winner = ?next.winner(), turns = next.turn().count, "game over");
        }
        self.state = next;
        Ok(true)
    }

    /// Start over on the current board.
    pub fn reset(&mut self) {
        self.state = GameState::new(self.state.board().clone());
    }

    /// Let `opponent` pick a move and apply it right away.
    ///
    /// # Errors
    /// Whatever the opponent or the reducer report.
    pub fn play(&mut self, opponent: &mut dyn Opponent) -> Result<Action, MorrisError> {
        let action = opponent.select_move(&self.state)?;
        self.dispatch(&action)?;
        Ok(action)
    }

    /// Let `opponent` pick a move for the current state on a background
    /// thread, after waiting `delay`.
    pub fn think(&self, mut opponent: Box<dyn Opponent + Send>, delay: Duration) -> Thinking {
        let state = self.state.clone();
        let snapshot = state.clone();
        let (tx, rx) = channel();

        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let action = opponent.select_move(&snapshot);
            let _ = tx.send((opponent, action));
        });

        Thinking {
            state,
            receiver: rx,
        }
    }

    /// Wait for `thinking` and apply its move unless the game moved on.
    ///
    /// # Errors
    /// [`MorrisError::ThinkingAborted`] if the thread died, the opponent's own
    /// error for a current decision, or an invariant failure from the reducer.
    pub fn commit(&mut self, thinking: Thinking) -> Result<Decision, MorrisError> {
        let (opponent, action) = thinking
            .receiver
            .recv()
            .map_err(|_| MorrisError::ThinkingAborted)?;

        if thinking.state != self.state {
            debug!(
                opponent = opponent.name(),
                computed_at = thinking.state.turn().count,
                current = self.state.turn().count,
                "discarding stale decision"
            );
            return Ok(Decision {
                opponent,
                action: action.ok(),
                applied: false,
            });
        }

        let action = action?;
        let applied = self.dispatch(&action)?;
        Ok(Decision {
            opponent,
            action: Some(action),
            applied,
        })
    }
}

/// A move being computed in the background.
pub struct Thinking {
    state: GameState,
    receiver: Receiver<ThinkingResult>,
}

impl Thinking {
    /// The state the opponent is looking at.
    pub fn state(&self) -> &GameState {
        &self.state
    }
}

/// Outcome of [`Session::commit`]. The opponent is handed back for reuse.
pub struct Decision {
    pub opponent: Box<dyn Opponent + Send>,
    pub action: Option<Action>,
    pub applied: bool,
}
