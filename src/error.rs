//! Error type for the morris engine.
//!
//! Rejected player actions are not errors: the reducer hands back the prior
//! state. Everything here is either a construction failure or a broken
//! internal invariant.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorrisError {
    #[error("unsupported ring count {rings}: boards need between {min} and {max} rings")]
    UnsupportedRingCount { rings: usize, min: usize, max: usize },

    #[error("invalid phase value {0}")]
    InvalidPhase(u8),

    #[error("phase cannot advance past the flying phase")]
    PhaseOverflow,

    #[error("mill {mill} is active but unoccupied")]
    MillInvariant { mill: usize },

    #[error("no legal move available for player {player}")]
    NoLegalMove { player: crate::state::Player },

    #[error("unknown point `{0}`")]
    UnknownPoint(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unknown strategy `{0}` (expected random, heuristic or minimax)")]
    UnknownStrategy(String),

    #[error("opponent thread stopped before producing a move")]
    ThinkingAborted,
}
