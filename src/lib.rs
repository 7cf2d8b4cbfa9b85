//! Morris-Rust: rules engine and computer opponents for N men's morris.
//!
//! Boards are made of two to six concentric rings, which covers Six and
//! Nine Men's Morris and their larger cousins. Game states are immutable
//! values threaded through a pure reducer; opponents search the same
//! reducer to pick their moves.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, piece supply and evaluation weights
//! - [`board`] - Point graph and mill lines for a given ring count
//! - [`state`] - Players, phases, turns, mills and the game state
//! - [`rules`] - Actions and the reducer
//! - [`moves`] - Legal-move enumeration
//! - [`snapshot`] - JSON form of a game state
//! - [`opponent`] - Random and heuristic opponents
//! - [`minimax`] - Alpha-beta opponent and evaluation function
//! - [`session`] - A game owned by its caller, with background thinking
//! - [`protocol`] - Text protocol for scripting and debugging
//! - [`relay`] - Two-seat TCP relay
//!
//! ## Example
//!
//! ```
//! use morris_rust::board::MillLayout;
//! use morris_rust::minimax::search;
//! use morris_rust::rules::{Action, reduce};
//! use morris_rust::state::{GameState, Player};
//!
//! // Six Men's Morris
//! let state = GameState::generate(2, MillLayout::Rings).unwrap();
//!
//! // Play a move
//! let state = reduce(&state, &Action::place("a")).unwrap();
//! assert_eq!(state.turn().player, Player::B);
//!
//! // Search for the best reply
//! let best = search(&state, 2).unwrap();
//! println!("Best reply: {}", best.action);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod minimax;
pub mod moves;
pub mod opponent;
pub mod protocol;
pub mod relay;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod state;

pub use error::MorrisError;
