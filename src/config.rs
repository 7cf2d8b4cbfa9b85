//! Game settings shared by every subcommand.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::board::{Board, MillLayout};
use crate::constants::{DEFAULT_RINGS, MINIMAX_DEPTH};
use crate::error::MorrisError;
use crate::opponent::{Opponent, Strategy, make_opponent};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct GameConfig {
    /// Number of concentric rings (2 = six men, 3 = nine men)
    #[arg(long, default_value_t = DEFAULT_RINGS)]
    pub rings: usize,

    /// Also count radial lines across three rings as mills
    #[arg(long)]
    pub spoke_mills: bool,

    /// Minimax search depth in plies
    #[arg(long, default_value_t = MINIMAX_DEPTH)]
    pub depth: u32,

    /// Artificial delay before a computer move, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub think_ms: u64,

    /// Seed for the randomized opponents
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rings: DEFAULT_RINGS,
            spoke_mills: false,
            depth: MINIMAX_DEPTH,
            think_ms: 0,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn layout(&self) -> MillLayout {
        if self.spoke_mills {
            MillLayout::RingsAndSpokes
        } else {
            MillLayout::Rings
        }
    }

    /// # Errors
    /// [`MorrisError::UnsupportedRingCount`] for an out-of-range `rings`.
    pub fn board(&self) -> Result<Arc<Board>, MorrisError> {
        Ok(Arc::new(Board::generate(self.rings, self.layout())?))
    }

    pub fn session(&self) -> Result<Session, MorrisError> {
        Ok(Session::new(self.board()?))
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_ms)
    }

    /// An opponent for `strategy`. `salt` keeps two seeded opponents from
    /// mirroring each other.
    pub fn opponent(&self, strategy: Strategy, salt: u64) -> Box<dyn Opponent + Send> {
        let seed = self.seed.map(|seed| seed.wrapping_add(salt));
        make_opponent(strategy, seed, self.depth)
    }
}
