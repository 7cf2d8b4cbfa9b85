//! Constants for board geometry, piece supply, search and evaluation.
//!
//! Boards are built from concentric square rings. Each ring holds eight
//! points (four corners and four edge midpoints) and contributes three men
//! to each player's supply, so two rings give Six Men's Morris and three
//! rings give Nine Men's Morris.

// =============================================================================
// Board Geometry
// =============================================================================

/// Points on a single ring: four corners and four edge midpoints.
pub const POINTS_PER_RING: usize = 8;

/// Smallest supported number of rings.
pub const MIN_RINGS: usize = 2;

/// Largest supported number of rings (48 points).
pub const MAX_RINGS: usize = 6;

/// Ring count used when a game is reset without a snapshot (Nine Men's Morris).
pub const DEFAULT_RINGS: usize = 3;

/// Number of points forming a mill.
pub const MILL_LEN: usize = 3;

/// Same-ring mills per ring (one per side of the square).
pub const MILLS_PER_RING: usize = 4;

/// Alphabet used to build point identifiers (`a..z`, then `aa..zz`).
pub const ID_ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

// =============================================================================
// Piece Supply and Winning
// =============================================================================

/// Men each player receives per ring on the board.
pub const MEN_PER_RING: u32 = 3;

/// A player in the movement phase loses once fewer than this many men remain.
pub const MIN_MEN_ON_BOARD: usize = 3;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default minimax search depth in plies.
pub const MINIMAX_DEPTH: u32 = 6;

// =============================================================================
// Evaluation Weights
// =============================================================================

/// Weights of the evaluation features for one phase of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    /// A mill was just closed (the side to move is capturing).
    pub ismill: i32,
    /// Difference in occupied mills.
    pub mills: i32,
    /// Difference in blocked men (opponent minus own).
    pub blocks: i32,
    /// Difference in men on the board.
    pub men: i32,
    /// Decided game.
    pub win: i32,
}

/// Placement phase: `18*ismill + 26*mills + 1*blocks + 9*men`.
///
/// The `blocks` term is not part of the classic three-term placement score
/// (`18*ismill + 26*mills + 9*men`). Setting `blocks` to 0 here and in
/// [`MOVEMENT_WEIGHTS`] restores that scoring.
pub const PLACEMENT_WEIGHTS: Weights = Weights {
    ismill: 18,
    mills: 26,
    blocks: 1,
    men: 9,
    win: 0,
};

/// Movement phase: `14*ismill + 43*mills + 10*blocks + 11*men + 1086*win`.
///
/// As with placement, `blocks` is an addition to the classic score.
pub const MOVEMENT_WEIGHTS: Weights = Weights {
    ismill: 14,
    mills: 43,
    blocks: 10,
    men: 11,
    win: 1086,
};

/// Flying phase is not implemented, so every state scores zero.
pub const FLYING_WEIGHTS: Weights = Weights {
    ismill: 0,
    mills: 0,
    blocks: 0,
    men: 0,
    win: 0,
};

// =============================================================================
// Relay
// =============================================================================

/// Default TCP port of the relay server.
pub const DEFAULT_RELAY_PORT: u16 = 1337;

/// Number of seats at a relayed table.
pub const RELAY_SEATS: usize = 2;
