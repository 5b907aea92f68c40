//! Constants for board geometry, heuristic weights, and search defaults.
//!
//! The board is a fixed 6x7 grid stored bottom-to-top: row 0 is the row a
//! piece lands on first.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Number of aligned pieces needed to win.
pub const CONNECT: usize = 4;

// =============================================================================
// Heuristic Weights
// =============================================================================

/// Score when the evaluated player already has four in a row.
pub const WIN_SCORE: f64 = 1e15;

/// Score when the opponent already has four in a row. Deliberately not the
/// negation of `WIN_SCORE`.
pub const LOSS_SCORE: f64 = -1e14;

/// Bonus per open window holding three of the evaluated player's pieces.
pub const THREE_BONUS: f64 = 2e8;

/// Penalty per open window holding three of the opponent's pieces.
pub const OPPONENT_THREE_PENALTY: f64 = 1e8;

/// Bonus (or penalty, for the opponent) per open window holding two pieces.
pub const TWO_BONUS: f64 = 1e5;

// =============================================================================
// Search Defaults
// =============================================================================

/// Default alpha-beta search depth in plies.
pub const DEFAULT_DEPTH: u32 = 4;

/// Default MCTS wall-clock budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 4.0;

/// Default UCT exploration constant, 1/sqrt(2).
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::FRAC_1_SQRT_2;
