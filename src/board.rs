//! Connect-Four board model.
//!
//! The board is a fixed `ROWS x COLS` grid stored bottom-to-top, so row 0 is
//! where the first piece dropped into a column lands. Boards are small `Copy`
//! values: applying a move always produces a new board and never touches the
//! one it was applied to, which lets both searchers branch freely from a
//! shared parent position.

use std::fmt;
use std::str::FromStr;

use crate::constants::{COLS, CONNECT, ROWS};

// =============================================================================
// Players and results
// =============================================================================

/// One of the two sides. `One` moves first and is drawn as `X`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The opposing side.
    #[inline]
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Glyph used by the board printer and parser.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one (X)"),
            Player::Two => write!(f, "player two (O)"),
        }
    }
}

/// Game state from the point of view of one player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    StillPlaying,
    Win(Player),
    Draw,
}

/// Returned when a piece cannot be dropped into a column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMoveError {
    #[error("column {column} is outside the board (expected 0..{})", COLS)]
    OutOfRange { column: usize },
    #[error("column {column} is already full")]
    ColumnFull { column: usize },
}

// =============================================================================
// Board
// =============================================================================

/// A 6x7 grid of optional pieces. Row 0 is the bottom row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Player>; COLS]; ROWS],
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece at `(row, col)`, `None` if empty. Row 0 is the bottom.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Player> {
        self.cells[row][col]
    }

    /// Number of pieces stacked in `col`.
    pub fn height(&self, col: usize) -> usize {
        (0..ROWS).take_while(|&row| self.cells[row][col].is_some()).count()
    }

    /// A column is full once its top cell is occupied.
    #[inline]
    pub fn is_column_full(&self, col: usize) -> bool {
        self.cells[ROWS - 1][col].is_some()
    }

    /// True when every cell is occupied.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Swap every X for an O and vice versa.
    pub fn swap_colors(&self) -> Board {
        let mut swapped = *self;
        for cell in swapped.cells.iter_mut().flatten() {
            *cell = cell.map(Player::other);
        }
        swapped
    }
}

/// Columns whose top cell is still empty, in ascending order.
pub fn valid_actions(board: &Board) -> Vec<usize> {
    (0..COLS).filter(|&col| !board.is_column_full(col)).collect()
}

/// Drop `player`'s piece into `column` and return the resulting board.
///
/// The input board is left untouched.
pub fn apply_action(board: &Board, column: usize, player: Player) -> Result<Board, IllegalMoveError> {
    if column >= COLS {
        return Err(IllegalMoveError::OutOfRange { column });
    }
    if board.is_column_full(column) {
        return Err(IllegalMoveError::ColumnFull { column });
    }

    let mut next = *board;
    let row = board.height(column);
    next.cells[row][column] = Some(player);
    Ok(next)
}

/// Whether `player` owns all four cells of some window.
pub fn connected_four(board: &Board, player: Player) -> bool {
    windows().any(|window| window.iter().all(|&(row, col)| board.get(row, col) == Some(player)))
}

/// Result of the game as seen by `player`.
///
/// Only a win for `player` is reported; a win for the opponent on a
/// non-full board reads as `StillPlaying`.
pub fn check_result(board: &Board, player: Player) -> GameResult {
    if connected_four(board, player) {
        GameResult::Win(player)
    } else if board.is_full() {
        GameResult::Draw
    } else {
        GameResult::StillPlaying
    }
}

/// True iff `check_result` is anything but `StillPlaying`.
#[inline]
pub fn is_terminal(board: &Board, player: Player) -> bool {
    check_result(board, player) != GameResult::StillPlaying
}

// =============================================================================
// Windows
// =============================================================================

/// Four cells in a line, as `(row, col)` pairs.
pub type Window = [(usize, usize); CONNECT];

/// Row/column steps: vertical, horizontal, diagonal, anti-diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Every window of `CONNECT` cells that fits on the board, in all four
/// orientations.
pub fn windows() -> impl Iterator<Item = Window> {
    DIRECTIONS.into_iter().flat_map(|(dr, dc)| {
        (0..ROWS).flat_map(move |row| (0..COLS).filter_map(move |col| window_at(row, col, dr, dc)))
    })
}

fn window_at(row: usize, col: usize, dr: isize, dc: isize) -> Option<Window> {
    let mut window = [(0, 0); CONNECT];
    for (i, cell) in window.iter_mut().enumerate() {
        let r = row as isize + dr * i as isize;
        let c = col as isize + dc * i as isize;
        if r < 0 || r >= ROWS as isize || c < 0 || c >= COLS as isize {
            return None;
        }
        *cell = (r as usize, c as usize);
    }
    Some(window)
}

// =============================================================================
// Printing and parsing
// =============================================================================

const BORDER: &str = "|==============|";

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BORDER}")?;
        for row in (0..ROWS).rev() {
            write!(f, "|")?;
            for col in 0..COLS {
                let ch = self.get(row, col).map_or(' ', Player::symbol);
                write!(f, "{ch} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{BORDER}")?;
        write!(f, "|")?;
        for col in 0..COLS {
            write!(f, "{col} ")?;
        }
        write!(f, "|")
    }
}

/// Errors from parsing the framed board layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseBoardError {
    #[error("board must start with a {} line", BORDER)]
    MissingBorder,
    #[error("expected {} rows, found {found}", ROWS)]
    RowCount { found: usize },
    #[error("row {row} is too short")]
    RowTooShort { row: usize },
    #[error("unknown cell {glyph:?} at row {row}, column {column}")]
    UnknownGlyph { glyph: char, row: usize, column: usize },
    #[error("column {column} has a piece above an empty cell")]
    FloatingPiece { column: usize },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|l| !l.is_empty());
        match lines.next() {
            Some(line) if line.starts_with("|=") => {}
            _ => return Err(ParseBoardError::MissingBorder),
        }

        let rows: Vec<&str> = lines.take_while(|l| !l.starts_with("|=")).collect();
        if rows.len() != ROWS {
            return Err(ParseBoardError::RowCount { found: rows.len() });
        }

        let mut board = Board::new();
        for (i, line) in rows.iter().enumerate() {
            let row = ROWS - 1 - i;
            let glyphs: Vec<char> = line.strip_prefix('|').unwrap_or(line).chars().collect();
            if glyphs.len() < 2 * COLS - 1 {
                return Err(ParseBoardError::RowTooShort { row });
            }
            for col in 0..COLS {
                board.cells[row][col] = match glyphs[2 * col] {
                    ' ' => None,
                    'X' => Some(Player::One),
                    'O' => Some(Player::Two),
                    glyph => return Err(ParseBoardError::UnknownGlyph { glyph, row, column: col }),
                };
            }
        }

        for col in 0..COLS {
            if (board.height(col)..ROWS).any(|row| board.cells[row][col].is_some()) {
                return Err(ParseBoardError::FloatingPiece { column: col });
            }
        }

        Ok(board)
    }
}
