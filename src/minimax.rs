//! Depth-limited alpha-beta search.
//!
//! The search is written as negamax: every node maximizes the negated values
//! of its children, and the leaf evaluation is taken from the side to move.
//! [`alphabeta`] keeps the classic maximizing/minimizing signature on top of
//! it, so callers can still ask for the value of a minimizing ply.
//!
//! Columns are tried from the center outward. Central columns take part in
//! more winning lines, so good moves are found early and cut off the rest.

use tracing::debug;

use crate::board::{Board, IllegalMoveError, Player, apply_action, is_terminal, valid_actions};
use crate::heuristic::evaluate;

/// Valid columns ordered from the middle outward.
///
/// The valid columns are split at the upper middle; the lower half is walked
/// right-to-left and interleaved with the upper half walked left-to-right.
pub fn sorted_valid_columns(board: &Board) -> Vec<usize> {
    let valid = valid_actions(board);
    let mid = valid.len().div_ceil(2);
    let mut inner = valid[..mid].iter().rev();
    let mut outer = valid[mid..].iter();

    (0..valid.len())
        .filter_map(|i| if i % 2 == 0 { inner.next() } else { outer.next() })
        .copied()
        .collect()
}

/// Search `depth` plies below `board` with `player` to move.
///
/// Returns the chosen column and its backed-up value. The column is `None`
/// when the node is a leaf: depth exhausted, the position is terminal for
/// `player`, or no column is playable. Ties keep the earlier (more central)
/// column.
pub fn alphabeta(
    board: &Board,
    player: Player,
    depth: u32,
    is_maximizing: bool,
    alpha: f64,
    beta: f64,
) -> Result<(Option<usize>, f64), IllegalMoveError> {
    if is_maximizing {
        negamax(board, player, depth, alpha, beta)
    } else {
        let (column, value) = negamax(board, player, depth, -beta, -alpha)?;
        Ok((column, -value))
    }
}

/// Full-window search from the maximizing side.
pub fn best_move(board: &Board, player: Player, depth: u32) -> Result<(Option<usize>, f64), IllegalMoveError> {
    let (column, value) = alphabeta(board, player, depth, true, f64::NEG_INFINITY, f64::INFINITY)?;
    debug!(?player, depth, ?column, value, "alpha-beta search finished");
    Ok((column, value))
}

fn negamax(
    board: &Board,
    player: Player,
    depth: u32,
    mut alpha: f64,
    beta: f64,
) -> Result<(Option<usize>, f64), IllegalMoveError> {
    let candidates = sorted_valid_columns(board);
    if depth == 0 || is_terminal(board, player) || candidates.is_empty() {
        return Ok((None, evaluate(board, player, true)));
    }

    let mut best = None;
    let mut value = f64::NEG_INFINITY;

    for column in candidates {
        let child = apply_action(board, column, player)?;
        let (_, child_value) = negamax(&child, player.other(), depth - 1, -beta, -alpha)?;
        let score = -child_value;

        if score > value {
            value = score;
            best = Some(column);
        }
        if value >= beta {
            break;
        }
        alpha = alpha.max(value);
    }

    Ok((best, value))
}
