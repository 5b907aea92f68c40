//! Static evaluation of non-terminal positions.
//!
//! The score approximates how close each side is to four in a row by counting
//! open windows: runs of four cells that hold only one side's pieces plus
//! empties. Tiers short-circuit: a win hides any three-count, and any
//! three-count hides the two-count.

use crate::board::{Board, Player, connected_four, windows};
use crate::constants::{CONNECT, LOSS_SCORE, OPPONENT_THREE_PENALTY, THREE_BONUS, TWO_BONUS, WIN_SCORE};

/// Count windows holding exactly `n` of `player`'s pieces with every other
/// cell empty.
///
/// A window containing any opponent piece can no longer become a win for
/// `player` and is never counted.
pub fn count_runs(board: &Board, player: Player, n: usize) -> usize {
    windows()
        .filter(|window| {
            let mut own = 0;
            let mut empty = 0;
            for &(row, col) in window {
                match board.get(row, col) {
                    Some(p) if p == player => own += 1,
                    Some(_) => return false,
                    None => empty += 1,
                }
            }
            own == n && empty == CONNECT - n
        })
        .count()
}

/// Evaluate `board` for `player`, negated on minimizing plies.
pub fn evaluate(board: &Board, player: Player, is_maximizing: bool) -> f64 {
    let opponent = player.other();

    let mut score = if connected_four(board, player) {
        WIN_SCORE
    } else {
        match count_runs(board, player, 3) {
            0 => TWO_BONUS * count_runs(board, player, 2) as f64,
            threes => THREE_BONUS * threes as f64,
        }
    };

    if connected_four(board, opponent) {
        score = LOSS_SCORE;
    } else {
        score -= match count_runs(board, opponent, 3) {
            0 => TWO_BONUS * count_runs(board, opponent, 2) as f64,
            threes => OPPONENT_THREE_PENALTY * threes as f64,
        };
    }

    if is_maximizing { score } else { -score }
}
