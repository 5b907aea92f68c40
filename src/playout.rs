//! Random playouts (rollouts) used to score MCTS leaves.
//!
//! Every random choice made by the tree search goes through [`RandomSource`],
//! so tests can swap the default `fastrand` generator for a fixed sequence
//! and get a reproducible tree.

use crate::board::{Board, GameResult, IllegalMoveError, Player, apply_action, check_result, is_terminal, valid_actions};

/// Source of uniform random indices.
pub trait RandomSource {
    /// A uniformly chosen index in `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    #[inline]
    fn below(&mut self, bound: usize) -> usize {
        self.usize(..bound)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Each value is reduced modulo the requested bound.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<usize>,
    next: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, next: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn below(&mut self, bound: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value % bound
    }
}

/// Pick one of `columns` uniformly, `None` if there are none.
pub fn choose<R: RandomSource + ?Sized>(rng: &mut R, columns: &[usize]) -> Option<usize> {
    if columns.is_empty() {
        None
    } else {
        Some(columns[rng.below(columns.len())])
    }
}

/// Play uniformly random moves from `board`, `player` to move, until the
/// board is full or the player who just moved has won. Returns the final board.
pub fn rollout<R: RandomSource + ?Sized>(
    board: &Board,
    player: Player,
    rng: &mut R,
) -> Result<Board, IllegalMoveError> {
    let mut board = *board;
    let mut player = player;

    while !is_terminal(&board, player.other()) {
        let Some(column) = choose(rng, &valid_actions(&board)) else {
            break;
        };
        board = apply_action(&board, column, player)?;
        player = player.other();
    }

    Ok(board)
}

/// Run one rollout and score it for `designated`: 1 for a win, 0 for a draw
/// or a loss.
pub fn simulate<R: RandomSource + ?Sized>(
    board: &Board,
    player: Player,
    designated: Player,
    rng: &mut R,
) -> Result<u32, IllegalMoveError> {
    let end = rollout(board, player, rng)?;
    Ok(u32::from(check_result(&end, designated) == GameResult::Win(designated)))
}
