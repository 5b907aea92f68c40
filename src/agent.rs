//! Agents: anything that can pick a column for a player.
//!
//! Every agent follows the same contract: given a board, the player to move
//! and the agent's own carry-over state from its previous call, return a
//! playable column and the state to pass next time. None of the agents here
//! keep state; they hand it back unchanged.

use std::any::Any;
use std::io::{self, BufRead, BufReader, Cursor, Read, Stdin, Stdout, Write};

use crate::board::{Board, IllegalMoveError, Player, apply_action, valid_actions};
use crate::config::{MctsConfig, MinimaxConfig};
use crate::mcts;
use crate::minimax::best_move;
use crate::playout::{RandomSource, choose};

/// Opaque per-agent state threaded between calls.
pub type SavedState = Box<dyn Any + Send>;

/// Errors an agent can report instead of a move.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("search tried an illegal move: {0}")]
    IllegalMove(#[from] IllegalMoveError),
    #[error("no playable column")]
    NoLegalMoves,
    #[error("input closed before a move was entered")]
    InputClosed,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Common interface of all move generators.
pub trait Agent {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Choose a column for `player`. The returned column always refers to a
    /// non-full column of `board`.
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), AgentError>;
}

// =============================================================================
// Search agents
// =============================================================================

/// Alpha-beta search to a fixed depth.
#[derive(Debug, Clone, Default)]
pub struct MinimaxAgent {
    config: MinimaxConfig,
}

impl MinimaxAgent {
    pub fn new(config: MinimaxConfig) -> Self {
        Self { config }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        "minimax"
    }

    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), AgentError> {
        let (column, _) = best_move(board, player, self.config.depth)?;
        let column = column.ok_or(AgentError::NoLegalMoves)?;
        Ok((column, saved_state))
    }
}

/// Monte Carlo tree search with a fresh tree per move.
#[derive(Debug)]
pub struct MctsAgent<R = fastrand::Rng> {
    config: MctsConfig,
    rng: R,
}

impl MctsAgent {
    pub fn new(config: MctsConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }
}

impl<R: RandomSource> MctsAgent<R> {
    pub fn with_rng(config: MctsConfig, rng: R) -> Self {
        Self { config, rng }
    }
}

impl<R: RandomSource> Agent for MctsAgent<R> {
    fn name(&self) -> &str {
        "mcts"
    }

    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), AgentError> {
        let column = mcts::search(board, player, self.config, &mut self.rng)?;
        let column = column.ok_or(AgentError::NoLegalMoves)?;
        Ok((column, saved_state))
    }
}

// =============================================================================
// Baseline agents
// =============================================================================

/// Plays a uniformly random valid column.
#[derive(Debug)]
pub struct RandomAgent<R = fastrand::Rng> {
    rng: R,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> RandomAgent<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RandomSource> Agent for RandomAgent<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn generate_move(
        &mut self,
        board: &Board,
        _player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), AgentError> {
        let column = choose(&mut self.rng, &valid_actions(board)).ok_or(AgentError::NoLegalMoves)?;
        Ok((column, saved_state))
    }
}

/// Line-by-line input for [`HumanAgent`].
pub trait ReadLine {
    /// Append the next line to `buf`, returning the bytes read (0 at end of input).
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

/// Takes the stdin lock only for the duration of one line, so several
/// console agents can share the terminal.
impl ReadLine for Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> ReadLine for Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

impl<R: Read> ReadLine for BufReader<R> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Reads columns typed on a console, re-prompting until one is playable.
pub struct HumanAgent<I, O> {
    input: I,
    output: O,
}

impl HumanAgent<Stdin, Stdout> {
    /// Prompt on stdout and read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<I: ReadLine, O: Write> HumanAgent<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Give back the output sink, e.g. to inspect prompts in tests.
    pub fn into_output(self) -> O {
        self.output
    }
}

impl<I: ReadLine, O: Write> Agent for HumanAgent<I, O> {
    fn name(&self) -> &str {
        "human"
    }

    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), AgentError> {
        if valid_actions(board).is_empty() {
            return Err(AgentError::NoLegalMoves);
        }

        loop {
            write!(self.output, "{player}, choose a column: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AgentError::InputClosed);
            }

            let column = match line.trim().parse::<usize>() {
                Ok(column) => column,
                Err(_) => {
                    writeln!(self.output, "not a column: {:?}", line.trim())?;
                    continue;
                }
            };

            match apply_action(board, column, player) {
                Ok(_) => return Ok((column, saved_state)),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }
}
