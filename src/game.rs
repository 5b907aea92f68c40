//! Game loop: alternate two agents until someone connects four or the board
//! fills up.

use tracing::info;

use crate::agent::{Agent, AgentError, SavedState};
use crate::board::{Board, GameResult, IllegalMoveError, Player, apply_action, check_result};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

/// Everything recorded about one finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Columns played, in order, starting with the first mover.
    pub moves: Vec<usize>,
    pub outcome: Outcome,
    /// Position after the last move.
    pub board: Board,
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{agent} agent failed to move for {player}")]
    Agent {
        agent: String,
        player: Player,
        #[source]
        source: AgentError,
    },
    #[error("{agent} agent played an illegal move for {player}")]
    IllegalMove {
        agent: String,
        player: Player,
        #[source]
        source: IllegalMoveError,
    },
}

fn seat(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

/// Play one game from `start` with `first` to move.
///
/// `agents[0]` plays [`Player::One`] and `agents[1]` plays [`Player::Two`].
/// Each agent gets back the state it returned on its previous turn.
/// `on_move` sees the board after every move, together with the player who
/// made it and the column played.
pub fn play_game(
    start: &Board,
    first: Player,
    mut agents: [&mut dyn Agent; 2],
    mut on_move: impl FnMut(&Board, Player, usize),
) -> Result<GameRecord, GameError> {
    let mut board = *start;
    let mut player = first;
    let mut states: [Option<SavedState>; 2] = [None, None];
    let mut moves = Vec::new();

    info!(
        one = agents[0].name(),
        two = agents[1].name(),
        first = %first,
        "game started"
    );

    loop {
        let slot = seat(player);
        let agent = &mut agents[slot];

        let (column, state) = agent
            .generate_move(&board, player, states[slot].take())
            .map_err(|source| GameError::Agent {
                agent: agent.name().to_string(),
                player,
                source,
            })?;
        states[slot] = state;

        board = apply_action(&board, column, player).map_err(|source| GameError::IllegalMove {
            agent: agent.name().to_string(),
            player,
            source,
        })?;
        moves.push(column);
        info!(player = %player, column, ply = moves.len(), "move played");
        on_move(&board, player, column);

        let outcome = match check_result(&board, player) {
            GameResult::Win(winner) => Outcome::Win(winner),
            GameResult::Draw => Outcome::Draw,
            GameResult::StillPlaying => {
                player = player.other();
                continue;
            }
        };

        info!(?outcome, plies = moves.len(), "game over");
        return Ok(GameRecord { moves, outcome, board });
    }
}
