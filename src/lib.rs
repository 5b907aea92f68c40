//! Connect Four engine with two searchers: depth-limited alpha-beta over a
//! window-counting heuristic, and Monte Carlo tree search with UCT selection
//! and random rollouts.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, heuristic weights and search defaults
//! - [`board`] - Board state, move application and win detection
//! - [`heuristic`] - Static evaluation from counted windows
//! - [`minimax`] - Alpha-beta search with center-first move ordering
//! - [`playout`] - Random rollouts and the injectable random source
//! - [`mcts`] - Arena-backed Monte Carlo tree search
//! - [`config`] - Search settings and their validation
//! - [`agent`] - The move-generation contract and its implementations
//! - [`game`] - Alternating two agents until the game ends
//!
//! ## Example
//!
//! ```
//! use connect_four::board::{Board, Player, apply_action};
//! use connect_four::minimax::best_move;
//!
//! let board = apply_action(&Board::new(), 3, Player::One).unwrap();
//! let (column, _value) = best_move(&board, Player::Two, 4).unwrap();
//! assert!(column.is_some());
//! ```

pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod game;
pub mod heuristic;
pub mod mcts;
pub mod minimax;
pub mod playout;
