//! Connect Four on the command line.
//!
//! ## Usage
//!
//! - `connect-four` - Show a demo
//! - `connect-four play --player-one human --player-two mcts` - Play a game
//! - `connect-four demo` - Let alpha-beta and MCTS play each other

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use connect_four::agent::{Agent, HumanAgent, MctsAgent, MinimaxAgent, RandomAgent};
use connect_four::board::{Board, Player};
use connect_four::config::{MctsConfig, MinimaxConfig, SearchBudget};
use connect_four::constants::{DEFAULT_DEPTH, DEFAULT_EXPLORATION};
use connect_four::game::{Outcome, play_game};

/// Connect Four with alpha-beta and MCTS opponents
#[derive(Parser)]
#[command(name = "connect-four")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game between two agents
    Play(PlayArgs),
    /// Watch alpha-beta play MCTS with default settings
    Demo,
}

#[derive(Args)]
struct PlayArgs {
    /// Agent moving first, as X
    #[arg(long, value_enum, default_value_t = AgentKind::Human)]
    player_one: AgentKind,

    /// Agent moving second, as O
    #[arg(long, value_enum, default_value_t = AgentKind::Minimax)]
    player_two: AgentKind,

    /// Alpha-beta search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// MCTS iterations per move
    #[arg(long, conflicts_with = "timeout")]
    iterations: Option<u32>,

    /// MCTS thinking time per move, in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// UCT exploration constant
    #[arg(long, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,

    /// Seed for the random and MCTS agents
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentKind {
    Minimax,
    Mcts,
    Random,
    Human,
}

impl PlayArgs {
    fn minimax_config(&self) -> Result<MinimaxConfig> {
        let config = MinimaxConfig::with_depth(self.depth);
        config.validate()?;
        Ok(config)
    }

    fn mcts_config(&self) -> Result<MctsConfig> {
        let mut config = MctsConfig::default().exploration(self.exploration);
        if let Some(iterations) = self.iterations {
            config.budget = SearchBudget::Iterations(iterations);
        } else if let Some(secs) = self.timeout {
            config.budget = SearchBudget::from_secs(secs)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// `seat` keeps the two agents' random streams apart under one seed.
    fn build_agent(&self, kind: AgentKind, seat: u64) -> Result<Box<dyn Agent>> {
        let seed = self.seed.map(|s| s.wrapping_add(seat));
        let agent: Box<dyn Agent> = match kind {
            AgentKind::Minimax => Box::new(MinimaxAgent::new(self.minimax_config()?)),
            AgentKind::Mcts => {
                let config = self.mcts_config()?;
                match seed {
                    Some(seed) => Box::new(MctsAgent::with_seed(config, seed)),
                    None => Box::new(MctsAgent::new(config)),
                }
            }
            AgentKind::Random => match seed {
                Some(seed) => Box::new(RandomAgent::with_seed(seed)),
                None => Box::new(RandomAgent::new()),
            },
            AgentKind::Human => Box::new(HumanAgent::stdio()),
        };
        Ok(agent)
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Play(args)) => run_play(&args),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_play(args: &PlayArgs) -> Result<()> {
    let mut one = args.build_agent(args.player_one, 0)?;
    let mut two = args.build_agent(args.player_two, 1)?;
    info!(player_one = ?args.player_one, player_two = ?args.player_two, "starting game");

    let board = Board::new();
    println!("{board}");
    let record = play_game(&board, Player::One, [one.as_mut(), two.as_mut()], |board, player, column| {
        println!("{player} plays column {column}\n{board}");
    })
    .context("game aborted")?;

    print_outcome(record.outcome);
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Connect Four: alpha-beta (X) vs MCTS (O)\n");

    let mut one = MinimaxAgent::new(MinimaxConfig::default());
    let mut two = MctsAgent::new(MctsConfig::with_timeout(Duration::from_secs(1)));

    let record = play_game(&Board::new(), Player::One, [&mut one, &mut two], |board, player, column| {
        println!("{player} plays column {column}\n{board}");
    })
    .context("demo game aborted")?;

    print_outcome(record.outcome);
    println!("Moves: {:?}", record.moves);
    Ok(())
}

fn print_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Win(player) => println!("{player} wins!"),
        Outcome::Draw => println!("Draw."),
    }
}
