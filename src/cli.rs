//! Command-line interface for reversi_server.

use clap::{Parser, Subcommand, ValueEnum};
use reversi_server::{Disc, Evaluation};
use std::path::PathBuf;

/// Reversi game server with pluggable AI players
#[derive(Parser, Debug)]
#[command(name = "reversi_server")]
#[command(about = "Reversi game server with pluggable AI players", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Built-in strategies the `ai` subcommand can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    /// Uniformly random legal moves
    Random,
    /// Fixed-depth alpha-beta search
    Alphabeta,
}

/// Evaluation choices for the alpha-beta player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EvaluationArg {
    /// Disc difference
    Piece,
    /// Square weight table
    Positional,
}

impl From<EvaluationArg> for Evaluation {
    fn from(arg: EvaluationArg) -> Self {
        match arg {
            EvaluationArg::Piece => Evaluation::PieceCount,
            EvaluationArg::Positional => Evaluation::Positional,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Settings file (TOML)
        #[arg(short, long, env = "REVERSI_CONFIG")]
        config: Option<PathBuf>,

        /// SQLite database for results, overrides the settings file
        #[arg(long, env = "REVERSI_DATABASE")]
        db_path: Option<String>,
    },

    /// Play as an external AI over stdin/stdout
    Ai {
        /// Color to play (BLACK or WHITE), appended by the server
        #[arg(value_parser = parse_color)]
        color: Disc,

        /// Move selection
        #[arg(long, value_enum, default_value_t = StrategyKind::Random)]
        strategy: StrategyKind,

        /// Search depth for alpha-beta
        #[arg(long, default_value_t = 3)]
        depth: u8,

        /// Evaluation for alpha-beta
        #[arg(long, value_enum, default_value_t = EvaluationArg::Piece)]
        evaluation: EvaluationArg,

        /// Seed for the random player
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_color(value: &str) -> Result<Disc, String> {
    value
        .parse::<Disc>()
        .map_err(|_| format!("expected BLACK or WHITE, got {:?}", value))
}
