//! Reversi server - unified CLI
//!
//! Runs the HTTP game server, or plays as an external AI process.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, EvaluationArg, StrategyKind};
use reversi_server::{
    AiCatalog, AlphaBetaStrategy, Disc, GameRepository, MemoryStatsRecorder, RandomStrategy,
    SessionManager, Settings, StatsRecorder, Strategy, router, run_player, spawn_garbage_collector,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,reversi_server=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            config,
            db_path,
        } => run_http_server(host, port, config, db_path).await,
        Command::Ai {
            color,
            strategy,
            depth,
            evaluation,
            seed,
        } => run_ai_player(color, strategy, depth, evaluation, seed).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Run the HTTP game server
async fn run_http_server(
    host: String,
    port: u16,
    config: Option<PathBuf>,
    db_path: Option<String>,
) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let mut settings = match &config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(db_path) = db_path {
        settings = settings.with_database_path(db_path);
    }

    let catalog = match settings.ai_players_file() {
        Some(path) => AiCatalog::from_file(path)?,
        None => AiCatalog::builtin(),
    };

    let recorder: Arc<dyn StatsRecorder> = match settings.database_path() {
        Some(path) => {
            info!(path = %path, "Recording results in SQLite");
            Arc::new(GameRepository::open(path.clone())?)
        }
        None => {
            warn!("No database configured, results are kept in memory");
            Arc::new(MemoryStatsRecorder::new())
        }
    };

    let manager = SessionManager::new(settings.clone(), catalog, recorder);
    let gc = spawn_garbage_collector(
        manager.clone(),
        settings.gc_interval(),
        settings.game_timeout(),
    );

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server ready at http://{}:{}/", host, port);

    let result = axum::serve(listener, router(manager.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    gc.abort();
    manager.shutdown_all().await;
    info!(?result, "Server exited");
    result?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Play as an external AI over stdin/stdout. Logs go to stderr.
async fn run_ai_player(
    color: Disc,
    strategy: StrategyKind,
    depth: u8,
    evaluation: EvaluationArg,
    seed: Option<u64>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let strategy: Box<dyn Strategy> = match strategy {
        StrategyKind::Random => Box::new(seed.map_or_else(RandomStrategy::new, RandomStrategy::seeded)),
        StrategyKind::Alphabeta => Box::new(AlphaBetaStrategy::new(depth, evaluation.into())),
    };

    info!(%color, strategy = strategy.name(), "Starting AI player");
    run_player(
        strategy.as_ref(),
        color,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}
