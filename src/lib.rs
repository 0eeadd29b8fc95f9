//! Reversi server library: rules engine, session registry and AI players.
//!
//! # Architecture
//!
//! - **Games**: bitboard reversi rules and the turn state machine
//! - **Session**: per-game locked registry with idle eviction
//! - **AI**: in-process search, external processes over a line protocol
//! - **Stats**: finished-game results, in memory or in SQLite
//! - **Server**: thin axum routes over the registry
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reversi_server::{AiCatalog, AiSettings, Disc, MemoryStatsRecorder, SessionManager, Settings};
//!
//! # async fn example() -> Result<(), reversi_server::ReversiError> {
//! let manager = SessionManager::new(
//!     Settings::default(),
//!     AiCatalog::builtin(),
//!     Arc::new(MemoryStatsRecorder::new()),
//! );
//!
//! let view = manager
//!     .create_game(Some(AiSettings::new("piece_depth3", Disc::White)))
//!     .await?;
//! let first = view.legal_moves()[0];
//! manager.make_move(view.game_id(), first).await?;
//! manager.request_ai_move(view.game_id()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod ai;
mod db;
mod error;
mod games;
mod server;
mod session;
mod settings;
mod stats;

// Crate-level exports - Rules engine
pub use games::reversi::{
    BOARD_SIZE, Board, Disc, Game, GameStatus, Move, MoveReport, NUM_SQUARES, Outcome, RulesError,
    Square, mask_to_moves,
};

// Crate-level exports - AI players
pub use ai::{
    AiCatalog, AiPlayerDescriptor, AiSeat, AlphaBetaStrategy, Evaluation, MAX_LINE_LEN, PING,
    PONG, ProcessPlayer, RandomStrategy, Strategy, StrategySpec, decode_reply, decode_request,
    encode_reply, encode_request, read_line, run_player,
};

// Crate-level exports - Sessions
pub use session::{
    AiPlayerInfo, AiSettings, GameId, GameView, ScoreView, SessionManager,
    spawn_garbage_collector,
};

// Crate-level exports - Statistics and persistence
pub use db::{DbError, DbErrorKind, GameRecord, GameRepository, NewGameRecord};
pub use stats::{
    AiStats, GameResult, MemoryStatsRecorder, PlayerOutcome, PlayerType, Record, StatsError,
    StatsRecorder,
};

// Crate-level exports - Errors, settings, HTTP
pub use error::{ErrorKind, ReversiError};
pub use server::{AiMoveRequest, ApiError, CreateGameRequest, MakeMoveRequest, Position, router};
pub use settings::{ConfigError, RestartPolicy, Settings};
