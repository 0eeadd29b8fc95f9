//! Finished-game results and per-AI statistics.

use crate::games::reversi::{Disc, Outcome};
use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Who sat on one side of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PlayerType {
    /// A client making moves through the API.
    Human,
    /// A catalog AI player.
    Ai,
}

/// How a game ended from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerOutcome {
    /// More discs than the opponent.
    Win,
    /// Fewer discs than the opponent.
    Loss,
    /// Equal disc counts.
    Draw,
}

impl PlayerOutcome {
    /// Outcome for `color` given the game's result.
    pub fn for_color(outcome: Outcome, color: Disc) -> Self {
        match outcome.winner() {
            None => PlayerOutcome::Draw,
            Some(winner) if winner == color => PlayerOutcome::Win,
            Some(_) => PlayerOutcome::Loss,
        }
    }
}

/// The persisted record of one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct GameResult {
    /// Session identifier.
    game_id: String,
    /// When the game was created (UTC).
    created_at: NaiveDateTime,
    /// When the final move was applied (UTC).
    finished_at: NaiveDateTime,
    /// Who played black.
    black_player: PlayerType,
    /// Who played white.
    white_player: PlayerType,
    /// Catalog id of the black AI, if any.
    black_ai_id: Option<String>,
    /// Catalog id of the white AI, if any.
    white_ai_id: Option<String>,
    /// Final result.
    winner: Outcome,
    /// Black discs at the end.
    black_score: u8,
    /// White discs at the end.
    white_score: u8,
    /// Discs placed during the game.
    total_moves: u32,
}

impl GameResult {
    /// The color `ai_id` played in this game, if it took part.
    pub fn color_of(&self, ai_id: &str) -> Option<Disc> {
        if self.black_ai_id.as_deref() == Some(ai_id) {
            Some(Disc::Black)
        } else if self.white_ai_id.as_deref() == Some(ai_id) {
            Some(Disc::White)
        } else {
            None
        }
    }

    /// Final disc count for one side.
    pub fn score_of(&self, color: Disc) -> u8 {
        match color {
            Disc::Black => self.black_score,
            Disc::White => self.white_score,
        }
    }
}

/// Win/loss/draw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize)]
pub struct Record {
    /// Games won.
    wins: u32,
    /// Games lost.
    losses: u32,
    /// Games drawn.
    draws: u32,
}

impl Record {
    fn add(&mut self, outcome: PlayerOutcome) {
        match outcome {
            PlayerOutcome::Win => self.wins += 1,
            PlayerOutcome::Loss => self.losses += 1,
            PlayerOutcome::Draw => self.draws += 1,
        }
    }

    /// Number of games counted.
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Aggregated results of one AI player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStats {
    /// Games finished with this AI bound.
    games_played: u32,
    /// Overall record.
    overall: Record,
    /// Record while playing black.
    as_black: Record,
    /// Record while playing white.
    as_white: Record,
    /// Sum of the AI's final disc counts.
    total_score: u64,
}

impl AiStats {
    /// Folds one result into the totals. Results `ai_id` did not play in
    /// are ignored.
    pub fn absorb(&mut self, ai_id: &str, result: &GameResult) {
        let Some(color) = result.color_of(ai_id) else {
            return;
        };
        let outcome = PlayerOutcome::for_color(*result.winner(), color);

        self.games_played += 1;
        self.overall.add(outcome);
        match color {
            Disc::Black => self.as_black.add(outcome),
            Disc::White => self.as_white.add(outcome),
        }
        self.total_score += u64::from(result.score_of(color));
    }

    /// Wins as a percentage of games played (0.0 to 100.0).
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            (f64::from(self.overall.wins) / f64::from(self.games_played)) * 100.0
        }
    }

    /// Mean final disc count.
    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.games_played)
        }
    }
}

/// Statistics error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Stats error: {} at {}:{}", message, file, line)]
pub struct StatsError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StatsError {
    /// Creates a new statistics error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<crate::db::DbError> for StatsError {
    #[track_caller]
    fn from(err: crate::db::DbError) -> Self {
        Self::new(err.message)
    }
}

/// Sink for finished-game results.
///
/// Calls are synchronous and may block; the session registry runs them on
/// the blocking pool.
pub trait StatsRecorder: Send + Sync + std::fmt::Debug {
    /// Stores one finished game.
    fn record_result(&self, result: &GameResult) -> Result<(), StatsError>;

    /// Aggregates every stored game `ai_id` played in.
    fn stats_for(&self, ai_id: &str) -> Result<AiStats, StatsError>;
}

/// Keeps results in memory, aggregated per AI id.
#[derive(Debug, Default)]
pub struct MemoryStatsRecorder {
    stats: Mutex<HashMap<String, AiStats>>,
}

impl MemoryStatsRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsRecorder for MemoryStatsRecorder {
    #[instrument(skip(self, result), fields(game_id = %result.game_id()))]
    fn record_result(&self, result: &GameResult) -> Result<(), StatsError> {
        let mut stats = self
            .stats
            .lock()
            .map_err(|_| StatsError::new("stats table poisoned"))?;

        for ai_id in [result.black_ai_id(), result.white_ai_id()]
            .into_iter()
            .flatten()
        {
            stats.entry(ai_id.clone()).or_default().absorb(ai_id, result);
        }

        debug!(winner = %result.winner(), "Result recorded in memory");
        Ok(())
    }

    fn stats_for(&self, ai_id: &str) -> Result<AiStats, StatsError> {
        let stats = self
            .stats
            .lock()
            .map_err(|_| StatsError::new("stats table poisoned"))?;
        Ok(stats.get(ai_id).cloned().unwrap_or_default())
    }
}
