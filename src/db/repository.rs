//! Database repository for finished games.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, DbErrorKind, GameRecord, NewGameRecord, schema};
use crate::stats::{AiStats, GameResult, StatsError, StatsRecorder};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for game results.
///
/// Opens a fresh connection per call; SQLite handles the file locking.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database at the given path without
    /// touching the schema.
    ///
    /// Use `":memory:"` only for single-call experiments: every call opens a
    /// new, empty in-memory database.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(DbErrorKind::InvalidPath, "Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, DbError> {
        let repo = Self::new(db_path.into())?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Inserts one finished game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the id was already recorded or a database
    /// error occurs.
    #[instrument(skip(self, result), fields(game_id = %result.game_id()))]
    pub fn record_game(&self, result: &GameResult) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let row = NewGameRecord::from(result);

        diesel::insert_into(schema::games::table)
            .values(&row)
            .execute(&mut conn)?;

        info!(
            winner = %result.winner(),
            black_score = result.black_score(),
            white_score = result.white_score(),
            "Game recorded"
        );
        Ok(())
    }

    /// Loads one game by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let record = schema::games::table
            .find(game_id)
            .select(GameRecord::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(record)
    }

    /// Loads every game `ai_id` played in, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn games_for_ai(&self, ai_id: &str) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let records = schema::games::table
            .filter(
                schema::games::black_ai_id
                    .eq(ai_id)
                    .or(schema::games::white_ai_id.eq(ai_id)),
            )
            .order(schema::games::finished_at.desc())
            .select(GameRecord::as_select())
            .load(&mut conn)?;

        debug!(count = records.len(), "Games loaded");
        Ok(records)
    }

    /// Aggregates the results of `ai_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn ai_stats(&self, ai_id: &str) -> Result<AiStats, DbError> {
        let mut stats = AiStats::default();
        for record in self.games_for_ai(ai_id)? {
            match record.to_result() {
                Ok(result) => stats.absorb(ai_id, &result),
                Err(e) => warn!(game_id = %record.id(), error = %e, "Skipping unreadable row"),
            }
        }

        info!(
            games = stats.games_played(),
            win_rate = %format!("{:.1}%", stats.win_rate()),
            average_score = %format!("{:.1}", stats.average_score()),
            "AI stats computed"
        );
        Ok(stats)
    }
}

impl StatsRecorder for GameRepository {
    fn record_result(&self, result: &GameResult) -> Result<(), StatsError> {
        Ok(self.record_game(result)?)
    }

    fn stats_for(&self, ai_id: &str) -> Result<AiStats, StatsError> {
        Ok(self.ai_stats(ai_id)?)
    }
}
