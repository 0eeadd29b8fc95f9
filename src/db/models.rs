//! Row types for the `games` table.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use std::str::FromStr;

use crate::db::{DbError, schema};
use crate::games::reversi::Outcome;
use crate::stats::{GameResult, PlayerType};

/// A stored finished game.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: String,
    created_at: NaiveDateTime,
    finished_at: NaiveDateTime,
    black_player_type: String,
    white_player_type: String,
    black_ai_id: Option<String>,
    white_ai_id: Option<String>,
    winner: String,
    black_score: i32,
    white_score: i32,
    total_moves: i32,
}

impl GameRecord {
    /// Parses the stored strings back into a [`GameResult`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a column holds a value this version does not
    /// recognise.
    pub fn to_result(&self) -> Result<GameResult, DbError> {
        let player = |value: &str| {
            PlayerType::from_str(value)
                .map_err(|_| DbError::corrupt(format!("Invalid player type: '{}'", value)))
        };
        let winner = Outcome::from_str(&self.winner)
            .map_err(|_| DbError::corrupt(format!("Invalid winner: '{}'", self.winner)))?;
        let score = |value: i32| {
            u8::try_from(value).map_err(|_| DbError::corrupt(format!("Invalid score: {}", value)))
        };

        Ok(GameResult::new(
            self.id.clone(),
            self.created_at,
            self.finished_at,
            player(&self.black_player_type)?,
            player(&self.white_player_type)?,
            self.black_ai_id.clone(),
            self.white_ai_id.clone(),
            winner,
            score(self.black_score)?,
            score(self.white_score)?,
            u32::try_from(self.total_moves)
                .map_err(|_| DbError::corrupt(format!("Invalid move count: {}", self.total_moves)))?,
        ))
    }
}

/// Insertable row for a finished game.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGameRecord {
    id: String,
    created_at: NaiveDateTime,
    finished_at: NaiveDateTime,
    black_player_type: String,
    white_player_type: String,
    black_ai_id: Option<String>,
    white_ai_id: Option<String>,
    winner: String,
    black_score: i32,
    white_score: i32,
    total_moves: i32,
}

impl From<&GameResult> for NewGameRecord {
    fn from(result: &GameResult) -> Self {
        Self {
            id: result.game_id().clone(),
            created_at: *result.created_at(),
            finished_at: *result.finished_at(),
            black_player_type: result.black_player().to_string(),
            white_player_type: result.white_player().to_string(),
            black_ai_id: result.black_ai_id().clone(),
            white_ai_id: result.white_ai_id().clone(),
            winner: result.winner().to_string(),
            black_score: i32::from(*result.black_score()),
            white_score: i32::from(*result.white_score()),
            total_moves: i32::try_from(*result.total_moves()).unwrap_or(i32::MAX),
        }
    }
}
