//! Client-facing snapshot of a game.

use super::registry::GameId;
use crate::games::reversi::{Disc, Game, Move, Outcome, Square};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Disc counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ScoreView {
    /// Black discs.
    black: u8,
    /// White discs.
    white: u8,
}

/// What clients see of a game after every operation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Session identifier.
    game_id: GameId,
    /// 8x8 grid, rows top to bottom; cells are 0 empty, 1 black, 2 white.
    board: Vec<Vec<Square>>,
    /// Side to move.
    current_player: Disc,
    /// Disc counts.
    score: ScoreView,
    /// Legal moves for the side to move, in scan order.
    legal_moves: Vec<Move>,
    /// Whether neither side can move.
    game_over: bool,
    /// Result once the game is over.
    winner: Option<Outcome>,
    /// Whether the last transition was a forced pass.
    passed: bool,
}

impl GameView {
    /// Snapshots `game`.
    pub fn new(game_id: GameId, game: &Game) -> Self {
        let board = game.board();
        let (black, white) = board.score();
        Self {
            game_id,
            board: board.rows().iter().map(|row| row.to_vec()).collect(),
            current_player: game.to_move(),
            score: ScoreView { black, white },
            legal_moves: game.legal_moves(),
            game_over: game.is_over(),
            winner: game.outcome(),
            passed: game.passed(),
        }
    }
}
