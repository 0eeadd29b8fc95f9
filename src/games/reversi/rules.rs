//! Turn progression for reversi: pass handling and terminal detection.

use super::board::Board;
use super::types::{Disc, GameStatus, Move, Outcome, RulesError};
use tracing::{debug, instrument};

/// What happened when a move was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// The move that was played.
    pub played: Move,
    /// Number of discs captured.
    pub flipped: u32,
    /// The opponent had to pass, so the mover moves again.
    pub passed: bool,
    /// Set when this move ended the game.
    pub finished: Option<Outcome>,
}

/// Reversi game: board plus turn bookkeeping.
///
/// Every transition goes through [`Game::play`], which validates first and
/// then replaces board and turn state together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    to_move: Disc,
    status: GameStatus,
    passed: bool,
    moves_played: u32,
}

impl Game {
    /// Creates a new game from the standard position, Black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Disc::Black,
            status: GameStatus::InProgress,
            passed: false,
            moves_played: 0,
        }
    }

    /// Creates a game from an arbitrary position.
    ///
    /// If `to_move` has no legal move but the opponent does, the turn passes
    /// immediately and [`Game::passed`] is set. If neither side can move the
    /// game starts finished.
    #[instrument(skip(board))]
    pub fn from_position(board: Board, to_move: Disc) -> Self {
        let mut game = Self {
            board,
            to_move,
            status: GameStatus::InProgress,
            passed: false,
            moves_played: 0,
        };

        if !board.has_any_legal_move(to_move) {
            if board.has_any_legal_move(to_move.opponent()) {
                debug!(?to_move, "Side to move is blocked, passing");
                game.to_move = to_move.opponent();
                game.passed = true;
            } else {
                game.status = GameStatus::Finished(board.winner());
            }
        }

        game
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move. After the game ends this is the side that
    /// made the last move.
    pub fn to_move(&self) -> Disc {
        self.to_move
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the outcome if the game has finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::InProgress => None,
            GameStatus::Finished(outcome) => Some(outcome),
        }
    }

    /// Returns `true` once neither side can move.
    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Finished(_))
    }

    /// Whether the last transition was a forced pass.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Number of moves played in this game (passes excluded).
    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// Legal moves for the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            Vec::new()
        } else {
            self.board.legal_moves(self.to_move)
        }
    }

    /// Plays `mv` for `player`.
    ///
    /// # Errors
    ///
    /// - [`RulesError::GameOver`] once the game has finished
    /// - [`RulesError::OutOfTurn`] if `player` is not the side to move
    /// - [`RulesError::IllegalMove`] if the move captures nothing
    ///
    /// On error the game is unchanged.
    #[instrument(skip(self), fields(to_move = ?self.to_move))]
    pub fn play(&mut self, player: Disc, mv: Move) -> Result<MoveReport, RulesError> {
        if self.is_over() {
            return Err(RulesError::GameOver);
        }
        if player != self.to_move {
            return Err(RulesError::OutOfTurn {
                requested: player,
                expected: self.to_move,
            });
        }

        let (board, flipped) = self.board.apply_move(player, mv)?;
        let opponent = player.opponent();

        let (to_move, passed, status) = if board.has_any_legal_move(opponent) {
            (opponent, false, GameStatus::InProgress)
        } else if board.has_any_legal_move(player) {
            debug!(?opponent, "Opponent has no legal move, turn stays");
            (player, true, GameStatus::InProgress)
        } else {
            debug!(board = %board.display(), "Neither side can move, game over");
            (player, false, GameStatus::Finished(board.winner()))
        };

        self.board = board;
        self.to_move = to_move;
        self.passed = passed;
        self.status = status;
        self.moves_played += 1;

        Ok(MoveReport {
            played: mv,
            flipped,
            passed,
            finished: self.outcome(),
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
