//! Error taxonomy surfaced by the session registry.

use crate::games::reversi::{Disc, RulesError};
use derive_more::{Display, Error};

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ErrorKind {
    /// Unknown or evicted game identifier.
    #[display("game {_0} not found")]
    GameNotFound(String),
    /// The requesting side is not the side to move.
    #[display("not {requested}'s turn, {expected} to move")]
    OutOfTurn {
        /// Side that tried to move.
        requested: Disc,
        /// Side whose turn it is.
        expected: Disc,
    },
    /// Move outside the board, onto an occupied square, or capturing nothing.
    #[display("illegal move: {_0}")]
    IllegalMove(String),
    /// The game has already finished.
    #[display("game is already over")]
    GameOver,
    /// AI move requested on a game without an AI, or not on the AI's turn.
    #[display("{_0}")]
    NoAiBound(String),
    /// The requested AI player id is not in the catalog.
    #[display("AI player not found: {_0}")]
    UnknownAiPlayer(String),
    /// The AI process misbehaved: spawn failure, timeout, malformed or illegal reply, crash.
    #[display("AI protocol error: {_0}")]
    AiProtocol(String),
}

/// Registry error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct ReversiError {
    /// Error category.
    pub kind: ErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ReversiError {
    /// Creates a new error recording the caller's location.
    #[track_caller]
    pub fn new(kind: ErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`ErrorKind::GameNotFound`].
    #[track_caller]
    pub fn not_found(game_id: impl Into<String>) -> Self {
        Self::new(ErrorKind::GameNotFound(game_id.into()))
    }

    /// Shorthand for [`ErrorKind::AiProtocol`].
    #[track_caller]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AiProtocol(message.into()))
    }

    /// Returns the error category.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<RulesError> for ReversiError {
    #[track_caller]
    fn from(err: RulesError) -> Self {
        let kind = match err {
            RulesError::OutOfBounds => ErrorKind::IllegalMove("outside the board".to_string()),
            RulesError::IllegalMove(mv) => ErrorKind::IllegalMove(mv.to_string()),
            RulesError::OutOfTurn {
                requested,
                expected,
            } => ErrorKind::OutOfTurn {
                requested,
                expected,
            },
            RulesError::GameOver => ErrorKind::GameOver,
        };
        Self::new(kind)
    }
}
