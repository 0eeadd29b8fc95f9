//! Result-store errors.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;

/// Which stage of a store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DbErrorKind {
    /// Unusable database path.
    InvalidPath,
    /// The database file could not be opened.
    Connection,
    /// A schema migration failed.
    Migration,
    /// A result with the same game id is already stored.
    DuplicateGame,
    /// A stored row holds a value this version cannot read.
    CorruptRow,
    /// Any other query failure.
    Query,
}

/// Result-store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure stage.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`DbErrorKind::CorruptRow`].
    #[track_caller]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::CorruptRow, message)
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::DuplicateGame
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, err.to_string())
    }
}
