//! Core domain types for reversi.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const BOARD_SIZE: usize = 8;

/// Number of squares on the board.
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// A disc color, which is also the identity of a player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(into = "u8", try_from = "u8")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Disc {
    /// Black (moves first).
    Black,
    /// White.
    White,
}

impl Disc {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Disc::Black => Disc::White,
            Disc::White => Disc::Black,
        }
    }

    /// Single-character symbol used in board lines (`X` black, `O` white).
    pub fn symbol(self) -> char {
        match self {
            Disc::Black => 'X',
            Disc::White => 'O',
        }
    }

    /// Parses a board-line symbol.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'X' | 'x' => Some(Disc::Black),
            'O' | 'o' => Some(Disc::White),
            _ => None,
        }
    }
}

impl From<Disc> for u8 {
    fn from(disc: Disc) -> Self {
        match disc {
            Disc::Black => 1,
            Disc::White => 2,
        }
    }
}

impl TryFrom<u8> for Disc {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Disc::Black),
            2 => Ok(Disc::White),
            other => Err(format!("invalid disc value {other}, expected 1 or 2")),
        }
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a disc.
    Occupied(Disc),
}

impl From<Square> for u8 {
    fn from(square: Square) -> Self {
        match square {
            Square::Empty => 0,
            Square::Occupied(disc) => disc.into(),
        }
    }
}

impl TryFrom<u8> for Square {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Square::Empty),
            other => Disc::try_from(other).map(Square::Occupied),
        }
    }
}

/// A board coordinate, `row` and `col` both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawMove")]
pub struct Move {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawMove {
    row: i64,
    col: i64,
}

impl TryFrom<RawMove> for Move {
    type Error = RulesError;

    fn try_from(raw: RawMove) -> Result<Self, Self::Error> {
        let (Ok(row), Ok(col)) = (u8::try_from(raw.row), u8::try_from(raw.col)) else {
            return Err(RulesError::OutOfBounds);
        };
        Move::new(row, col)
    }
}

impl Move {
    /// Creates a move, rejecting coordinates outside the board.
    pub fn new(row: u8, col: u8) -> Result<Self, RulesError> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Ok(Self { row, col })
        } else {
            Err(RulesError::OutOfBounds)
        }
    }

    /// Creates a move from a 0..63 board index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_SQUARES).then(|| Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        })
    }

    /// Row, top to bottom.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column, left to right.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Board index in row-major order (0..63).
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Result of a finished game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Outcome {
    /// Black has more discs.
    Black,
    /// White has more discs.
    White,
    /// Equal disc counts.
    Draw,
}

impl Outcome {
    /// Returns the winning color, or `None` for a draw.
    pub fn winner(self) -> Option<Disc> {
        match self {
            Outcome::Black => Some(Disc::Black),
            Outcome::White => Some(Disc::White),
            Outcome::Draw => None,
        }
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Neither side can move.
    Finished(Outcome),
}

/// Rule violations raised by the board engine and the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RulesError {
    /// Coordinates outside the 8x8 board.
    #[display("move is outside the board")]
    OutOfBounds,
    /// Target occupied or nothing captured.
    #[display("illegal move at {_0}")]
    IllegalMove(#[error(not(source))] Move),
    /// The requesting side is not the side to move.
    #[display("not {requested}'s turn, {expected} to move")]
    OutOfTurn {
        /// Side that tried to move.
        requested: Disc,
        /// Side whose turn it is.
        expected: Disc,
    },
    /// The game has already finished.
    #[display("game is already over")]
    GameOver,
}
