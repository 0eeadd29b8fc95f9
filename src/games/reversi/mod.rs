mod board;
mod rules;
mod types;

pub use board::{Board, mask_to_moves};
pub use rules::{Game, MoveReport};
pub use types::{BOARD_SIZE, Disc, GameStatus, Move, NUM_SQUARES, Outcome, RulesError, Square};
