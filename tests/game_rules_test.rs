//! Tests for turn progression: passes, terminal detection, atomic updates.

use reversi_server::{Board, Disc, Game, GameStatus, Move, Outcome, RulesError};

fn mv(row: u8, col: u8) -> Move {
    Move::new(row, col).expect("Coordinates on the board")
}

/// Black can play (0,2) and (7,2); White has no move at all.
fn white_blocked() -> Board {
    Board::from_rows([
        "XO------", "--------", "--------", "--------", "--------", "--------", "--------",
        "XO------",
    ])
    .expect("Valid rows")
}

#[test]
fn test_new_game_black_to_move() {
    let game = Game::new();
    assert_eq!(game.to_move(), Disc::Black);
    assert_eq!(game.legal_moves().len(), 4);
    assert_eq!(game.status(), GameStatus::InProgress);
    assert!(!game.passed());
}

#[test]
fn test_first_move_hands_turn_to_white() {
    let mut game = Game::new();
    let report = game.play(Disc::Black, mv(2, 3)).expect("Legal opening");

    assert_eq!(report.flipped, 1);
    assert!(!report.passed);
    assert_eq!(report.finished, None);
    assert_eq!(game.to_move(), Disc::White);
    assert_eq!(game.board().score(), (4, 1));
    assert_eq!(game.moves_played(), 1);
}

#[test]
fn test_out_of_turn_is_rejected() {
    let mut game = Game::new();
    let result = game.play(Disc::White, mv(2, 4));
    assert_eq!(
        result,
        Err(RulesError::OutOfTurn {
            requested: Disc::White,
            expected: Disc::Black,
        })
    );
}

#[test]
fn test_failed_move_leaves_game_unchanged() {
    let mut game = Game::new();
    let before = game.clone();
    assert!(game.play(Disc::Black, mv(0, 0)).is_err());
    assert!(game.play(Disc::White, mv(2, 4)).is_err());
    assert_eq!(game, before);
}

#[test]
fn test_blocked_side_to_move_passes_without_board_change() {
    let board = white_blocked();
    let game = Game::from_position(board, Disc::White);

    assert_eq!(game.to_move(), Disc::Black);
    assert!(game.passed());
    assert_eq!(*game.board(), board);
    assert!(!game.is_over());
}

#[test]
fn test_opponent_without_moves_keeps_turn_then_game_ends() {
    let mut game = Game::from_position(white_blocked(), Disc::Black);
    assert!(!game.passed());

    let report = game.play(Disc::Black, mv(0, 2)).expect("Legal move");
    assert!(report.passed);
    assert_eq!(game.to_move(), Disc::Black);
    assert!(game.passed());

    let report = game.play(Disc::Black, mv(7, 2)).expect("Legal move");
    assert_eq!(report.finished, Some(Outcome::Black));
    assert_eq!(game.status(), GameStatus::Finished(Outcome::Black));
    assert!(game.legal_moves().is_empty());
}

#[test]
fn test_finished_game_rejects_moves() {
    let full = Board::from_bitboards(u64::MAX >> 32, !(u64::MAX >> 32));
    let mut game = Game::from_position(full, Disc::Black);

    assert!(game.is_over());
    assert_eq!(game.outcome(), Some(Outcome::Draw));
    assert_eq!(game.play(Disc::Black, mv(0, 0)), Err(RulesError::GameOver));
}
