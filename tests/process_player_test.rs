//! Tests for AI players running as child processes.

#![cfg(unix)]

use std::time::{Duration, Instant};

use reversi_server::{Board, Disc, ErrorKind, Move, ProcessPlayer};

const TIMEOUT: Duration = Duration::from_millis(500);
const GRACE: Duration = Duration::from_millis(200);

/// Runs `script` under `sh -c`; the color lands in `$1`.
fn sh(script: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        "player".to_string(),
    ]
}

async fn spawn(command: &[String]) -> Result<ProcessPlayer, reversi_server::ReversiError> {
    ProcessPlayer::spawn("test", command, None, Disc::Black, TIMEOUT, GRACE).await
}

fn is_protocol_error(err: &reversi_server::ReversiError) -> bool {
    matches!(err.kind(), ErrorKind::AiProtocol(_))
}

#[tokio::test]
async fn test_handshake_and_move() {
    let mut player = spawn(&sh("read l; echo pong; while read l; do echo 19; done"))
        .await
        .expect("Spawn failed");
    assert!(player.is_alive());
    assert_eq!(player.color(), Disc::Black);

    let mv = player.request_move(&Board::new()).await.expect("Move failed");
    assert_eq!(mv, Move::new(2, 3).expect("On board"));

    player.shutdown().await;
    assert!(!player.is_alive());
}

#[tokio::test]
async fn test_color_is_passed_as_last_argument() {
    let mut player = spawn(&sh(
        r#"read l; echo pong; while read l; do if [ "$1" = BLACK ]; then echo 19; else echo 0; fi; done"#,
    ))
    .await
    .expect("Spawn failed");

    let mv = player.request_move(&Board::new()).await.expect("Move failed");
    assert_eq!(mv.index(), 19);
    player.shutdown().await;
}

#[tokio::test]
async fn test_silent_process_times_out() {
    let mut player = spawn(&sh("read l; echo pong; while read l; do sleep 30; done"))
        .await
        .expect("Spawn failed");

    let started = Instant::now();
    let err = player
        .request_move(&Board::new())
        .await
        .expect_err("Silent player must time out");
    assert!(is_protocol_error(&err));
    assert!(started.elapsed() < TIMEOUT + Duration::from_secs(2));
    assert!(!player.is_alive());

    player.shutdown().await;
}

#[tokio::test]
async fn test_malformed_reply_marks_process_dead() {
    let mut player = spawn(&sh("read l; echo pong; while read l; do echo banana; done"))
        .await
        .expect("Spawn failed");

    let err = player.request_move(&Board::new()).await.expect_err("Malformed reply");
    assert!(is_protocol_error(&err));
    assert!(!player.is_alive());

    let started = Instant::now();
    let err = player.request_move(&Board::new()).await.expect_err("Dead process");
    assert!(is_protocol_error(&err));
    assert!(started.elapsed() < TIMEOUT);

    player.shutdown().await;
}

#[tokio::test]
async fn test_crash_mid_game_is_reported() {
    let mut player = spawn(&sh("read l; echo pong; read l; exit 3"))
        .await
        .expect("Spawn failed");

    let err = player.request_move(&Board::new()).await.expect_err("Crashed process");
    assert!(is_protocol_error(&err));
    player.shutdown().await;
}

#[tokio::test]
async fn test_crash_report_carries_stderr_tail() {
    let mut player = spawn(&sh(
        "read l; echo pong; read l; echo 'loading book' >&2; echo 'engine exploded' >&2; exit 3",
    ))
    .await
    .expect("Spawn failed");

    let err = player.request_move(&Board::new()).await.expect_err("Crashed process");
    assert!(is_protocol_error(&err));
    let message = err.to_string();
    assert!(message.contains("terminated unexpectedly"), "{message}");
    assert!(message.contains("loading book | engine exploded"), "{message}");
    player.shutdown().await;
}

#[tokio::test]
async fn test_overlong_reply_is_rejected_before_timeout() {
    let mut player = spawn(&sh(
        "read l; echo pong; read l; while true; do printf 1111111111111111; done",
    ))
    .await
    .expect("Spawn failed");

    let started = Instant::now();
    let err = player.request_move(&Board::new()).await.expect_err("Endless reply");
    assert!(is_protocol_error(&err));
    assert!(err.to_string().contains("longer than"), "{err}");
    assert!(started.elapsed() < TIMEOUT);
    assert!(!player.is_alive());

    player.shutdown().await;
}

#[tokio::test]
async fn test_failed_handshake_is_rejected() {
    let err = spawn(&sh("read l; echo hello"))
        .await
        .expect_err("Wrong handshake");
    assert!(is_protocol_error(&err));

    let err = spawn(&sh("exit 0")).await.expect_err("Immediate exit");
    assert!(is_protocol_error(&err));
}

#[tokio::test]
async fn test_missing_program_is_rejected() {
    let command = vec!["definitely-not-a-reversi-player".to_string()];
    let err = spawn(&command).await.expect_err("Missing program");
    assert!(is_protocol_error(&err));

    let err = spawn(&[]).await.expect_err("Empty command");
    assert!(is_protocol_error(&err));
}

#[tokio::test]
async fn test_shutdown_kills_process_ignoring_end_of_input() {
    let mut player = spawn(&sh("read l; echo pong; while true; do sleep 1; done"))
        .await
        .expect("Spawn failed");

    let started = Instant::now();
    player.shutdown().await;
    assert!(started.elapsed() < GRACE + Duration::from_secs(2));

    // Second call is a no-op.
    player.shutdown().await;
}

#[tokio::test]
async fn test_crate_binary_plays_as_external_ai() {
    let command = vec![
        env!("CARGO_BIN_EXE_reversi_server").to_string(),
        "ai".to_string(),
        "--strategy".to_string(),
        "alphabeta".to_string(),
        "--depth".to_string(),
        "2".to_string(),
    ];
    let mut player = ProcessPlayer::spawn(
        "builtin",
        &command,
        None,
        Disc::Black,
        Duration::from_secs(10),
        GRACE,
    )
    .await
    .expect("Spawn failed");

    let board = Board::new();
    let mv = player.request_move(&board).await.expect("Move failed");
    assert!(board.legal_moves(Disc::Black).contains(&mv));

    let started = Instant::now();
    player.shutdown().await;
    assert!(started.elapsed() < Duration::from_secs(2));
}
