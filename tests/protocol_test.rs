//! Tests for the AI line protocol and the player-side driver.

use reversi_server::{
    AlphaBetaStrategy, Board, Disc, Evaluation, MAX_LINE_LEN, Move, RandomStrategy, decode_reply,
    decode_request, encode_reply, encode_request, read_line, run_player,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[test]
fn test_request_encodes_board_then_side() {
    let mut expected = vec!['-'; 64];
    expected[27] = 'O';
    expected[28] = 'X';
    expected[35] = 'X';
    expected[36] = 'O';
    let expected: String = expected.into_iter().collect();

    assert_eq!(encode_request(&Board::new(), Disc::Black), format!("{expected} X"));
    assert_eq!(encode_request(&Board::new(), Disc::White), format!("{expected} O"));
}

#[test]
fn test_request_decodes_back() {
    let (board, _) = Board::new()
        .apply_move(Disc::Black, Move::from_index(19).expect("On board"))
        .expect("Legal opening");
    let (decoded, side) = decode_request(&encode_request(&board, Disc::White)).expect("Valid line");
    assert_eq!(decoded, board);
    assert_eq!(side, Disc::White);
}

#[test]
fn test_malformed_requests_are_rejected() {
    assert!(decode_request("").is_err());
    assert!(decode_request(&"-".repeat(64)).is_err());
    assert!(decode_request(&format!("{} Z", "-".repeat(64))).is_err());
    assert!(decode_request(&format!("{} X extra", "-".repeat(64))).is_err());
    assert!(decode_request("XO X").is_err());
}

#[test]
fn test_reply_is_board_index() {
    let mv = Move::new(2, 3).expect("On board");
    assert_eq!(encode_reply(mv), "19");
    assert_eq!(decode_reply("19"), Ok(mv));
    assert_eq!(decode_reply(" 19 \r"), Ok(mv));
}

#[test]
fn test_malformed_replies_are_rejected() {
    assert!(decode_reply("").is_err());
    assert!(decode_reply("64").is_err());
    assert!(decode_reply("-1").is_err());
    assert!(decode_reply("2,3").is_err());
    assert!(decode_reply("banana").is_err());
}

#[tokio::test]
async fn test_driver_answers_ping_and_requests() {
    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, mut client_write) = tokio::io::split(client);

    let player = tokio::spawn(async move {
        let strategy = AlphaBetaStrategy::new(2, Evaluation::PieceCount);
        run_player(&strategy, Disc::Black, BufReader::new(server_read), server_write).await
    });

    let mut replies = BufReader::new(client_read).lines();

    client_write.write_all(b"ping\n").await.expect("Write failed");
    assert_eq!(replies.next_line().await.expect("Read failed").as_deref(), Some("pong"));

    let request = format!("{}\n", encode_request(&Board::new(), Disc::Black));
    client_write.write_all(request.as_bytes()).await.expect("Write failed");
    let reply = replies.next_line().await.expect("Read failed").expect("Reply line");
    let mv = decode_reply(&reply).expect("Valid reply");
    assert!(Board::new().legal_moves(Disc::Black).contains(&mv));

    client_write.shutdown().await.expect("Shutdown failed");
    player.await.expect("Player task panicked").expect("Player failed");
}

#[tokio::test]
async fn test_driver_rejects_garbage_with_sentinel() {
    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (client_read, mut client_write) = tokio::io::split(client);

    let player = tokio::spawn(async move {
        let strategy = RandomStrategy::seeded(1);
        run_player(&strategy, Disc::White, BufReader::new(server_read), server_write).await
    });

    let mut replies = BufReader::new(client_read).lines();
    client_write.write_all(b"what is this\n").await.expect("Write failed");
    let reply = replies.next_line().await.expect("Read failed").expect("Reply line");
    assert!(decode_reply(&reply).is_err());

    client_write.shutdown().await.expect("Shutdown failed");
    player.await.expect("Player task panicked").expect("Player failed");
}

#[tokio::test]
async fn test_read_line_strips_terminators() {
    let mut reader = BufReader::new(&b"pong\r\n19\nlast"[..]);

    let first = read_line(&mut reader, MAX_LINE_LEN).await.expect("Readable");
    assert_eq!(first.as_deref(), Some("pong"));
    let second = read_line(&mut reader, MAX_LINE_LEN).await.expect("Readable");
    assert_eq!(second.as_deref(), Some("19"));
    let last = read_line(&mut reader, MAX_LINE_LEN).await.expect("Readable");
    assert_eq!(last.as_deref(), Some("last"));
    assert!(read_line(&mut reader, MAX_LINE_LEN).await.expect("Readable").is_none());
}

#[tokio::test]
async fn test_read_line_rejects_overlong_lines() {
    let exact = format!("{}\n", "a".repeat(8));
    let mut reader = BufReader::new(exact.as_bytes());
    let line = read_line(&mut reader, 8).await.expect("Line at the limit");
    assert_eq!(line.map(|l| l.len()), Some(8));

    let long = format!("{}\n", "a".repeat(9));
    let mut reader = BufReader::new(long.as_bytes());
    let err = read_line(&mut reader, 8).await.expect_err("Line over the limit");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    // Unterminated input is cut off at the limit instead of buffered whole.
    let endless = "a".repeat(MAX_LINE_LEN * 64);
    let mut reader = BufReader::new(endless.as_bytes());
    let err = read_line(&mut reader, MAX_LINE_LEN)
        .await
        .expect_err("Unterminated flood");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_driver_stops_on_overlong_request() {
    let strategy = RandomStrategy::seeded(1);
    let input = format!("{}\nping\n", "x".repeat(MAX_LINE_LEN + 1));
    let mut output = Vec::new();

    let err = run_player(&strategy, Disc::Black, BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect_err("Overlong request");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(output.is_empty());
}
