//! Line protocol spoken with external AI processes.
//!
//! Server to player:
//! - `ping` once after spawn, answered with `pong`
//! - `<64 squares> <side>` per move request, squares `X`/`O`/`-` in index
//!   order and side `X` (black) or `O` (white)
//!
//! Player to server: the chosen move as a board index `0..63`.
//!
//! End of input tells the player to exit.

use crate::games::reversi::{Board, Disc, Move, NUM_SQUARES};
use std::io::{Error, ErrorKind};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Handshake request.
pub const PING: &str = "ping";

/// Handshake reply.
pub const PONG: &str = "pong";

/// Longest line either side accepts, terminator excluded.
pub const MAX_LINE_LEN: usize = 1024;

/// Encodes a move request.
pub fn encode_request(board: &Board, to_move: Disc) -> String {
    format!("{} {}", board.to_line(), to_move.symbol())
}

/// Decodes a move request into the board and side to move.
pub fn decode_request(line: &str) -> Result<(Board, Disc), String> {
    let mut parts = line.split_whitespace();
    let squares = parts.next().ok_or_else(|| "empty request".to_string())?;
    let side = parts
        .next()
        .ok_or_else(|| "missing side to move".to_string())?;
    if parts.next().is_some() {
        return Err(format!("trailing data in request: {line:?}"));
    }

    let board = Board::from_line(squares)?;
    let mut chars = side.chars();
    let disc = match (chars.next(), chars.next()) {
        (Some(c), None) => Disc::from_symbol(c),
        _ => None,
    }
    .ok_or_else(|| format!("invalid side to move {side:?}"))?;

    Ok((board, disc))
}

/// Encodes a move reply.
pub fn encode_reply(mv: Move) -> String {
    mv.index().to_string()
}

/// Decodes a move reply.
pub fn decode_reply(line: &str) -> Result<Move, String> {
    let trimmed = line.trim();
    let index: usize = trimmed
        .parse()
        .map_err(|_| format!("expected a move index, got {trimmed:?}"))?;
    Move::from_index(index).ok_or_else(|| format!("move index {index} outside 0..{NUM_SQUARES}"))
}

/// Reads one line of at most `max_len` bytes, without its `\n` or `\r\n`.
///
/// Returns `Ok(None)` at end of input. A final line without a terminator
/// is still returned.
///
/// # Errors
///
/// Fails with [`ErrorKind::InvalidData`] if the line is longer than
/// `max_len` or is not UTF-8, and with any I/O error of `reader`.
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(2);
    let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > max_len {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("line longer than {max_len} bytes"),
        ));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))
}
