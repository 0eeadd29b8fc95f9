//! Player side of the line protocol, used by the `ai` subcommand.

use super::protocol::{MAX_LINE_LEN, PING, PONG, decode_request, encode_reply, read_line};
use super::strategy::Strategy;
use crate::games::reversi::Disc;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

const NO_MOVE: &str = "-1";

/// Serves move requests from `reader` until end of input.
///
/// `ping` is answered with `pong`. A request whose side to move differs
/// from `color` is still answered for the side named in the request.
/// Malformed requests and positions without a legal move are answered with
/// `-1`, which the server rejects.
///
/// # Errors
///
/// Returns I/O errors from the underlying streams, including an
/// `InvalidData` error for a request line longer than [`MAX_LINE_LEN`].
#[instrument(skip(strategy, reader, writer), fields(strategy = %strategy.name()))]
pub async fn run_player<R, W>(
    strategy: &dyn Strategy,
    color: Disc,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(%color, "AI player ready");
    while let Some(line) = read_line(&mut reader, MAX_LINE_LEN).await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = if line == PING {
            PONG.to_string()
        } else {
            match decode_request(line) {
                Ok((board, to_move)) => {
                    if to_move != color {
                        warn!(%to_move, %color, "Asked to move for the other side");
                    }
                    let legal = board.legal_moves(to_move);
                    match strategy.select_move(&board, to_move, &legal) {
                        Some(mv) => encode_reply(mv),
                        None => NO_MOVE.to_string(),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Malformed request");
                    NO_MOVE.to_string()
                }
            }
        };

        debug!(%reply, "Replying");
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("Input closed, exiting");
    Ok(())
}
