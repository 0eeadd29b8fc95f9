//! AI players running as child processes.

use super::protocol::{MAX_LINE_LEN, PING, PONG, decode_reply, encode_request, read_line};
use crate::error::ReversiError;
use crate::games::reversi::{Board, Disc, Move};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// How long a crashed process gets to flush its stderr.
const STDERR_DRAIN: Duration = Duration::from_millis(200);

/// The last lines a process wrote to stderr.
#[derive(Debug, Clone, Default)]
struct StderrTail(Arc<Mutex<VecDeque<String>>>);

impl StderrTail {
    fn push(&self, line: String) {
        let mut lines = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == STDERR_TAIL_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    fn joined(&self) -> String {
        let lines = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        lines.iter().map(String::as_str).collect::<Vec<_>>().join(" | ")
    }
}

/// Forwards the child's stderr to the log and keeps its tail.
fn spawn_stderr_reader(name: String, stderr: ChildStderr, tail: StderrTail) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        loop {
            match read_line(&mut reader, MAX_LINE_LEN).await {
                Ok(Some(line)) => {
                    debug!(player = %name, %line, "AI stderr");
                    tail.push(line);
                }
                Ok(None) => break,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    debug!(player = %name, error = %e, "Unreadable AI stderr line");
                }
                Err(e) => {
                    debug!(player = %name, error = %e, "AI stderr closed");
                    break;
                }
            }
        }
    })
}

/// Handle to a spawned AI process and its pipes.
///
/// One request is in flight at a time; every read is bounded by the move
/// timeout. After any failure the process is considered dead and
/// [`ProcessPlayer::request_move`] fails immediately.
#[derive(Debug)]
pub struct ProcessPlayer {
    name: String,
    color: Disc,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_tail: StderrTail,
    stderr_task: Option<JoinHandle<()>>,
    move_timeout: Duration,
    grace: Duration,
    alive: bool,
}

impl ProcessPlayer {
    /// Spawns `command` with the color appended as the last argument and
    /// performs the ping/pong handshake.
    ///
    /// # Errors
    ///
    /// Returns an AI protocol error if the process cannot be started or does
    /// not answer the handshake in time. The process is terminated first.
    #[instrument(skip(command, cwd, move_timeout, grace), fields(command = ?command))]
    pub async fn spawn(
        name: &str,
        command: &[String],
        cwd: Option<&Path>,
        color: Disc,
        move_timeout: Duration,
        grace: Duration,
    ) -> Result<Self, ReversiError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ReversiError::protocol(format!("AI player {} has an empty command", name)))?;

        let mut cmd = Command::new(program);
        cmd.args(args).arg(color.to_string());
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReversiError::protocol(format!("failed to spawn AI player {}: {}", name, e)))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            tracing::error!("Failed to capture AI stdin");
            ReversiError::protocol("failed to capture AI stdin")
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            tracing::error!("Failed to capture AI stdout");
            ReversiError::protocol("failed to capture AI stdout")
        })?;
        let stderr_tail = StderrTail::default();
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| spawn_stderr_reader(name.to_string(), stderr, stderr_tail.clone()));

        let mut player = Self {
            name: name.to_string(),
            color,
            child: Some(child),
            stdin: Some(stdin),
            stdout: Some(BufReader::new(stdout)),
            stderr_tail,
            stderr_task,
            move_timeout,
            grace,
            alive: true,
        };

        let reply = match player.round_trip(PING).await {
            Ok(reply) => reply,
            Err(e) => {
                player.shutdown().await;
                return Err(e);
            }
        };
        if reply.trim() != PONG {
            player.shutdown().await;
            return Err(ReversiError::protocol(format!(
                "AI player {} failed ping check: got {:?}",
                name, reply
            )));
        }

        info!(player = %name, %color, "AI process started");
        Ok(player)
    }

    /// Color this process plays.
    pub fn color(&self) -> Disc {
        self.color
    }

    /// Whether the process is still usable.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sends the position and reads back one move.
    ///
    /// The reply is only checked for syntax here; legality is the caller's
    /// concern.
    #[instrument(skip(self, board), fields(player = %self.name, color = %self.color))]
    pub async fn request_move(&mut self, board: &Board) -> Result<Move, ReversiError> {
        if !self.alive {
            return Err(ReversiError::protocol(format!(
                "AI player {} is not running",
                self.name
            )));
        }

        let line = self.round_trip(&encode_request(board, self.color)).await?;
        decode_reply(&line).map_err(|e| {
            self.alive = false;
            warn!(reply = %line, error = %e, "Malformed AI reply");
            ReversiError::protocol(format!("AI player {} sent a malformed reply: {}", self.name, e))
        })
    }

    /// Closes stdin, waits up to the grace period for the process to exit,
    /// then kills it. Safe to call more than once.
    #[instrument(skip(self), fields(player = %self.name))]
    pub async fn shutdown(&mut self) {
        self.alive = false;
        self.stdout = None;
        // End of input is the exit signal.
        drop(self.stdin.take());

        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(self.grace, child.wait()).await {
                Ok(Ok(status)) => debug!(%status, "AI process exited"),
                Ok(Err(e)) => warn!(error = %e, "Failed to wait for AI process"),
                Err(_) => {
                    warn!(grace = ?self.grace, "AI process ignored shutdown, killing");
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "Failed to kill AI process");
                    }
                }
            }
        }

        // A grandchild may still hold the pipe open.
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }

    /// Waits briefly for the stderr reader to reach end of input.
    async fn drain_stderr(&mut self) {
        if let Some(mut task) = self.stderr_task.take() {
            if tokio::time::timeout(STDERR_DRAIN, &mut task).await.is_err() {
                self.stderr_task = Some(task);
            }
        }
    }

    async fn round_trip(&mut self, request: &str) -> Result<String, ReversiError> {
        let limit = self.move_timeout;
        match tokio::time::timeout(limit, self.exchange(request)).await {
            Ok(Ok(line)) => Ok(line),
            Ok(Err(e)) => {
                self.alive = false;
                Err(e)
            }
            Err(_) => {
                self.alive = false;
                warn!(timeout = ?limit, "AI process did not answer in time");
                if let Some(child) = self.child.as_mut() {
                    let _ = child.start_kill();
                }
                Err(ReversiError::protocol(format!(
                    "AI player {} did not answer within {:?}",
                    self.name, limit
                )))
            }
        }
    }

    async fn exchange(&mut self, request: &str) -> Result<String, ReversiError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ReversiError::protocol("AI stdin is closed"))?;
        let mut message = String::with_capacity(request.len() + 1);
        message.push_str(request);
        message.push('\n');
        stdin
            .write_all(message.as_bytes())
            .await
            .map_err(|e| ReversiError::protocol(format!("failed to write to AI player: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| ReversiError::protocol(format!("failed to flush AI stdin: {}", e)))?;
        debug!(request, "Sent request to AI");

        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| ReversiError::protocol("AI stdout is closed"))?;
        match read_line(stdout, MAX_LINE_LEN).await {
            Ok(Some(line)) => {
                debug!(reply = %line, "Received reply from AI");
                Ok(line)
            }
            Ok(None) => {
                self.drain_stderr().await;
                let status = self
                    .child
                    .as_mut()
                    .and_then(|child| child.try_wait().ok().flatten());
                let stderr = self.stderr_tail.joined();
                let mut message = format!(
                    "AI player {} terminated unexpectedly (status: {:?})",
                    self.name, status
                );
                if !stderr.is_empty() {
                    message.push_str(&format!("; stderr: {}", stderr));
                }
                Err(ReversiError::protocol(message))
            }
            Err(e) => Err(ReversiError::protocol(format!(
                "failed to read from AI player: {}",
                e
            ))),
        }
    }
}
