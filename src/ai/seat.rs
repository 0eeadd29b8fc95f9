//! An AI player bound to one side of one game.

use super::catalog::{AiPlayerDescriptor, StrategySpec};
use super::process::ProcessPlayer;
use super::search::AlphaBetaStrategy;
use super::strategy::{RandomStrategy, Strategy};
use crate::error::ReversiError;
use crate::games::reversi::{Board, Disc, Move};
use crate::settings::{RestartPolicy, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Where moves come from.
#[derive(Debug)]
enum AiEngine {
    Local(Arc<dyn Strategy>),
    External(ExternalEngine),
}

#[derive(Debug)]
struct ExternalEngine {
    command: Vec<String>,
    cwd: Option<PathBuf>,
    move_timeout: Duration,
    grace: Duration,
    restart: RestartPolicy,
    process: Option<ProcessPlayer>,
    failed: bool,
}

/// The AI side of a game.
///
/// Owns its engine exclusively; an external process belongs to exactly one
/// seat and is terminated by [`AiSeat::release`].
#[derive(Debug)]
pub struct AiSeat {
    player_id: String,
    color: Disc,
    engine: AiEngine,
}

impl AiSeat {
    /// Binds `descriptor` to `color`. External players are spawned and
    /// handshaken before this returns.
    ///
    /// # Errors
    ///
    /// Returns an AI protocol error if an external player fails to start.
    #[instrument(skip(descriptor, settings), fields(player_id = %descriptor.id()))]
    pub async fn bind(
        descriptor: &AiPlayerDescriptor,
        color: Disc,
        settings: &Settings,
    ) -> Result<Self, ReversiError> {
        let engine = match descriptor.strategy() {
            StrategySpec::Random => AiEngine::Local(Arc::new(RandomStrategy::new())),
            StrategySpec::AlphaBeta { depth, evaluation } => {
                AiEngine::Local(Arc::new(AlphaBetaStrategy::new(*depth, *evaluation)))
            }
            StrategySpec::Process { command, cwd } => {
                let process = ProcessPlayer::spawn(
                    descriptor.id(),
                    command,
                    cwd.as_deref(),
                    color,
                    settings.ai_move_timeout(),
                    settings.ai_shutdown_grace(),
                )
                .await?;
                AiEngine::External(ExternalEngine {
                    command: command.clone(),
                    cwd: cwd.clone(),
                    move_timeout: settings.ai_move_timeout(),
                    grace: settings.ai_shutdown_grace(),
                    restart: *settings.ai_restart(),
                    process: Some(process),
                    failed: false,
                })
            }
        };

        info!(%color, kind = descriptor.strategy().kind(), "AI seat bound");
        Ok(Self {
            player_id: descriptor.id().clone(),
            color,
            engine,
        })
    }

    /// Catalog id of the bound player.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Side the AI plays.
    pub fn color(&self) -> Disc {
        self.color
    }

    /// Asks the engine for a move on `board`. The returned move is legal for
    /// the seat's color.
    ///
    /// # Errors
    ///
    /// Returns an AI protocol error when the engine fails or proposes an
    /// illegal move.
    #[instrument(skip(self, board), fields(player_id = %self.player_id, color = %self.color))]
    pub async fn select_move(&mut self, board: &Board) -> Result<Move, ReversiError> {
        let color = self.color;
        let mv = match &mut self.engine {
            AiEngine::Local(strategy) => {
                let strategy = Arc::clone(strategy);
                let board = *board;
                let legal = board.legal_moves(color);
                tokio::task::spawn_blocking(move || strategy.select_move(&board, color, &legal))
                    .await
                    .map_err(|e| ReversiError::protocol(format!("AI search task failed: {}", e)))?
                    .ok_or_else(|| ReversiError::protocol("AI has no move to play"))?
            }
            AiEngine::External(engine) => engine.request_move(&self.player_id, color, board).await?,
        };

        if !board.is_legal(color, mv) {
            warn!(%mv, "AI proposed an illegal move");
            if let AiEngine::External(engine) = &mut self.engine {
                engine.fail().await;
            }
            return Err(ReversiError::protocol(format!(
                "AI player {} proposed illegal move {}",
                self.player_id, mv
            )));
        }

        debug!(%mv, "AI move selected");
        Ok(mv)
    }

    /// Terminates any external process. Safe to call more than once.
    #[instrument(skip(self), fields(player_id = %self.player_id))]
    pub async fn release(&mut self) {
        if let AiEngine::External(engine) = &mut self.engine {
            if let Some(mut process) = engine.process.take() {
                process.shutdown().await;
                info!("AI process released");
            }
        }
    }
}

impl ExternalEngine {
    async fn request_move(
        &mut self,
        player_id: &str,
        color: Disc,
        board: &Board,
    ) -> Result<Move, ReversiError> {
        if self.process.is_none() {
            if self.failed && self.restart == RestartPolicy::Abort {
                return Err(ReversiError::protocol(format!(
                    "AI player {} has failed and will not be restarted",
                    player_id
                )));
            }
            info!(player_id, "Respawning AI process");
            let process = ProcessPlayer::spawn(
                player_id,
                &self.command,
                self.cwd.as_deref(),
                color,
                self.move_timeout,
                self.grace,
            )
            .await?;
            self.process = Some(process);
            self.failed = false;
        }

        let Some(process) = self.process.as_mut() else {
            return Err(ReversiError::protocol("AI process unavailable"));
        };
        match process.request_move(board).await {
            Ok(mv) => Ok(mv),
            Err(e) => {
                self.fail().await;
                Err(e)
            }
        }
    }

    async fn fail(&mut self) {
        self.failed = true;
        if let Some(mut process) = self.process.take() {
            process.shutdown().await;
        }
    }
}
