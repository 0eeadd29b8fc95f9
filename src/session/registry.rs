//! Session registry: game id to game, with one lock per game.

use super::view::GameView;
use crate::ai::{AiCatalog, AiSeat};
use crate::error::{ErrorKind, ReversiError};
use crate::games::reversi::{Board, Disc, Game, Move, MoveReport};
use crate::settings::Settings;
use crate::stats::{AiStats, GameResult, PlayerType, StatsRecorder};
use chrono::NaiveDateTime;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a game session.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Allocates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// AI binding requested when a game is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    /// Catalog id of the player.
    pub ai_player_id: String,
    /// Side the AI plays.
    pub ai_color: Disc,
}

impl AiSettings {
    /// Creates a binding request.
    pub fn new(ai_player_id: impl Into<String>, ai_color: Disc) -> Self {
        Self {
            ai_player_id: ai_player_id.into(),
            ai_color,
        }
    }
}

/// A catalog entry with its recorded results.
#[derive(Debug, Clone, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPlayerInfo {
    /// Catalog id.
    id: String,
    /// Display name.
    name: String,
    /// Free-form description.
    description: String,
    /// Strategy kind.
    kind: String,
    /// Results so far; absent if the recorder failed.
    stats: Option<AiStats>,
}

#[derive(Debug)]
struct Session {
    game: Game,
    ai: Option<AiSeat>,
    created_at: NaiveDateTime,
    last_access: Instant,
}

impl Session {
    fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    async fn release(&mut self) {
        if let Some(seat) = self.ai.as_mut() {
            seat.release().await;
        }
    }
}

/// Registry entry. The closed flag is raised once the entry has been
/// removed from the map; lock holders and waiters then report not found.
#[derive(Debug)]
struct SessionSlot {
    id: GameId,
    session: Mutex<Session>,
    closed: watch::Sender<bool>,
}

impl SessionSlot {
    fn new(id: GameId, session: Session) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            id,
            session: Mutex::new(session),
            closed,
        }
    }

    async fn lock(&self) -> Result<MutexGuard<'_, Session>, ReversiError> {
        let guard = self.session.lock().await;
        if self.is_closed() {
            return Err(ReversiError::not_found(self.id.as_str()));
        }
        Ok(guard)
    }

    fn close(&self) {
        self.closed.send_replace(true);
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Manages all game sessions.
///
/// Cloning is cheap; clones share the same registry. The map lock is held
/// only to look up, insert or remove entries, never across an await.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<GameId, Arc<SessionSlot>>>>,
    settings: Arc<Settings>,
    catalog: Arc<AiCatalog>,
    recorder: Arc<dyn StatsRecorder>,
}

impl SessionManager {
    /// Creates an empty registry.
    #[instrument(skip_all)]
    pub fn new(settings: Settings, catalog: AiCatalog, recorder: Arc<dyn StatsRecorder>) -> Self {
        info!(ai_players = catalog.len(), "Creating session manager");
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            recorder,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &GameId) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Creates a game from the standard position, optionally binding an AI.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::UnknownAiPlayer`] if the AI id is not in the catalog
    /// - [`ErrorKind::AiProtocol`] if an external AI fails to start
    #[instrument(skip(self))]
    pub async fn create_game(&self, ai: Option<AiSettings>) -> Result<GameView, ReversiError> {
        self.insert_game(Game::new(), ai).await
    }

    /// Creates a game from an arbitrary position. A blocked side to move
    /// passes immediately.
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::create_game`].
    #[instrument(skip(self, board))]
    pub async fn create_game_from_position(
        &self,
        board: Board,
        to_move: Disc,
        ai: Option<AiSettings>,
    ) -> Result<GameView, ReversiError> {
        self.insert_game(Game::from_position(board, to_move), ai).await
    }

    async fn insert_game(
        &self,
        game: Game,
        ai: Option<AiSettings>,
    ) -> Result<GameView, ReversiError> {
        let seat = match ai {
            Some(binding) => {
                let descriptor = self.catalog.get(&binding.ai_player_id).ok_or_else(|| {
                    warn!(ai_player = %binding.ai_player_id, "Unknown AI player");
                    ReversiError::new(ErrorKind::UnknownAiPlayer(binding.ai_player_id.clone()))
                })?;
                Some(AiSeat::bind(descriptor, binding.ai_color, &self.settings).await?)
            }
            None => None,
        };

        let id = GameId::generate();
        let view = GameView::new(id.clone(), &game);
        let ai_player = seat.as_ref().map(|s| s.player_id().to_string());
        let session = Session {
            game,
            ai: seat,
            created_at: chrono::Utc::now().naive_utc(),
            last_access: Instant::now(),
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::new(SessionSlot::new(id.clone(), session)));

        info!(game_id = %id, ai_player = ?ai_player, "Game created");
        Ok(view)
    }

    fn slot(&self, id: &GameId) -> Result<Arc<SessionSlot>, ReversiError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| {
                debug!(game_id = %id, "Game not found");
                ReversiError::not_found(id.as_str())
            })
    }

    /// Returns the current view and refreshes the last-access time.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::GameNotFound`] if the id is unknown or evicted.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn get_game(&self, id: &GameId) -> Result<GameView, ReversiError> {
        let slot = self.slot(id)?;
        let mut session = slot.lock().await?;
        session.touch();
        Ok(GameView::new(id.clone(), &session.game))
    }

    /// Plays `mv` for the side to move on behalf of the human client.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::GameNotFound`] if the id is unknown or evicted
    /// - [`ErrorKind::GameOver`] once the game has finished
    /// - [`ErrorKind::OutOfTurn`] if it is the bound AI's turn
    /// - [`ErrorKind::IllegalMove`] if the move captures nothing
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn make_move(&self, id: &GameId, mv: Move) -> Result<GameView, ReversiError> {
        let slot = self.slot(id)?;
        let mut session = slot.lock().await?;

        let to_move = session.game.to_move();
        if !session.game.is_over() {
            if let Some(seat) = &session.ai {
                if seat.color() == to_move {
                    warn!(%to_move, "Human tried to move on the AI's turn");
                    return Err(ReversiError::new(ErrorKind::OutOfTurn {
                        requested: to_move.opponent(),
                        expected: to_move,
                    }));
                }
            }
        }

        let report = session.game.play(to_move, mv).map_err(|e| {
            debug!(%mv, error = %e, "Move rejected");
            ReversiError::from(e)
        })?;
        session.touch();
        self.after_move(id, &mut session, to_move, report).await;

        Ok(GameView::new(id.clone(), &session.game))
    }

    /// Asks the bound AI for its move and plays it.
    ///
    /// The session stays locked for the round trip, which the AI timeout
    /// bounds. Deleting or evicting the game meanwhile aborts the request.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::GameNotFound`] if the id is unknown, evicted, or
    ///   deleted while the AI was thinking
    /// - [`ErrorKind::NoAiBound`] without an AI or when it is not the AI's turn
    /// - [`ErrorKind::GameOver`] once the game has finished
    /// - [`ErrorKind::AiProtocol`] when the AI fails; the game is unchanged
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn request_ai_move(&self, id: &GameId) -> Result<GameView, ReversiError> {
        let slot = self.slot(id)?;
        let mut session = slot.lock().await?;
        let mut closed = slot.closed.subscribe();

        let Session { game, ai, .. } = &mut *session;
        let seat = ai.as_mut().ok_or_else(|| {
            ReversiError::new(ErrorKind::NoAiBound("No AI player configured".to_string()))
        })?;
        if game.is_over() {
            return Err(ReversiError::new(ErrorKind::GameOver));
        }
        let color = seat.color();
        if game.to_move() != color {
            return Err(ReversiError::new(ErrorKind::NoAiBound("Not AI's turn".to_string())));
        }

        let board = *game.board();
        let mv = tokio::select! {
            selected = seat.select_move(&board) => selected?,
            _ = async { let _ = closed.wait_for(|closed| *closed).await; } => {
                info!("Game removed while the AI was thinking");
                return Err(ReversiError::not_found(id.as_str()));
            }
        };

        let report = game.play(color, mv)?;
        info!(%color, %mv, flipped = report.flipped, "AI move applied");
        session.touch();
        self.after_move(id, &mut session, color, report).await;

        Ok(GameView::new(id.clone(), &session.game))
    }

    /// Records the result when `report` ended a game with a bound AI.
    async fn after_move(&self, id: &GameId, session: &mut Session, mover: Disc, report: MoveReport) {
        debug!(%mover, played = %report.played, passed = report.passed, "Move applied");
        let Some(outcome) = report.finished else {
            return;
        };
        info!(game_id = %id, winner = %outcome, "Game finished");

        let Some(seat) = &session.ai else {
            return;
        };
        let (black_score, white_score) = session.game.board().score();
        let ai_id = Some(seat.player_id().to_string());
        let (black_player, white_player, black_ai_id, white_ai_id) = match seat.color() {
            Disc::Black => (PlayerType::Ai, PlayerType::Human, ai_id, None),
            Disc::White => (PlayerType::Human, PlayerType::Ai, None, ai_id),
        };
        let discs = u32::from(black_score) + u32::from(white_score);
        let result = GameResult::new(
            id.to_string(),
            session.created_at,
            chrono::Utc::now().naive_utc(),
            black_player,
            white_player,
            black_ai_id,
            white_ai_id,
            outcome,
            black_score,
            white_score,
            discs.saturating_sub(4),
        );

        let recorder = Arc::clone(&self.recorder);
        match tokio::task::spawn_blocking(move || recorder.record_result(&result)).await {
            Ok(Ok(())) => debug!("Result recorded"),
            Ok(Err(e)) => error!(error = %e, "Failed to record game result"),
            Err(e) => error!(error = %e, "Result recorder task failed"),
        }
    }

    /// Removes a game and terminates its AI process before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::GameNotFound`] if the id is unknown or already
    /// removed.
    #[instrument(skip(self), fields(game_id = %id))]
    pub async fn delete_game(&self, id: &GameId) -> Result<(), ReversiError> {
        let slot = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| ReversiError::not_found(id.as_str()))?;

        slot.close();
        let mut session = slot.session.lock().await;
        session.release().await;
        info!("Game deleted");
        Ok(())
    }

    /// One eviction sweep: removes sessions idle for longer than `timeout`.
    ///
    /// Sessions locked by a request are in use and skipped. Returns the
    /// number of evicted sessions.
    #[instrument(skip(self))]
    pub async fn collect_garbage(&self, timeout: Duration) -> usize {
        let candidates: Vec<Arc<SessionSlot>> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut evicted = 0;
        for slot in candidates {
            let Ok(mut session) = slot.session.try_lock() else {
                debug!(game_id = %slot.id, "Session busy, skipping");
                continue;
            };
            let idle = Instant::now().saturating_duration_since(session.last_access);
            if idle <= timeout {
                continue;
            }

            let removed = {
                let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
                match sessions.get(&slot.id) {
                    Some(current) if Arc::ptr_eq(current, &slot) => {
                        sessions.remove(&slot.id);
                        true
                    }
                    _ => false,
                }
            };
            if !removed {
                continue;
            }

            slot.close();
            session.release().await;
            info!(game_id = %slot.id, idle_secs = idle.as_secs(), "Evicted idle game");
            evicted += 1;
        }

        if evicted > 0 {
            info!(evicted, remaining = self.len(), "Garbage collection complete");
        }
        evicted
    }

    /// Catalog entries with their statistics, in catalog order.
    #[instrument(skip(self))]
    pub async fn list_ai_players(&self) -> Vec<AiPlayerInfo> {
        let catalog = Arc::clone(&self.catalog);
        let recorder = Arc::clone(&self.recorder);

        let listing = tokio::task::spawn_blocking(move || {
            catalog
                .players()
                .iter()
                .map(|descriptor| {
                    let stats = recorder
                        .stats_for(descriptor.id())
                        .map_err(|e| warn!(ai_player = %descriptor.id(), error = %e, "Stats unavailable"))
                        .ok();
                    AiPlayerInfo {
                        id: descriptor.id().clone(),
                        name: descriptor.name().clone(),
                        description: descriptor.description().clone(),
                        kind: descriptor.strategy().kind().to_string(),
                        stats,
                    }
                })
                .collect::<Vec<_>>()
        })
        .await;

        listing.unwrap_or_else(|e| {
            error!(error = %e, "Listing task failed");
            Vec::new()
        })
    }

    /// Removes every session and terminates all AI processes.
    #[instrument(skip(self))]
    pub async fn shutdown_all(&self) {
        let slots: Vec<Arc<SessionSlot>> = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, slot)| slot)
            .collect();

        let count = slots.len();
        for slot in slots {
            slot.close();
            let mut session = slot.session.lock().await;
            session.release().await;
        }
        info!(count, "All sessions released");
    }
}
