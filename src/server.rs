//! HTTP routes over the session registry.

use crate::error::{ErrorKind, ReversiError};
use crate::games::reversi::Move;
use crate::session::{AiPlayerInfo, AiSettings, GameId, GameView, SessionManager};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Body of `POST /api/game/new`. An empty body means no AI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Optional AI binding.
    #[serde(default)]
    pub ai_player: Option<AiSettings>,
}

/// Raw board coordinate as sent by clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    /// Row, top to bottom.
    pub row: i64,
    /// Column, left to right.
    pub col: i64,
}

/// Body of `POST /api/game/move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    /// Target game.
    pub game_id: GameId,
    /// Square to play.
    pub position: Position,
}

/// Body of `POST /api/game/ai-move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMoveRequest {
    /// Target game.
    pub game_id: GameId,
}

/// Error response: status plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ReversiError> for ApiError {
    fn from(err: ReversiError) -> Self {
        let status = match err.kind() {
            ErrorKind::GameNotFound(_) => StatusCode::NOT_FOUND,
            ErrorKind::AiProtocol(_) => StatusCode::BAD_GATEWAY,
            ErrorKind::OutOfTurn { .. }
            | ErrorKind::IllegalMove(_)
            | ErrorKind::GameOver
            | ErrorKind::NoAiBound(_)
            | ErrorKind::UnknownAiPlayer(_) => StatusCode::BAD_REQUEST,
        };
        debug!(error = %err, "Request failed");
        Self {
            status,
            message: err.kind().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "Request rejected");
        (
            self.status,
            Json(serde_json::json!({"detail": self.message})),
        )
            .into_response()
    }
}

/// Builds the API router.
pub fn router(manager: SessionManager) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/game/new", post(create_game))
        .route("/api/game/move", post(make_move))
        .route("/api/game/ai-move", post(ai_move))
        .route("/api/game/{game_id}", get(get_game).delete(delete_game))
        .route("/api/ai/players", get(list_ai_players))
        .with_state(manager)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[instrument(skip_all)]
async fn create_game(
    State(manager): State<SessionManager>,
    body: Bytes,
) -> Result<Json<GameView>, ApiError> {
    let request: CreateGameRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?
    };

    Ok(Json(manager.create_game(request.ai_player).await?))
}

#[instrument(skip_all, fields(game_id = %request.game_id))]
async fn make_move(
    State(manager): State<SessionManager>,
    Json(request): Json<MakeMoveRequest>,
) -> Result<Json<GameView>, ApiError> {
    let Position { row, col } = request.position;
    let mv = match (u8::try_from(row), u8::try_from(col)) {
        (Ok(row), Ok(col)) => Move::new(row, col).map_err(ReversiError::from)?,
        _ => {
            return Err(ReversiError::new(ErrorKind::IllegalMove(format!(
                "({}, {}) is outside the board",
                row, col
            )))
            .into());
        }
    };

    Ok(Json(manager.make_move(&request.game_id, mv).await?))
}

#[instrument(skip_all, fields(game_id = %game_id))]
async fn get_game(
    State(manager): State<SessionManager>,
    Path(game_id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(manager.get_game(&GameId::from(game_id)).await?))
}

#[instrument(skip_all, fields(game_id = %request.game_id))]
async fn ai_move(
    State(manager): State<SessionManager>,
    Json(request): Json<AiMoveRequest>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(manager.request_ai_move(&request.game_id).await?))
}

#[instrument(skip_all, fields(game_id = %game_id))]
async fn delete_game(
    State(manager): State<SessionManager>,
    Path(game_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    manager.delete_game(&GameId::from(game_id.clone())).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Game {} deleted successfully", game_id)
    })))
}

#[instrument(skip_all)]
async fn list_ai_players(State(manager): State<SessionManager>) -> Json<Vec<AiPlayerInfo>> {
    Json(manager.list_ai_players().await)
}
