//! HTTP route tests driving the router in-process.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use reversi_server::{AiCatalog, MemoryStatsRecorder, SessionManager, Settings, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    router(SessionManager::new(
        Settings::default(),
        AiCatalog::builtin(),
        Arc::new(MemoryStatsRecorder::new()),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("Valid request"))
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

async fn new_game(app: &Router, body: Option<Value>) -> Value {
    let (status, view) = send(app, Method::POST, "/api/game/new", body).await;
    assert_eq!(status, StatusCode::OK);
    view
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_new_game_with_empty_body() {
    let view = new_game(&app(), None).await;

    assert_eq!(view["currentPlayer"], 1);
    assert_eq!(view["score"], json!({"black": 2, "white": 2}));
    assert_eq!(view["gameOver"], false);
    assert_eq!(view["winner"], Value::Null);
    assert_eq!(view["board"][3][3], 2);
    assert_eq!(view["board"][3][4], 1);
    assert_eq!(
        view["legalMoves"],
        json!([
            {"row": 2, "col": 3},
            {"row": 3, "col": 2},
            {"row": 4, "col": 5},
            {"row": 5, "col": 4}
        ])
    );
    assert!(view["gameId"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_move_then_fetch() {
    let app = app();
    let view = new_game(&app, Some(json!({}))).await;
    let id = view["gameId"].as_str().expect("Game id").to_string();

    let (status, after) = send(
        &app,
        Method::POST,
        "/api/game/move",
        Some(json!({"gameId": id, "position": {"row": 2, "col": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["currentPlayer"], 2);
    assert_eq!(after["score"], json!({"black": 4, "white": 1}));

    let (status, fetched) = send(&app, Method::GET, &format!("/api/game/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, after);
}

#[tokio::test]
async fn test_illegal_and_off_board_moves_are_bad_requests() {
    let app = app();
    let id = new_game(&app, None).await["gameId"].clone();

    for position in [json!({"row": 0, "col": 0}), json!({"row": 8, "col": 0}), json!({"row": -1, "col": 3})] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/game/move",
            Some(json!({"gameId": id, "position": position})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().is_some_and(|d| d.contains("illegal move")));
    }
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/game/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("not found")));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/game/move",
        Some(json!({"gameId": "nope", "position": {"row": 2, "col": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ai_move_without_ai() {
    let app = app();
    let id = new_game(&app, None).await["gameId"].clone();

    let (status, body) = send(&app, Method::POST, "/api/game/ai-move", Some(json!({"gameId": id}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No AI player configured");
}

#[tokio::test]
async fn test_unknown_ai_player_is_rejected() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/game/new",
        Some(json!({"aiPlayer": {"aiPlayerId": "invalid_ai", "aiColor": 2}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("AI player not found")));
}

#[tokio::test]
async fn test_game_against_builtin_ai() {
    let app = app();
    let view = new_game(
        &app,
        Some(json!({"aiPlayer": {"aiPlayerId": "piece_depth3", "aiColor": 1}})),
    )
    .await;
    let id = view["gameId"].clone();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/game/move",
        Some(json!({"gameId": id, "position": {"row": 2, "col": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("turn")));

    let (status, after) = send(&app, Method::POST, "/api/game/ai-move", Some(json!({"gameId": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["currentPlayer"], 2);
}

#[tokio::test]
async fn test_delete_game() {
    let app = app();
    let id = new_game(&app, None).await["gameId"]
        .as_str()
        .expect("Game id")
        .to_string();
    let uri = format!("/api/game/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Game {id} deleted successfully"));

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_ai_players() {
    let (status, body) = send(&app(), Method::GET, "/api/ai/players", None).await;
    assert_eq!(status, StatusCode::OK);

    let players = body.as_array().expect("Array of players");
    assert_eq!(players.len(), 4);
    assert_eq!(players[0]["id"], "random");
    assert_eq!(players[0]["kind"], "random");
    assert_eq!(players[1]["kind"], "alpha_beta");
    assert_eq!(players[0]["stats"]["gamesPlayed"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/game/new")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("Valid request");
    let response = app.oneshot(request).await.expect("Router is infallible");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
