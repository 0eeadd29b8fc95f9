//! Integration tests for the SQLite result store.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use reversi_server::{
    AiCatalog, AiSettings, DbErrorKind, Disc, GameRepository, GameResult, Outcome, PlayerType,
    SessionManager, Settings, StatsRecorder,
};
use tempfile::NamedTempFile;

fn open_repo() -> (NamedTempFile, GameRepository) {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let path = file.path().to_str().expect("Invalid path").to_string();
    let repo = GameRepository::open(path).expect("Failed to open repository");
    (file, repo)
}

fn at(minutes: i64) -> NaiveDateTime {
    let base = NaiveDateTime::parse_from_str("2026-01-01 12:00:00", "%Y-%m-%d %H:%M:%S")
        .expect("Valid timestamp");
    base + Duration::minutes(minutes)
}

fn ai_as_white(id: &str, ai: &str, winner: Outcome, score: (u8, u8), finished: i64) -> GameResult {
    GameResult::new(
        id.to_string(),
        at(0),
        at(finished),
        PlayerType::Human,
        PlayerType::Ai,
        None,
        Some(ai.to_string()),
        winner,
        score.0,
        score.1,
        u32::from(score.0) + u32::from(score.1) - 4,
    )
}

#[test]
fn test_open_rejects_empty_path() {
    let err = GameRepository::open("").expect_err("Empty path");
    assert_eq!(err.kind, DbErrorKind::InvalidPath);
    assert!(GameRepository::new("   ".to_string()).is_err());
}

#[test]
fn test_migrations_are_idempotent() {
    let (_file, repo) = open_repo();
    repo.run_migrations().expect("Second run must be a no-op");
}

#[test]
fn test_record_and_load_game() {
    let (_file, repo) = open_repo();
    let result = ai_as_white("g1", "random", Outcome::White, (20, 44), 30);

    repo.record_game(&result).expect("Insert failed");

    let record = repo
        .get_game("g1")
        .expect("Query failed")
        .expect("Game stored");
    assert_eq!(record.winner(), "WHITE");
    assert_eq!(record.white_player_type(), "AI");
    assert_eq!(record.to_result().expect("Readable row"), result);

    assert!(repo.get_game("missing").expect("Query failed").is_none());
}

#[test]
fn test_duplicate_game_id_is_rejected() {
    let (_file, repo) = open_repo();
    let result = ai_as_white("dup", "random", Outcome::Draw, (32, 32), 10);

    repo.record_game(&result).expect("First insert");
    let err = repo.record_game(&result).expect_err("Duplicate id");
    assert_eq!(err.kind, DbErrorKind::DuplicateGame);
}

#[test]
fn test_games_for_ai_newest_first() {
    let (_file, repo) = open_repo();
    repo.record_game(&ai_as_white("old", "random", Outcome::Black, (40, 24), 5))
        .expect("Insert failed");
    repo.record_game(&ai_as_white("new", "random", Outcome::White, (10, 54), 50))
        .expect("Insert failed");
    repo.record_game(&ai_as_white("other", "piece_depth3", Outcome::White, (1, 63), 20))
        .expect("Insert failed");

    let games = repo.games_for_ai("random").expect("Query failed");
    let ids: Vec<&str> = games.iter().map(|g| g.id().as_str()).collect();
    assert_eq!(ids, ["new", "old"]);
}

#[test]
fn test_stats_aggregate_by_color() {
    let (_file, repo) = open_repo();
    let recorder: &dyn StatsRecorder = &repo;

    recorder
        .record_result(&ai_as_white("w1", "random", Outcome::White, (20, 44), 1))
        .expect("Insert failed");
    recorder
        .record_result(&ai_as_white("w2", "random", Outcome::Black, (40, 24), 2))
        .expect("Insert failed");

    let now = Utc::now().naive_utc();
    let as_black = GameResult::new(
        "b1".to_string(),
        now,
        now,
        PlayerType::Ai,
        PlayerType::Human,
        Some("random".to_string()),
        None,
        Outcome::Draw,
        32,
        32,
        60,
    );
    recorder.record_result(&as_black).expect("Insert failed");

    let stats = recorder.stats_for("random").expect("Stats failed");
    assert_eq!(*stats.games_played(), 3);
    assert_eq!(*stats.overall().wins(), 1);
    assert_eq!(*stats.overall().losses(), 1);
    assert_eq!(*stats.overall().draws(), 1);
    assert_eq!(stats.as_white().games(), 2);
    assert_eq!(*stats.as_black().draws(), 1);
    assert_eq!(*stats.total_score(), 44 + 24 + 32);
    assert!((stats.win_rate() - 100.0 / 3.0).abs() < 1e-9);

    let none = recorder.stats_for("nobody").expect("Stats failed");
    assert_eq!(*none.games_played(), 0);
    assert_eq!(none.win_rate(), 0.0);
}

#[tokio::test]
async fn test_finished_session_lands_in_database() {
    let (_file, repo) = open_repo();
    let manager = SessionManager::new(
        Settings::default(),
        AiCatalog::builtin(),
        Arc::new(repo.clone()),
    );

    let view = manager
        .create_game(Some(AiSettings::new("random", Disc::Black)))
        .await
        .expect("Create failed");
    let id = view.game_id().clone();

    loop {
        let view = manager.get_game(&id).await.expect("Get failed");
        if *view.game_over() {
            break;
        }
        if *view.current_player() == Disc::Black {
            manager.request_ai_move(&id).await.expect("AI move failed");
        } else {
            manager
                .make_move(&id, view.legal_moves()[0])
                .await
                .expect("Move failed");
        }
    }

    let record = repo
        .get_game(id.as_str())
        .expect("Query failed")
        .expect("Result stored");
    assert_eq!(record.black_ai_id().as_deref(), Some("random"));
    assert_eq!(record.black_player_type(), "AI");
    assert_eq!(record.white_player_type(), "HUMAN");

    let players = manager.list_ai_players().await;
    let random = players
        .iter()
        .find(|p| p.id() == "random")
        .and_then(|p| p.stats().clone())
        .expect("Stats listed");
    assert_eq!(*random.games_played(), 1);
}
