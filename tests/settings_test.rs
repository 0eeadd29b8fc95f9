//! Tests for settings loading.

use std::io::Write;
use std::time::Duration;

use reversi_server::{RestartPolicy, Settings};

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.game_timeout(), Duration::from_secs(3600));
    assert_eq!(settings.gc_interval(), Duration::from_secs(60));
    assert_eq!(settings.ai_move_timeout(), Duration::from_secs(10));
    assert_eq!(settings.ai_shutdown_grace(), Duration::from_secs(2));
    assert_eq!(*settings.ai_restart(), RestartPolicy::Abort);
    assert!(settings.database_path().is_none());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let settings = Settings::from_toml("").expect("Empty config is valid");
    assert_eq!(*settings.game_timeout_secs(), 3600);
}

#[test]
fn test_partial_toml_overrides() {
    let settings = Settings::from_toml(
        r#"
game_timeout_secs = 120
ai_restart = "respawn"
database_path = "games.db"
"#,
    )
    .expect("Valid config");

    assert_eq!(settings.game_timeout(), Duration::from_secs(120));
    assert_eq!(*settings.ai_restart(), RestartPolicy::Respawn);
    assert_eq!(settings.database_path().as_deref(), Some("games.db"));
    assert_eq!(*settings.gc_interval_secs(), 60);
}

#[test]
fn test_zero_intervals_are_rejected() {
    assert!(Settings::from_toml("gc_interval_secs = 0").is_err());
    assert!(Settings::from_toml("ai_move_timeout_ms = 0").is_err());
    assert!(Settings::from_toml("ai_restart = \"sometimes\"").is_err());
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "ai_move_timeout_ms = 250").expect("Failed to write");

    let settings = Settings::from_file(file.path()).expect("Valid file");
    assert_eq!(settings.ai_move_timeout(), Duration::from_millis(250));

    assert!(Settings::from_file("/nonexistent/reversi.toml").is_err());
}

#[test]
fn test_builder_setters() {
    let settings = Settings::default()
        .with_game_timeout_secs(5)
        .with_ai_restart(RestartPolicy::Respawn)
        .with_database_path("results.db");

    assert_eq!(settings.game_timeout(), Duration::from_secs(5));
    assert_eq!(*settings.ai_restart(), RestartPolicy::Respawn);
    assert_eq!(settings.database_path().as_deref(), Some("results.db"));
}
