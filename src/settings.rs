//! Server settings loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// What to do with an AI process after it failed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RestartPolicy {
    /// Keep the process dead; later AI moves fail until the game is deleted.
    #[default]
    Abort,
    /// Spawn a fresh process on the next AI move request.
    Respawn,
}

/// Runtime settings for the session registry and AI processes.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct Settings {
    /// Inactivity (seconds) after which a game is evicted.
    game_timeout_secs: u64,

    /// Interval (seconds) between garbage collection sweeps.
    gc_interval_secs: u64,

    /// Maximum wait (milliseconds) for an AI process to answer one request.
    ai_move_timeout_ms: u64,

    /// Grace period (milliseconds) for an AI process to exit before it is killed.
    ai_shutdown_grace_ms: u64,

    /// Behaviour after an AI process failure.
    ai_restart: RestartPolicy,

    /// SQLite database for game results. In-memory statistics when unset.
    #[setters(strip_option, into)]
    database_path: Option<String>,

    /// TOML file replacing the built-in AI player table.
    #[setters(strip_option, into)]
    ai_players_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_timeout_secs: 3600,
            gc_interval_secs: 60,
            ai_move_timeout_ms: 10_000,
            ai_shutdown_grace_ms: 2_000,
            ai_restart: RestartPolicy::Abort,
            database_path: None,
            ai_players_file: None,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read settings file: {}", e)))?;

        let settings = Self::from_toml(&content)?;
        info!(?settings, "Settings loaded");
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gc_interval_secs == 0 {
            return Err(ConfigError::new("gc_interval_secs must be positive".to_string()));
        }
        if self.ai_move_timeout_ms == 0 {
            return Err(ConfigError::new("ai_move_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Inactivity timeout as a [`Duration`].
    pub fn game_timeout(&self) -> Duration {
        Duration::from_secs(self.game_timeout_secs)
    }

    /// Sweep interval as a [`Duration`].
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }

    /// Per-request AI timeout as a [`Duration`].
    pub fn ai_move_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_move_timeout_ms)
    }

    /// AI shutdown grace period as a [`Duration`].
    pub fn ai_shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.ai_shutdown_grace_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
