//! AI player catalog: the table of players a game can be bound to.

use super::search::Evaluation;
use crate::settings::ConfigError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// How an AI player chooses its moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Uniformly random legal move.
    Random,
    /// In-process alpha-beta search.
    AlphaBeta {
        /// Search depth in plies.
        depth: u8,
        /// Horizon evaluation.
        #[serde(default)]
        evaluation: Evaluation,
    },
    /// External program speaking the line protocol.
    Process {
        /// Program and arguments; the color is appended at spawn.
        command: Vec<String>,
        /// Working directory for the program.
        #[serde(default)]
        cwd: Option<PathBuf>,
    },
}

impl StrategySpec {
    /// Short label for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            StrategySpec::Random => "random",
            StrategySpec::AlphaBeta { .. } => "alpha_beta",
            StrategySpec::Process { .. } => "process",
        }
    }
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AiPlayerDescriptor {
    /// Identifier clients bind games to.
    id: String,
    /// Display name.
    name: String,
    /// Free-form description.
    #[serde(default)]
    description: String,
    /// Move selection.
    strategy: StrategySpec,
}

impl AiPlayerDescriptor {
    /// Creates a descriptor.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        strategy: StrategySpec,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            strategy,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    players: Vec<AiPlayerDescriptor>,
}

/// Read-only table of AI players, in declaration order.
#[derive(Debug, Clone)]
pub struct AiCatalog {
    players: Vec<AiPlayerDescriptor>,
}

impl AiCatalog {
    /// The built-in players.
    pub fn builtin() -> Self {
        Self {
            players: vec![
                AiPlayerDescriptor::new(
                    "random",
                    "Random AI",
                    "Plays a random legal move",
                    StrategySpec::Random,
                ),
                AiPlayerDescriptor::new(
                    "piece_depth3",
                    "Piece Counter (Depth 3)",
                    "Alpha-beta search, depth 3, disc difference",
                    StrategySpec::AlphaBeta {
                        depth: 3,
                        evaluation: Evaluation::PieceCount,
                    },
                ),
                AiPlayerDescriptor::new(
                    "piece_depth5",
                    "Piece Counter (Depth 5)",
                    "Alpha-beta search, depth 5, disc difference",
                    StrategySpec::AlphaBeta {
                        depth: 5,
                        evaluation: Evaluation::PieceCount,
                    },
                ),
                AiPlayerDescriptor::new(
                    "positional_depth4",
                    "Positional (Depth 4)",
                    "Alpha-beta search, depth 4, square weight table",
                    StrategySpec::AlphaBeta {
                        depth: 4,
                        evaluation: Evaluation::Positional,
                    },
                ),
            ],
        }
    }

    /// Loads a catalog from a TOML file with `[[players]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the entries are invalid (see [`AiCatalog::from_descriptors`]).
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading AI catalog from file");
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read AI catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: CatalogFile = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse AI catalog: {}", e)))?;

        let catalog = Self::from_descriptors(file.players)?;
        info!(count = catalog.len(), "AI catalog loaded");
        Ok(catalog)
    }

    /// Builds a catalog from descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty table, an empty or duplicate id,
    /// a zero search depth, or an empty process command.
    pub fn from_descriptors(players: Vec<AiPlayerDescriptor>) -> Result<Self, ConfigError> {
        if players.is_empty() {
            return Err(ConfigError::new("AI catalog has no players".to_string()));
        }

        let mut seen = HashSet::new();
        for player in &players {
            if player.id.trim().is_empty() {
                return Err(ConfigError::new("AI player with empty id".to_string()));
            }
            if !seen.insert(player.id.as_str()) {
                return Err(ConfigError::new(format!(
                    "Duplicate AI player id: {}",
                    player.id
                )));
            }
            match &player.strategy {
                StrategySpec::AlphaBeta { depth: 0, .. } => {
                    return Err(ConfigError::new(format!(
                        "AI player {} has search depth 0",
                        player.id
                    )));
                }
                StrategySpec::Process { command, .. }
                    if command.first().is_none_or(|program| program.trim().is_empty()) =>
                {
                    return Err(ConfigError::new(format!(
                        "AI player {} has an empty command",
                        player.id
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { players })
    }

    /// Looks up a player by id.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<&AiPlayerDescriptor> {
        self.players.iter().find(|p| p.id == id)
    }

    /// All players in declaration order.
    pub fn players(&self) -> &[AiPlayerDescriptor] {
        &self.players
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for AiCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
