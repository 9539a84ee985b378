use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;
use crate::game::{GameConfig, GameMode, Player};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: GameConfig,
    pub game: GameSettings,
    pub players: PlayerNames,
    pub log: LogConfig,
}

/// How games are started from the front-end.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub mode: GameMode,
    /// Seed for the automated opponent; random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_seed: Option<u64>,
}

/// Display names for the two sides.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerNames {
    pub player1: String,
    pub player2: String,
}

impl PlayerNames {
    pub fn name(&self, player: Player) -> &str {
        match player {
            Player::Player1 => &self.player1,
            Player::Player2 => &self.player2,
        }
    }
}

impl Default for PlayerNames {
    fn default() -> Self {
        PlayerNames {
            player1: Player::Player1.name().to_string(),
            player2: Player::Player2.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: PathBuf::from("connect_four.log"),
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;

        let names = &self.players;
        if names.player1.trim().is_empty() {
            return Err(ConfigError::Validation(
                "players.player1 must not be empty".into(),
            ));
        }
        if names.player2.trim().is_empty() {
            return Err(ConfigError::Validation(
                "players.player2 must not be empty".into(),
            ));
        }
        if names.player1 == names.player2 {
            return Err(ConfigError::Validation(
                "players.player1 and players.player2 must differ".into(),
            ));
        }

        if self.log.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
