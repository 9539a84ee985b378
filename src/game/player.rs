use std::fmt;
use std::str::FromStr;

use super::board::Cell;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    /// The side played by the engine in single-player games.
    pub const AUTOMATED: Player = Player::Player2;

    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Player::Player1 => Cell::Player1,
            Player::Player2 => Cell::Player2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Player1 => "Player1",
            Player::Player2 => "Player2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether Player2 is a second human or the automated opponent. Fixed for the
/// duration of one started game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    SinglePlayer,
    #[default]
    TwoPlayer,
}

impl GameMode {
    /// Whether `player` is driven by the engine under this mode.
    pub fn is_automated(self, player: Player) -> bool {
        self == GameMode::SinglePlayer && player == Player::AUTOMATED
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::SinglePlayer => "Single Player",
            GameMode::TwoPlayer => "Two Player",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "single-player" | "single" => Ok(GameMode::SinglePlayer),
            "two-player" | "two" => Ok(GameMode::TwoPlayer),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }
}
