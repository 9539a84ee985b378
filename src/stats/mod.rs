//! Game statistics: an observer that keeps a per-game log and outcome rates.

mod game_stats;

pub use game_stats::{GameResult, GameStats};
