use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::game::{EngineId, GameEngine, GameMode, GameObserver, Player};

/// Result of a single finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub winner: Option<Player>,
    pub game_length: usize,
}

#[derive(Debug, Clone, Copy)]
struct ActiveGame {
    number: u64,
    moves: usize,
}

struct Ledger {
    next_number: u64,
    active: HashMap<EngineId, ActiveGame>,
    results: VecDeque<GameResult>,
    capacity: usize,
    total_games: usize, // lifetime count, never capped
    log: VecDeque<String>, // capped at `capacity` like `results`
}

impl Ledger {
    fn write(&mut self, engine: EngineId, line: String) {
        info!(engine = %engine, "{}", line);
        self.log.push_back(line);
        if self.log.len() > self.capacity {
            self.log.pop_front();
        }
    }

    /// Close the game tracked for `engine`, logging `line` built from its
    /// number, or note that it was already gone.
    fn finish(
        &mut self,
        engine: EngineId,
        winner: Option<Player>,
        line: impl FnOnce(u64) -> String,
    ) {
        match self.active.remove(&engine) {
            Some(game) => {
                self.write(engine, line(game.number));
                self.total_games += 1;
                self.results.push_back(GameResult {
                    winner,
                    game_length: game.moves,
                });
                if self.results.len() > self.capacity {
                    self.results.pop_front();
                }
            }
            None => self.write(engine, "Engine is already removed.".to_string()),
        }
    }

    fn last(&self, last_n: usize) -> impl Iterator<Item = &GameResult> {
        self.results.iter().rev().take(last_n)
    }
}

/// Observer that numbers games across every engine it is joined to, keeps a
/// human-readable log, and tracks outcome rates over a rolling window. Both
/// the log and the results keep at most `capacity` entries.
pub struct GameStats {
    ledger: Mutex<Ledger>,
}

impl GameStats {
    pub fn with_capacity(capacity: usize) -> Self {
        GameStats {
            ledger: Mutex::new(Ledger {
                next_number: 1,
                active: HashMap::new(),
                results: VecDeque::with_capacity(capacity),
                capacity,
                total_games: 0,
                log: VecDeque::with_capacity(capacity),
            }),
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retained log lines, oldest first.
    pub fn log_lines(&self) -> Vec<String> {
        self.ledger().log.iter().cloned().collect()
    }

    /// The last `n` log lines, oldest first.
    pub fn recent_log(&self, n: usize) -> Vec<String> {
        let ledger = self.ledger();
        let skip = ledger.log.len().saturating_sub(n);
        ledger.log.iter().skip(skip).cloned().collect()
    }

    /// Games that ended in a win or a draw.
    pub fn total_games(&self) -> usize {
        self.ledger().total_games
    }

    /// Number of games currently being tracked.
    pub fn active_games(&self) -> usize {
        self.ledger().active.len()
    }

    /// Share of the last N finished games won by `player`.
    pub fn win_rate(&self, player: Player, last_n: usize) -> f32 {
        let ledger = self.ledger();
        let n = ledger.results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = ledger
            .last(n)
            .filter(|r| r.winner == Some(player))
            .count();
        wins as f32 / n as f32
    }

    /// Draw rate in the last N finished games.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        let ledger = self.ledger();
        let n = ledger.results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let draws = ledger.last(n).filter(|r| r.winner.is_none()).count();
        draws as f32 / n as f32
    }

    /// Average number of tokens placed over the last N finished games.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let ledger = self.ledger();
        let n = ledger.results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = ledger.last(n).map(|r| r.game_length).sum();
        total as f32 / n as f32
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.ledger().log {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl GameObserver for GameStats {
    fn on_game_started(&self, _turn: Player, mode: GameMode, engine: &GameEngine) {
        let mut ledger = self.ledger();
        let id = engine.id();
        if let Some(game) = ledger.active.get(&id) {
            let line = format!("Engine is already tracked as game {}.", game.number);
            ledger.write(id, line);
            return;
        }
        let number = ledger.next_number;
        ledger.next_number += 1;
        ledger.active.insert(id, ActiveGame { number, moves: 0 });
        ledger.write(id, format!("Game {}: Started ({}).", number, mode));
    }

    fn on_game_stopped(&self, engine: &GameEngine) {
        let mut ledger = self.ledger();
        let id = engine.id();
        match ledger.active.remove(&id) {
            Some(game) => ledger.write(id, format!("Game {}: Stopped.", game.number)),
            None => ledger.write(id, "Engine is already removed.".to_string()),
        }
    }

    fn on_move_made(&self, _row: usize, _col: usize, _owner: Player, engine: &GameEngine) {
        if let Some(game) = self.ledger().active.get_mut(&engine.id()) {
            game.moves += 1;
        }
    }

    fn on_game_won(&self, _row: usize, _col: usize, owner: Player, engine: &GameEngine) {
        self.ledger()
            .finish(engine.id(), Some(owner), |n| format!("{} won game {}.", owner, n));
    }

    fn on_game_draw(&self, engine: &GameEngine) {
        self.ledger()
            .finish(engine.id(), None, |n| format!("Game {}: ended in a draw.", n));
    }
}
