//! The observer contract, the ordered observer set, and a channel-backed
//! observer for collaborators that prefer to consume notifications as values.

use std::sync::mpsc;
use std::sync::Arc;

use tracing::debug;

use super::engine::{EngineId, GameEngine};
use super::player::{GameMode, Player};

/// Receives lifecycle and move notifications from a [`GameEngine`].
///
/// Callbacks run synchronously on the caller's thread, in registration order,
/// before the triggering engine call returns. Read-only engine accessors may be
/// used from inside a callback; mutating calls on the same engine may not.
pub trait GameObserver: Send + Sync {
    /// A game started, or this observer joined a game already in play.
    fn on_game_started(&self, turn: Player, mode: GameMode, engine: &GameEngine);

    /// This observer left the game.
    fn on_game_stopped(&self, engine: &GameEngine);

    /// A token landed at `(row, col)`. Also used to replay the board to late
    /// joiners.
    fn on_move_made(&self, row: usize, col: usize, owner: Player, engine: &GameEngine);

    /// The token at `(row, col)` completed a run for `owner`.
    fn on_game_won(&self, row: usize, col: usize, owner: Player, engine: &GameEngine);

    /// The board filled up without a winner.
    fn on_game_draw(&self, engine: &GameEngine);
}

/// Shared handle under which an observer is registered. Two handles denote the
/// same observer only if they point at the same allocation.
pub type ObserverHandle = Arc<dyn GameObserver>;

/// One notification, as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted { turn: Player, mode: GameMode },
    GameStopped,
    MoveMade { row: usize, col: usize, owner: Player },
    GameWon { row: usize, col: usize, owner: Player },
    GameDraw,
}

impl GameEvent {
    /// Route this event to the matching observer callback.
    pub fn deliver(&self, observer: &dyn GameObserver, engine: &GameEngine) {
        match *self {
            GameEvent::GameStarted { turn, mode } => observer.on_game_started(turn, mode, engine),
            GameEvent::GameStopped => observer.on_game_stopped(engine),
            GameEvent::MoveMade { row, col, owner } => observer.on_move_made(row, col, owner, engine),
            GameEvent::GameWon { row, col, owner } => observer.on_game_won(row, col, owner, engine),
            GameEvent::GameDraw => observer.on_game_draw(engine),
        }
    }

    /// Whether this event ends the running game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::GameWon { .. } | GameEvent::GameDraw)
    }
}

/// Registered observers in insertion order, without duplicates.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<ObserverHandle>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observer`; `false` if it is already registered.
    pub fn insert(&mut self, observer: ObserverHandle) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove `observer`; `false` if it was not registered.
    pub fn remove(&mut self, observer: &ObserverHandle) -> bool {
        match self.observers.iter().position(|o| same_observer(o, observer)) {
            Some(idx) => {
                self.observers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, observer: &ObserverHandle) -> bool {
        self.observers.iter().any(|o| same_observer(o, observer))
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Handles in notification order, detached from the set so delivery can
    /// proceed without holding engine state.
    pub fn snapshot(&self) -> Vec<ObserverHandle> {
        self.observers.clone()
    }
}

/// Compare by allocation only; vtable pointers of the same type may differ
/// between codegen units.
fn same_observer(a: &ObserverHandle, b: &ObserverHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Forwards every notification over an mpsc channel as
/// `(engine id, event)`.
pub struct ChannelObserver {
    tx: mpsc::Sender<(EngineId, GameEvent)>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::Receiver<(EngineId, GameEvent)>) {
        let (tx, rx) = mpsc::channel();
        (ChannelObserver { tx }, rx)
    }

    /// Build a registered-ready handle together with its receiving end.
    pub fn handle() -> (ObserverHandle, mpsc::Receiver<(EngineId, GameEvent)>) {
        let (observer, rx) = Self::new();
        (Arc::new(observer), rx)
    }

    fn forward(&self, engine: &GameEngine, event: GameEvent) {
        if self.tx.send((engine.id(), event)).is_err() {
            debug!(engine = %engine.id(), ?event, "channel observer receiver dropped");
        }
    }
}

impl GameObserver for ChannelObserver {
    fn on_game_started(&self, turn: Player, mode: GameMode, engine: &GameEngine) {
        self.forward(engine, GameEvent::GameStarted { turn, mode });
    }

    fn on_game_stopped(&self, engine: &GameEngine) {
        self.forward(engine, GameEvent::GameStopped);
    }

    fn on_move_made(&self, row: usize, col: usize, owner: Player, engine: &GameEngine) {
        self.forward(engine, GameEvent::MoveMade { row, col, owner });
    }

    fn on_game_won(&self, row: usize, col: usize, owner: Player, engine: &GameEngine) {
        self.forward(engine, GameEvent::GameWon { row, col, owner });
    }

    fn on_game_draw(&self, engine: &GameEngine) {
        self.forward(engine, GameEvent::GameDraw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rejects_duplicates_and_keeps_order() {
        let (a, _rx_a) = ChannelObserver::handle();
        let (b, _rx_b) = ChannelObserver::handle();
        let mut set = ObserverSet::new();

        assert!(set.insert(a.clone()));
        assert!(set.insert(b.clone()));
        assert!(!set.insert(a.clone()));
        assert_eq!(set.len(), 2);

        let order = set.snapshot();
        assert!(same_observer(&order[0], &a));
        assert!(same_observer(&order[1], &b));
    }

    #[test]
    fn test_set_remove() {
        let (a, _rx) = ChannelObserver::handle();
        let mut set = ObserverSet::new();
        set.insert(a.clone());

        assert!(set.remove(&a));
        assert!(!set.remove(&a));
        assert!(set.is_empty());
    }

    #[test]
    fn test_distinct_allocations_are_distinct_observers() {
        let (a, _rx_a) = ChannelObserver::handle();
        let (b, _rx_b) = ChannelObserver::handle();
        assert!(!same_observer(&a, &b));
        assert!(same_observer(&a, &a.clone()));
    }

    #[test]
    fn test_terminal_events() {
        assert!(GameEvent::GameDraw.is_terminal());
        assert!(GameEvent::GameWon {
            row: 0,
            col: 0,
            owner: Player::Player1
        }
        .is_terminal());
        assert!(!GameEvent::GameStopped.is_terminal());
    }
}
