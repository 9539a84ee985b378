//! Core Connect Four game logic: the gravity grid and run detection, players
//! and modes, the game engine with its lifecycle, and the observer contract
//! through which every collaborator learns about state changes.

mod board;
mod engine;
mod observer;
mod player;

pub use board::{
    Axis, Board, Cell, GameConfig, MoveError, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WIN_LENGTH,
};
pub use engine::{EngineId, GameEngine, TurnState};
pub use observer::{ChannelObserver, GameEvent, GameObserver, ObserverHandle, ObserverSet};
pub use player::{GameMode, Player};
