use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use super::board::{Board, Cell, GameConfig};
use super::observer::{GameEvent, ObserverHandle, ObserverSet};
use super::player::{GameMode, Player};
use crate::ai::{LookaheadOpponent, Opponent};
use crate::error::EngineError;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies an engine instance to observers watching several games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    fn next() -> Self {
        EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whose turn it is and how much of the grid is left.
///
/// `remaining_moves` always equals `rows * columns` minus the filled cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState {
    pub current_player: Player,
    pub remaining_moves: usize,
    pub started: bool,
}

impl TurnState {
    fn initial(config: &GameConfig) -> Self {
        TurnState {
            current_player: Player::Player1,
            remaining_moves: config.total_moves(),
            started: false,
        }
    }
}

struct EngineState {
    board: Board,
    turn: TurnState,
    mode: Option<GameMode>,
    observers: ObserverSet,
    opponent: Box<dyn Opponent>,
}

/// The game-state engine: grid, turn, lifecycle and observer fan-out.
///
/// Mutating operations are serialized per engine. Engine state is never locked
/// while observers run, so callbacks may use the read-only accessors; calling
/// a mutating operation on the same engine from inside a callback deadlocks.
pub struct GameEngine {
    id: EngineId,
    config: GameConfig,
    operation: Mutex<()>,
    state: Mutex<EngineState>,
}

impl GameEngine {
    /// Create an engine whose single-player opponent is a [`LookaheadOpponent`].
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        Self::with_opponent(config, Box::new(LookaheadOpponent::new()))
    }

    pub fn with_opponent(config: GameConfig, opponent: Box<dyn Opponent>) -> Result<Self, EngineError> {
        config.validate()?;
        let engine = GameEngine {
            id: EngineId::next(),
            config,
            operation: Mutex::new(()),
            state: Mutex::new(EngineState {
                board: Board::new(config.rows, config.columns),
                turn: TurnState::initial(&config),
                mode: None,
                observers: ObserverSet::new(),
                opponent,
            }),
        };
        debug!(engine = %engine.id, %config, "engine created");
        Ok(engine)
    }

    /// Start a new game in `mode`, notifying every registered observer.
    ///
    /// `requester` does not have to be registered. Returns `false` without any
    /// effect if a game is already running.
    pub fn start_game(&self, requester: &ObserverHandle, mode: GameMode) -> bool {
        let _op = self.begin_operation();
        let (turn, observers, requester_joined) = {
            let mut state = self.state();
            if state.turn.started {
                debug!(engine = %self.id, "start declined: game already running");
                return false;
            }
            state.board.clear();
            state.turn = TurnState::initial(&self.config);
            state.turn.started = true;
            state.mode = Some(mode);
            (
                state.turn.current_player,
                state.observers.snapshot(),
                state.observers.contains(requester),
            )
        };

        info!(engine = %self.id, %mode, requester_joined, "game started");
        self.broadcast(&observers, GameEvent::GameStarted { turn, mode });
        true
    }

    /// Register `observer`. If a game is running, the newcomer alone receives a
    /// `GameStarted` followed by one `MoveMade` per filled cell, in row-major
    /// order. Returns `false` if it was already registered.
    pub fn join_game(&self, observer: ObserverHandle) -> bool {
        let _op = self.begin_operation();
        let replay = {
            let mut state = self.state();
            if !state.observers.insert(observer.clone()) {
                debug!(engine = %self.id, "join declined: observer already registered");
                return false;
            }
            match (state.turn.started, state.mode) {
                (true, Some(mode)) => {
                    let mut events = vec![GameEvent::GameStarted {
                        turn: state.turn.current_player,
                        mode,
                    }];
                    events.extend(
                        state
                            .board
                            .filled_cells()
                            .map(|(row, col, owner)| GameEvent::MoveMade { row, col, owner }),
                    );
                    events
                }
                _ => Vec::new(),
            }
        };

        info!(engine = %self.id, replayed = replay.len(), "observer joined");
        for event in &replay {
            event.deliver(observer.as_ref(), self);
        }
        true
    }

    /// Unregister `observer` and send it `GameStopped`. When the last observer
    /// leaves, the running game is marked not started without a broadcast.
    /// Returns `false` if it was not registered.
    pub fn exit_game(&self, observer: &ObserverHandle) -> bool {
        let _op = self.begin_operation();
        {
            let mut state = self.state();
            if !state.observers.remove(observer) {
                debug!(engine = %self.id, "exit declined: observer not registered");
                return false;
            }
            if state.observers.is_empty() && state.turn.started {
                state.turn.started = false;
                info!(engine = %self.id, "last observer left; game no longer running");
            }
        }

        GameEvent::GameStopped.deliver(observer.as_ref(), self);
        true
    }

    /// Drop the current player's token into `column`.
    ///
    /// Returns `Ok(false)` if no game is running or the column is full. In
    /// single-player mode the automated reply is played before returning.
    #[instrument(level = "debug", skip(self), fields(engine = %self.id))]
    pub fn play_move(&self, column: usize) -> Result<bool, EngineError> {
        let _op = self.begin_operation();
        {
            let state = self.state();
            if !state.turn.started {
                debug!("move declined: game not started");
                return Ok(false);
            }
            if column >= self.config.columns {
                return Err(EngineError::ColumnOutOfRange {
                    column,
                    columns: self.config.columns,
                });
            }
            if state.board.is_column_full(column) {
                debug!("move declined: column full");
                return Ok(false);
            }
        }

        let mut next = Some(column);
        while let Some(column) = next {
            next = self.apply_move(column)?;
        }
        Ok(true)
    }

    /// Place, announce and settle one move in an already-validated column.
    /// Returns the automated reply when the next mover is engine-driven.
    fn apply_move(&self, column: usize) -> Result<Option<usize>, EngineError> {
        let (row, owner, observers) = {
            let mut state = self.state();
            let owner = state.turn.current_player;
            let row = state
                .board
                .drop_piece(column, owner.to_cell())
                .map_err(|_| EngineError::IllegalOpponentMove {
                    column,
                    open: state.board.open_columns(),
                })?;
            state.turn.remaining_moves -= 1;
            (row, owner, state.observers.snapshot())
        };

        debug!(row, column, %owner, "token placed");
        self.broadcast(&observers, GameEvent::MoveMade { row, col: column, owner });

        let mut state = self.state();
        if let Some(axis) = state
            .board
            .completes_run(row, column, owner, self.config.win_length)
        {
            state.turn.started = false;
            drop(state);
            info!(engine = %self.id, row, column, %owner, ?axis, "game won");
            self.broadcast(&observers, GameEvent::GameWon { row, col: column, owner });
            return Ok(None);
        }

        if state.turn.remaining_moves == 0 {
            state.turn.started = false;
            drop(state);
            info!(engine = %self.id, "game drawn");
            self.broadcast(&observers, GameEvent::GameDraw);
            return Ok(None);
        }

        let next = owner.other();
        state.turn.current_player = next;
        if !state.mode.is_some_and(|mode| mode.is_automated(next)) {
            return Ok(None);
        }

        let EngineState { board, opponent, .. } = &mut *state;
        match opponent.choose_column(board, next, self.config.win_length) {
            Some(col) if !board.is_column_full(col) => Ok(Some(col)),
            choice => {
                warn!(engine = %self.id, ?choice, opponent = opponent.name(), "opponent chose an unplayable column");
                Err(EngineError::IllegalOpponentMove {
                    column: choice.unwrap_or(usize::MAX),
                    open: board.open_columns(),
                })
            }
        }
    }

    fn broadcast(&self, observers: &[ObserverHandle], event: GameEvent) {
        for observer in observers {
            event.deliver(observer.as_ref(), self);
        }
    }

    fn begin_operation(&self) -> MutexGuard<'_, ()> {
        self.operation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn rows(&self) -> usize {
        self.config.rows
    }

    pub fn columns(&self) -> usize {
        self.config.columns
    }

    pub fn win_length(&self) -> usize {
        self.config.win_length
    }

    /// Whose turn it is. After a win this is still the winner.
    pub fn current_turn(&self) -> Player {
        self.state().turn.current_player
    }

    /// Whether a game is currently running.
    pub fn is_started(&self) -> bool {
        self.state().turn.started
    }

    /// Mode of the current or most recent game; `None` before the first start.
    pub fn mode(&self) -> Option<GameMode> {
        self.state().mode
    }

    pub fn remaining_moves(&self) -> usize {
        self.state().turn.remaining_moves
    }

    pub fn turn_state(&self) -> TurnState {
        self.state().turn
    }

    /// Contents of one cell, rejecting coordinates outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell, EngineError> {
        self.state().board.get(row, col)
    }

    /// Copy of the current grid.
    pub fn board(&self) -> Board {
        self.state().board.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.state().observers.len()
    }
}

impl fmt::Display for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Engine of {}", self.config)
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
