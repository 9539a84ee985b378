use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, warn};

use crate::config::PlayerNames;
use crate::game::{ChannelObserver, EngineId, GameEngine, GameEvent, GameMode, ObserverHandle};
use crate::stats::GameStats;

use super::board_view::{BoardView, ViewStatus};

pub struct App {
    engine: Arc<GameEngine>,
    handle: ObserverHandle,
    events: Receiver<(EngineId, GameEvent)>,
    view: BoardView,
    stats: Arc<GameStats>,
    names: PlayerNames,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    /// Build the view and join it to `engine` as an observer.
    pub fn new(engine: Arc<GameEngine>, stats: Arc<GameStats>, names: PlayerNames) -> Self {
        let (handle, events) = ChannelObserver::handle();
        engine.join_game(handle.clone());
        let view = BoardView::new(engine.rows(), engine.columns());
        let selected_column = engine.columns() / 2; // Start in middle

        App {
            engine,
            handle,
            events,
            view,
            stats,
            names,
            selected_column,
            should_quit: false,
            message: Some("Press s for single player or t for two player.".to_string()),
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            self.drain_events();

            terminal
                .draw(|f| self.render(f))
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }

        if self.engine.exit_game(&self.handle) {
            self.drain_events();
        }
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Apply every notification queued since the last frame.
    pub fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok((_, event)) => self.on_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.should_quit = true;
                    break;
                }
            }
        }
    }

    fn on_event(&mut self, event: GameEvent) {
        self.view.apply(event);
        match event {
            GameEvent::GameWon { owner, .. } => {
                self.message = Some(format!(
                    "{} wins! Press s or t to play again.",
                    self.names.name(owner)
                ));
            }
            GameEvent::GameDraw => {
                self.message = Some("It's a draw! Press s or t to play again.".to_string());
            }
            GameEvent::GameStopped => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.view.columns() {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('s') => self.start(GameMode::SinglePlayer),
            KeyCode::Char('t') => self.start(GameMode::TwoPlayer),
            KeyCode::Char('x') => {
                if !self.engine.exit_game(&self.handle) {
                    self.message = Some("Not part of this game.".to_string());
                }
            }
            _ => {}
        }

        self.drain_events();
    }

    /// Ask the engine for a new game in `mode`.
    pub fn start(&mut self, mode: GameMode) {
        if self.engine.start_game(&self.handle, mode) {
            self.selected_column = self.view.columns() / 2;
            self.message = Some(format!("New {} game started!", mode.label().to_lowercase()));
        } else {
            self.message = Some("Could not start a game.".to_string());
        }
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        self.drain_events();
        if !self.view.in_play() {
            self.message = Some(match self.view.status() {
                ViewStatus::Idle => "No game in play. Press s or t to start.".to_string(),
                _ => "Game over! Press s or t to play again.".to_string(),
            });
            return;
        }

        match self.engine.play_move(self.selected_column) {
            Ok(true) => {}
            Ok(false) => {
                debug!(column = self.selected_column, "move declined");
                self.message = Some("Column is full!".to_string());
            }
            Err(e) => {
                warn!(error = %e, "move failed");
                self.message = Some(e.to_string());
            }
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &self.view,
            self.selected_column,
            &self.message,
            &self.names,
            &self.stats,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LookaheadOpponent;
    use crate::game::{Cell, GameConfig, Player};

    fn app_with(config: GameConfig) -> App {
        let engine = GameEngine::with_opponent(config, Box::new(LookaheadOpponent::with_seed(3)))
            .unwrap();
        App::new(
            Arc::new(engine),
            Arc::new(GameStats::new()),
            PlayerNames::default(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
    }

    #[test]
    fn test_new_app_joins_engine() {
        let app = app_with(GameConfig::default());
        assert_eq!(app.engine.observer_count(), 1);
        assert_eq!(app.selected_column, 3);
        assert_eq!(app.view().status(), ViewStatus::Idle);
    }

    #[test]
    fn test_drop_before_start_is_rejected() {
        let mut app = app_with(GameConfig::default());
        press(&mut app, KeyCode::Enter);
        assert!(app.message().unwrap().contains("No game in play"));
        assert_eq!(app.engine.board().filled_count(), 0);
    }

    #[test]
    fn test_two_player_moves_are_mirrored_from_events() {
        let mut app = app_with(GameConfig::default());
        press(&mut app, KeyCode::Char('t'));
        assert!(app.view().in_play());

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(app.view().cell(5, 2), Cell::Player1);
        assert_eq!(app.view().cell(4, 2), Cell::Player2);
        assert_eq!(app.view().turn(), Player::Player1);
    }

    #[test]
    fn test_single_player_gets_automated_reply() {
        let mut app = app_with(GameConfig::default());
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        let board = app.engine.board();
        assert_eq!(board.filled_count(), 2);
        assert_eq!(app.view().turn(), Player::Player1);
        for (row, col, owner) in board.filled_cells() {
            assert_eq!(app.view().cell(row, col), owner.to_cell());
        }
    }

    #[test]
    fn test_selection_stays_on_board() {
        let mut app = app_with(GameConfig::new(4, 2, 2).unwrap());
        for _ in 0..5 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.selected_column, 1);
        for _ in 0..5 {
            press(&mut app, KeyCode::Left);
        }
        assert_eq!(app.selected_column, 0);
    }

    #[test]
    fn test_full_column_message() {
        let mut app = app_with(GameConfig::new(1, 3, 3).unwrap());
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.message(), Some("Column is full!"));
    }

    #[test]
    fn test_win_message_uses_player_name() {
        let mut app = app_with(GameConfig::new(1, 1, 1).unwrap());
        press(&mut app, KeyCode::Char('t'));
        app.selected_column = 0;
        press(&mut app, KeyCode::Enter);
        assert!(app.message().unwrap().starts_with("Player1 wins!"));
        assert!(!app.view().in_play());
    }

    #[test]
    fn test_exit_closes_view() {
        let mut app = app_with(GameConfig::default());
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('x'));
        assert!(app.should_quit());
        assert_eq!(app.view().status(), ViewStatus::Stopped);
        assert_eq!(app.engine.observer_count(), 0);
    }

    #[test]
    fn test_quit_key() {
        let mut app = app_with(GameConfig::default());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
