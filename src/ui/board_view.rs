use crate::game::{Cell, GameEvent, GameMode, Player};

/// What the front-end believes about the game, reconstructed only from
/// engine notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    InPlay,
    Won { owner: Player, row: usize, col: usize },
    Drawn,
    Stopped,
}

/// Local copy of the grid kept in sync through [`GameEvent`]s.
#[derive(Debug, Clone)]
pub struct BoardView {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
    turn: Player,
    mode: Option<GameMode>,
    status: ViewStatus,
}

impl BoardView {
    pub fn new(rows: usize, columns: usize) -> Self {
        BoardView {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
            turn: Player::Player1,
            mode: None,
            status: ViewStatus::Idle,
        }
    }

    pub fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameStarted { turn, mode } => {
                self.cells.fill(Cell::Empty);
                self.turn = turn;
                self.mode = Some(mode);
                self.status = ViewStatus::InPlay;
            }
            GameEvent::GameStopped => self.status = ViewStatus::Stopped,
            GameEvent::MoveMade { row, col, owner } => {
                if row < self.rows && col < self.columns {
                    self.cells[row * self.columns + col] = owner.to_cell();
                }
                self.turn = owner.other();
            }
            GameEvent::GameWon { row, col, owner } => {
                self.turn = owner;
                self.status = ViewStatus::Won { owner, row, col };
            }
            GameEvent::GameDraw => self.status = ViewStatus::Drawn,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.columns + col]
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn in_play(&self) -> bool {
        self.status == ViewStatus::InPlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_clears_previous_game() {
        let mut view = BoardView::new(6, 7);
        view.apply(GameEvent::MoveMade {
            row: 5,
            col: 0,
            owner: Player::Player1,
        });
        view.apply(GameEvent::GameStarted {
            turn: Player::Player1,
            mode: GameMode::SinglePlayer,
        });
        assert_eq!(view.cell(5, 0), Cell::Empty);
        assert_eq!(view.mode(), Some(GameMode::SinglePlayer));
        assert!(view.in_play());
    }

    #[test]
    fn test_moves_flip_turn() {
        let mut view = BoardView::new(6, 7);
        view.apply(GameEvent::GameStarted {
            turn: Player::Player1,
            mode: GameMode::TwoPlayer,
        });
        view.apply(GameEvent::MoveMade {
            row: 5,
            col: 3,
            owner: Player::Player1,
        });
        assert_eq!(view.cell(5, 3), Cell::Player1);
        assert_eq!(view.turn(), Player::Player2);
    }

    #[test]
    fn test_terminal_statuses() {
        let mut view = BoardView::new(6, 7);
        view.apply(GameEvent::GameWon {
            row: 5,
            col: 3,
            owner: Player::Player2,
        });
        assert_eq!(
            view.status(),
            ViewStatus::Won {
                owner: Player::Player2,
                row: 5,
                col: 3
            }
        );
        view.apply(GameEvent::GameDraw);
        assert_eq!(view.status(), ViewStatus::Drawn);
        view.apply(GameEvent::GameStopped);
        assert_eq!(view.status(), ViewStatus::Stopped);
    }
}
