use std::fmt;

use super::player::Player;
use crate::error::EngineError;

pub const DEFAULT_ROWS: usize = 6;
pub const DEFAULT_COLUMNS: usize = 7;
pub const DEFAULT_WIN_LENGTH: usize = 4;

/// Grid dimensions and run length, fixed for an engine's lifetime.
///
/// `win_length` larger than both dimensions is accepted; such a game can only
/// end in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub win_length: usize,
}

impl GameConfig {
    pub fn new(rows: usize, columns: usize, win_length: usize) -> Result<Self, EngineError> {
        let config = GameConfig {
            rows,
            columns,
            win_length,
        };
        config.validate()?;
        Ok(config)
    }

    /// All three values must be positive and the grid must be addressable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rows == 0 {
            return Err(EngineError::InvalidConfig("rows must be > 0".into()));
        }
        if self.columns == 0 {
            return Err(EngineError::InvalidConfig("columns must be > 0".into()));
        }
        if self.win_length == 0 {
            return Err(EngineError::InvalidConfig("win_length must be > 0".into()));
        }
        if self.rows.checked_mul(self.columns).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "{}x{} grid has too many cells",
                self.rows, self.columns
            )));
        }
        Ok(())
    }

    pub fn total_moves(&self) -> usize {
        self.rows * self.columns
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            win_length: DEFAULT_WIN_LENGTH,
        }
    }
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size {}x{} with winning size {}",
            self.rows, self.columns, self.win_length
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Player1,
    Player2,
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Player1 => Some(Player::Player1),
            Cell::Player2 => Some(Player::Player2),
        }
    }
}

/// One of the four directions a run can lie along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
    /// Top-left to bottom-right (\)
    DiagonalDown,
    /// Top-right to bottom-left (/)
    DiagonalUp,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::Horizontal,
        Axis::Vertical,
        Axis::DiagonalDown,
        Axis::DiagonalUp,
    ];

    /// (row, column) step between consecutive cells of a run.
    fn step(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
            Axis::DiagonalDown => (1, 1),
            Axis::DiagonalUp => (1, -1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
}

/// Gravity-fed grid. Row 0 is the top, row `rows - 1` is the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(rows: usize, columns: usize) -> Self {
        Board {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get the cell at a specific position, rejecting coordinates outside the
    /// grid.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, EngineError> {
        if row >= self.rows || col >= self.columns {
            return Err(EngineError::CellOutOfRange {
                row,
                column: col,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(self.cells[row * self.columns + col])
    }

    /// Check if a column is full. Columns outside the grid count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= self.columns {
            return true;
        }
        self.cells[col] != Cell::Empty
    }

    /// Lowest empty row of `col`, or `None` if the column is full or outside
    /// the grid.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= self.columns {
            return None;
        }
        (0..self.rows)
            .rev()
            .find(|&row| self.cells[row * self.columns + col] == Cell::Empty)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= self.columns {
            return Err(MoveError::InvalidColumn);
        }

        let row = self.landing_row(col).ok_or(MoveError::ColumnFull)?;
        self.cells[row * self.columns + col] = cell;
        Ok(row)
    }

    /// Columns that can still accept a piece, left to right.
    pub fn open_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&col| !self.is_column_full(col))
            .collect()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..self.columns).all(|col| self.is_column_full(col))
    }

    /// Number of occupied cells.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Occupied cells in row-major order (outer rows, inner columns).
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, Player)> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.owner().map(|p| (idx / columns, idx % columns, p)))
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Whether `player` owning `(row, col)` completes a run of `win_length`.
    ///
    /// The target cell is treated as belonging to `player` regardless of its
    /// current contents, so this answers both "did the last move win" and
    /// "would this placement win" without touching the grid. Every window of
    /// `win_length` cells containing the target is checked, so the target may
    /// sit anywhere inside the run. Returns the first winning axis.
    pub fn completes_run(
        &self,
        row: usize,
        col: usize,
        player: Player,
        win_length: usize,
    ) -> Option<Axis> {
        if win_length == 0 || row >= self.rows || col >= self.columns {
            return None;
        }
        let cell = player.to_cell();
        Axis::ALL
            .into_iter()
            .find(|&axis| self.has_window(row, col, cell, win_length, axis))
    }

    fn has_window(&self, row: usize, col: usize, cell: Cell, win_length: usize, axis: Axis) -> bool {
        let (dr, dc) = axis.step();
        let (row, col, len) = (row as isize, col as isize, win_length as isize);

        (0..len).any(|offset| {
            let start_row = row - offset * dr;
            let start_col = col - offset * dc;
            (0..len).all(|k| {
                let r = start_row + k * dr;
                let c = start_col + k * dc;
                (r == row && c == col) || self.cell_at(r, c) == Some(cell)
            })
        })
    }

    /// In-bounds lookup for run scanning; out-of-bounds yields `None`.
    fn cell_at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.columns {
            return None;
        }
        Some(self.cells[row * self.columns + col])
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(6, 7);
        for row in 0..6 {
            for col in 0..7 {
                assert_eq!(board.get(row, col), Ok(Cell::Empty));
            }
        }
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_config_rejects_zero_dimensions() {
        assert!(GameConfig::new(0, 7, 4).is_err());
        assert!(GameConfig::new(6, 0, 4).is_err());
        assert!(GameConfig::new(6, 7, 0).is_err());
        assert_eq!(GameConfig::new(6, 7, 4), Ok(GameConfig::default()));
    }

    #[test]
    fn test_config_rejects_overflowing_grid() {
        let result = GameConfig::new(usize::MAX / 2 + 1, 2, 4);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));

        let widest = GameConfig::new(1, usize::MAX, 4).unwrap();
        assert_eq!(widest.total_moves(), usize::MAX);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new(6, 7);

        let row = board.drop_piece(3, Cell::Player1).unwrap();
        assert_eq!(row, 5); // Should land at bottom
        assert_eq!(board.get(5, 3), Ok(Cell::Player1));

        let row = board.drop_piece(3, Cell::Player2).unwrap();
        assert_eq!(row, 4); // Should land on top of first piece
        assert_eq!(board.get(4, 3), Ok(Cell::Player2));
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new(6, 7);

        for _ in 0..6 {
            board.drop_piece(0, Cell::Player1).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(board.landing_row(0), None);
        assert_eq!(board.drop_piece(0, Cell::Player2), Err(MoveError::ColumnFull));
        assert_eq!(board.open_columns(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new(6, 7);
        assert_eq!(board.drop_piece(7, Cell::Player1), Err(MoveError::InvalidColumn));
    }

    #[test]
    fn test_out_of_range_lookup() {
        let board = Board::new(6, 7);
        assert_eq!(
            board.get(10, 13),
            Err(EngineError::CellOutOfRange {
                row: 10,
                column: 13,
                rows: 6,
                columns: 7
            })
        );
        assert!(board.get(6, 0).is_err());
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(6, 7);
        for col in 0..7 {
            for _ in 0..6 {
                board.drop_piece(col, Cell::Player1).unwrap();
            }
        }
        assert!(board.is_full());
        assert_eq!(board.filled_count(), 42);
        board.clear();
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_filled_cells_row_major() {
        let mut board = Board::new(6, 7);
        board.drop_piece(4, Cell::Player1).unwrap();
        board.drop_piece(1, Cell::Player2).unwrap();
        board.drop_piece(4, Cell::Player2).unwrap();

        let cells: Vec<_> = board.filled_cells().collect();
        assert_eq!(
            cells,
            vec![
                (4, 4, Player::Player2),
                (5, 1, Player::Player2),
                (5, 4, Player::Player1),
            ]
        );
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new(6, 7);
        for col in 0..4 {
            board.drop_piece(col, Cell::Player1).unwrap();
        }
        // Middle of the line, not just its ends
        assert_eq!(
            board.completes_run(5, 2, Player::Player1, 4),
            Some(Axis::Horizontal)
        );
        assert_eq!(board.completes_run(5, 2, Player::Player2, 4), None);
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new(6, 7);
        for _ in 0..4 {
            board.drop_piece(3, Cell::Player2).unwrap();
        }
        assert_eq!(
            board.completes_run(2, 3, Player::Player2, 4),
            Some(Axis::Vertical)
        );
    }

    #[test]
    fn test_diagonal_up_win() {
        let mut board = Board::new(6, 7);
        board.drop_piece(0, Cell::Player1).unwrap();

        board.drop_piece(1, Cell::Player2).unwrap();
        board.drop_piece(1, Cell::Player1).unwrap();

        board.drop_piece(2, Cell::Player2).unwrap();
        board.drop_piece(2, Cell::Player2).unwrap();
        board.drop_piece(2, Cell::Player1).unwrap();

        board.drop_piece(3, Cell::Player2).unwrap();
        board.drop_piece(3, Cell::Player2).unwrap();
        board.drop_piece(3, Cell::Player2).unwrap();
        let row = board.drop_piece(3, Cell::Player1).unwrap();

        assert_eq!(
            board.completes_run(row, 3, Player::Player1, 4),
            Some(Axis::DiagonalUp)
        );
    }

    #[test]
    fn test_diagonal_down_win() {
        let mut board = Board::new(6, 7);
        board.drop_piece(6, Cell::Player1).unwrap();

        board.drop_piece(5, Cell::Player2).unwrap();
        board.drop_piece(5, Cell::Player1).unwrap();

        board.drop_piece(4, Cell::Player2).unwrap();
        board.drop_piece(4, Cell::Player2).unwrap();
        board.drop_piece(4, Cell::Player1).unwrap();

        board.drop_piece(3, Cell::Player2).unwrap();
        board.drop_piece(3, Cell::Player2).unwrap();
        board.drop_piece(3, Cell::Player2).unwrap();
        let row = board.drop_piece(3, Cell::Player1).unwrap();

        assert_eq!(
            board.completes_run(row, 3, Player::Player1, 4),
            Some(Axis::DiagonalDown)
        );
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new(6, 7);
        for col in 0..3 {
            board.drop_piece(col, Cell::Player1).unwrap();
        }
        assert_eq!(board.completes_run(5, 1, Player::Player1, 4), None);
    }

    #[test]
    fn test_hypothetical_placement_does_not_touch_grid() {
        let mut board = Board::new(6, 7);
        for col in [0, 1, 3] {
            board.drop_piece(col, Cell::Player2).unwrap();
        }
        let before = board.clone();

        // Filling the gap at column 2 would join both sides
        assert_eq!(
            board.completes_run(5, 2, Player::Player2, 4),
            Some(Axis::Horizontal)
        );
        assert_eq!(board, before);
        assert_eq!(board.get(5, 2), Ok(Cell::Empty));
    }

    #[test]
    fn test_run_crossing_grid_edge_is_not_a_win() {
        let mut board = Board::new(6, 7);
        for col in 4..7 {
            board.drop_piece(col, Cell::Player1).unwrap();
        }
        assert_eq!(board.completes_run(5, 6, Player::Player1, 4), None);
    }

    #[test]
    fn test_win_length_beyond_grid_never_wins() {
        let mut board = Board::new(3, 3);
        for col in 0..3 {
            for _ in 0..3 {
                board.drop_piece(col, Cell::Player1).unwrap();
            }
        }
        assert_eq!(board.completes_run(1, 1, Player::Player1, 4), None);
    }

    #[test]
    fn test_win_length_one_wins_immediately() {
        let board = Board::new(6, 7);
        assert!(board.completes_run(5, 0, Player::Player1, 1).is_some());
    }

    #[test]
    fn test_config_display() {
        assert_eq!(GameConfig::default().to_string(), "size 6x7 with winning size 4");
    }
}
