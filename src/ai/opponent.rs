use crate::game::{Board, Player};

/// Move selection for the automated side of a single-player game.
pub trait Opponent: Send {
    /// Select a column for `player` on `board`, where a run of `win_length`
    /// wins. Returns `None` only when every column is full.
    ///
    /// Implementations must not assume anything about the board beyond what
    /// `board` exposes; the engine validates the returned column.
    fn choose_column(&mut self, board: &Board, player: Player, win_length: usize) -> Option<usize>;

    /// Return the opponent's display name.
    fn name(&self) -> &str;
}

/// First column, left to right, whose landing cell would complete a run for
/// `player`.
pub fn immediate_win(board: &Board, player: Player, win_length: usize) -> Option<usize> {
    (0..board.columns()).find(|&col| {
        board
            .landing_row(col)
            .is_some_and(|row| board.completes_run(row, col, player, win_length).is_some())
    })
}
