use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;

use super::opponent::{immediate_win, Opponent};
use crate::game::{Board, Player};

/// One-ply opponent: completes a run when it can, otherwise plays a uniformly
/// random open column.
pub struct LookaheadOpponent {
    rng: StdRng,
}

impl LookaheadOpponent {
    pub fn new() -> Self {
        LookaheadOpponent {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic fallback choices, for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        LookaheadOpponent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for LookaheadOpponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Opponent for LookaheadOpponent {
    fn choose_column(&mut self, board: &Board, player: Player, win_length: usize) -> Option<usize> {
        if let Some(col) = immediate_win(board, player, win_length) {
            debug!(col, %player, "opponent found winning column");
            return Some(col);
        }

        let open = board.open_columns();
        if open.is_empty() {
            return None;
        }
        let col = open[self.rng.random_range(0..open.len())];
        debug!(col, %player, "opponent chose random column");
        Some(col)
    }

    fn name(&self) -> &str {
        "Lookahead"
    }
}
