mod lookahead;
mod opponent;

pub use lookahead::LookaheadOpponent;
pub use opponent::{immediate_win, Opponent};
