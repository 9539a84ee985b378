//! Terminal UI: a game view that mirrors the engine purely from its
//! notifications, with a side panel fed by the statistics observer.

mod app;
pub mod board_view;
mod game_view;

pub use app::App;
pub use board_view::{BoardView, ViewStatus};
