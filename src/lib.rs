//! # Connect Four Engine
//!
//! A thread-safe Connect Four engine for configurable board sizes, with an
//! observer protocol, late-join replay, win/draw detection and a one-ply
//! automated opponent for single-player games. Ships with a terminal front-end
//! built with Ratatui.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, player, engine, observer protocol
//! - [`ai`] — Opponent trait and the one-ply lookahead opponent
//! - [`stats`] — Observer that logs games and tracks outcome rates
//! - [`ui`] — Terminal UI: game view driven by engine events
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod stats;
pub mod ui;
