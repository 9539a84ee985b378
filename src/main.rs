use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use connect_four_engine::ai::LookaheadOpponent;
use connect_four_engine::config::{AppConfig, LogConfig};
use connect_four_engine::game::{GameEngine, GameMode, ObserverHandle};
use connect_four_engine::stats::GameStats;
use connect_four_engine::ui::App;

/// Play Connect Four in the terminal.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play Connect Four in the terminal")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override number of columns
    #[arg(long)]
    columns: Option<usize>,

    /// Override the run length needed to win
    #[arg(long)]
    win_length: Option<usize>,

    /// Mode of the first game: single-player or two-player
    #[arg(long)]
    mode: Option<GameMode>,

    /// Seed for the computer opponent
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(rows) = cli.rows {
        app_config.board.rows = rows;
    }
    if let Some(columns) = cli.columns {
        app_config.board.columns = columns;
    }
    if let Some(win_length) = cli.win_length {
        app_config.board.win_length = win_length;
    }
    if let Some(mode) = cli.mode {
        app_config.game.mode = mode;
    }
    if cli.seed.is_some() {
        app_config.game.opponent_seed = cli.seed;
    }
    app_config.validate().context("invalid configuration")?;

    init_logging(&app_config.log)?;
    info!(board = %app_config.board, mode = %app_config.game.mode, "starting connect-four");

    let opponent = match app_config.game.opponent_seed {
        Some(seed) => LookaheadOpponent::with_seed(seed),
        None => LookaheadOpponent::new(),
    };
    let engine = Arc::new(
        GameEngine::with_opponent(app_config.board, Box::new(opponent))
            .context("creating engine")?,
    );

    let stats = Arc::new(GameStats::new());
    let stats_handle: ObserverHandle = stats.clone();
    engine.join_game(stats_handle.clone());

    let mut app = App::new(engine.clone(), stats.clone(), app_config.players.clone());
    app.start(app_config.game.mode);

    run_terminal(&mut app).context("running terminal UI")?;

    engine.exit_game(&stats_handle);
    info!(games = stats.total_games(), "exiting");
    Ok(())
}

/// Log to a file so the terminal UI is not disturbed.
fn init_logging(log: &LogConfig) -> Result<()> {
    let log_file = std::fs::File::create(&log.file)
        .with_context(|| format!("creating log file {}", log.file.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.filter)),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run_terminal(app: &mut App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}
