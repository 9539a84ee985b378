use std::path::PathBuf;

/// Contract faults raised by the game engine. Routine negative outcomes
/// (column full, game not started, observer already joined) are reported as
/// `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("column {column} out of range (columns: {columns})")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("cell ({row}, {column}) out of range for a {rows}x{columns} grid")]
    CellOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("opponent selected unplayable column {column} (open: {open:?})")]
    IllegalOpponentMove { column: usize, open: Vec<usize> },

    #[error("unknown game mode '{0}' (expected 'single-player' or 'two-player')")]
    UnknownMode(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("board configuration rejected: {0}")]
    Board(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_out_of_range_display() {
        let err = EngineError::ColumnOutOfRange {
            column: 9,
            columns: 7,
        };
        assert_eq!(err.to_string(), "column 9 out of range (columns: 7)");
    }

    #[test]
    fn test_illegal_opponent_move_display() {
        let err = EngineError::IllegalOpponentMove {
            column: 5,
            open: vec![0, 1, 2],
        };
        assert_eq!(
            err.to_string(),
            "opponent selected unplayable column 5 (open: [0, 1, 2])"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("players.player1 must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: players.player1 must not be empty"
        );
    }

    #[test]
    fn test_board_error_wraps_engine_error() {
        let err: ConfigError = EngineError::InvalidConfig("rows must be > 0".into()).into();
        assert_eq!(
            err.to_string(),
            "board configuration rejected: invalid game configuration: rows must be > 0"
        );
    }
}
