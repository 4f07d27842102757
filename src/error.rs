use thiserror::Error;

/// Construction-time failures. The map and tuning data are validated once
/// when a level is built; steady-state ticking never returns an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map is empty")]
    EmptyMap,
    #[error("map row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown tile code '{code}' at ({x}, {y})")]
    UnknownTile { code: char, x: usize, y: usize },
    #[error("map has no player spawn")]
    MissingPlayer,
    #[error("map has {found} player spawns, expected exactly one")]
    DuplicatePlayer { found: usize },
    #[error("game configuration lists no levels")]
    NoLevels,
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
