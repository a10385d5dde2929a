use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("position ({row}, {col}) is outside a {size}x{size} grid")]
    OutOfBounds { row: i32, col: i32, size: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("grid of size {size} leaves {open} open cells, need at least {required}")]
    GridTooSmall {
        size: usize,
        open: usize,
        required: usize,
    },

    #[error("no empty cell left on the grid")]
    Exhausted,

    #[error("cell ({row}, {col}) cannot hold an actor")]
    Blocked { row: i32, col: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size must be between {min} and {max}, got {actual}")]
    GridSizeOutOfRange {
        actual: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreStoreError {
    #[error("failed to access score store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode score store {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ScoreStore(#[from] ScoreStoreError),

    #[error("session task failed: {0}")]
    Task(String),
}
