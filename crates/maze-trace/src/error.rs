//! Error types shared by the generator, the grid boundary and the CLI.

use crate::grid::Position;

/// Everything that can go wrong before or around a run.
///
/// Search exhaustion is not an error: a solver reports it through the
/// terminal record's `success` flag.
#[derive(Debug, thiserror::Error)]
pub enum MazeError {
    #[error("grid dimensions {height}x{width} are out of range")]
    InvalidDimensions { height: usize, width: usize },

    #[error("{field} must be within [0, 1], got {value}")]
    InvalidDensity { field: &'static str, value: f64 },

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid cell code {0}")]
    InvalidCellCode(u8),

    #[error("grid has {found} rows, expected {expected}")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("position {position} is outside a {height}x{width} grid")]
    PositionOutOfBounds {
        position: Position,
        height: usize,
        width: usize,
    },

    #[error("start and end both sit at {0}")]
    StartEqualsEnd(Position),

    #[error("parent chain broken at {0}")]
    BrokenParentChain(Position),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
