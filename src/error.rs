use thiserror::Error;

/// A grid that is not a permutation of `0..n²`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("board is empty")]
    Empty,
    #[error("row {row} has {len} tiles, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("expected {expected} tiles for a {size}x{size} board, found {found}")]
    TileCount { size: usize, expected: usize, found: usize },
    #[error("tile {tile} is out of range for a {size}x{size} board")]
    OutOfRange { tile: u32, size: usize },
    #[error("tile {0} appears more than once")]
    Duplicate(u32),
}

/// Failure to read a board from its text or JSON form.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing board size")]
    MissingSize,
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("expected {expected} tiles, found {found}")]
    TileCount { expected: usize, found: usize },
    #[error("invalid JSON board: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Board(#[from] PuzzleError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown heuristic `{0}` (expected hamming, manhattan, euclidean or linear)")]
pub struct UnknownHeuristic(pub String);
