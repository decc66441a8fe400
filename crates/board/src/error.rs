//! Board error types.

use protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced while routing a message into the board.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Invalid grid dimensions {height}x{width}")]
    InvalidDimension { height: i64, width: i64 },

    #[error("Grid of {height}x{width} exceeds {max} cells")]
    TooLarge { height: i64, width: i64, max: usize },
}
