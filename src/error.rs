//! Error types for the draughts engine.
//!
//! Invariant and precondition violations surface as `DraughtsError`; an empty
//! square is not an error and is reported as `Ok(None)` by lookups.

use thiserror::Error;

use crate::piece::PIECES_PER_SIDE;

/// Errors that can occur while building states or searching them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraughtsError {
    /// Coordinates outside the 8x8 board
    #[error("square [{row}, {col}] is off the board")]
    OutOfBounds { row: i8, col: i8 },

    /// A state must always carry exactly one slot per piece of both sides
    #[error("expected {expected} piece slots, got {count}", expected = PIECES_PER_SIDE * 2)]
    InvalidPieceCount { count: usize },

    /// A reduced layout listed more pieces than one side owns
    #[error("a side has at most {max} pieces, got {count}", max = PIECES_PER_SIDE)]
    TooManyPieces { count: usize },

    /// Two active pieces on the same square
    #[error("square [{row}, {col}] is occupied twice")]
    SquareOccupied { row: i8, col: i8 },

    /// The search was asked to move in a position where the side to move has
    /// already lost
    #[error("no legal moves for the side to move")]
    NoLegalMoves,

    /// The root of a search needs at least one ply
    #[error("search depth must be at least 1")]
    InvalidDepth,
}

/// Result type alias for engine operations
pub type DraughtsResult<T> = Result<T, DraughtsError>;
