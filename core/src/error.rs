//! Errors that can occur while constructing or searching Connect Four positions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// An enum for errors that can occur when using the Connect Four engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A move was played into a column that is already full.
    InvalidMove { column: usize },
    /// `Engine::search` was called on a position with no legal moves.
    NoValidMoves,
    /// The transposition table found two distinct positions hashing to the same slot.
    ///
    /// Only produced when the crate is built with the `debug_collision_check` feature.
    HashCollisionDetected { hash: u64 },
    /// A move sequence contains a non-numeric character.
    InvalidCharacter { character: char, index: usize },
    /// A move sequence contains an out-of-range column.
    InvalidColumn { column: usize, index: usize },
    /// A move sequence plays a move into an already-full column.
    InvalidFullColumnMove { column: usize, index: usize },
    /// A move sequence continues play after a winning move has already been made.
    InvalidWinningMove { column: usize, index: usize },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidMove { column } => {
                write!(f, "invalid move: column {column} is full")
            }
            EngineError::NoValidMoves => {
                write!(f, "search was called on a position with no legal moves")
            }
            EngineError::HashCollisionDetected { hash } => {
                write!(f, "hash collision detected at slot for hash {hash:#x}")
            }
            EngineError::InvalidCharacter { character, index } => {
                write!(f, "invalid character '{character}' at index {index}")
            }
            EngineError::InvalidColumn { column, index } => {
                write!(f, "invalid column {column} at index {index}")
            }
            EngineError::InvalidFullColumnMove { column, index } => {
                write!(f, "invalid move at index {index}: column {column} is full")
            }
            EngineError::InvalidWinningMove { column, index } => {
                write!(f, "invalid move at index {index}: column {column} results in a win")
            }
        }
    }
}

impl Error for EngineError {}
