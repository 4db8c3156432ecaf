//! Error types for bopax.

use thiserror::Error;

/// Result type alias for bopax operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during packing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A box has a non-positive dimension.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A container type is malformed.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Some box fits no catalog type under any rotation.
    #[error("Unsolvable input: {0}")]
    UnsolvableInput(String),

    /// The search gave up without placing every box.
    #[error("No solution found: {0}")]
    NoSolutionFound(String),

    /// A placement would overlap another box or leave the container.
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,

    /// Timeout exceeded.
    #[error("Timeout exceeded after {0}ms")]
    Timeout(u64),
}
