//! Error types for replot operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in replot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid layout parameter rejected at the boundary.
    #[error("Invalid layout parameter: {0}")]
    InvalidLayout(String),

    /// Display mode with no enabled layer.
    #[error("Display mode must enable at least one of box, violin, jitter")]
    EmptyDisplayMode,

    /// Length mismatch between related sequences.
    #[error("Length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Axes id not present in the scene.
    #[error("Unknown axes id: {0}")]
    UnknownAxes(u32),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
