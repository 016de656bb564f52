//! Validation errors raised before any kernel runs

use thiserror::Error;

/// Hard input errors. Numeric degeneracies (zero variance, border cells,
/// out-of-range region sizes) are results, never errors.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FieldError {
    #[error("only 2 or 3 spatial axes are supported, got {0}")]
    UnsupportedDims(usize),
    #[error("{what} must have {expected} entries, got {got}")]
    RankMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{what} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("data length {got} does not match shape product {expected}")]
    DataLength { expected: usize, got: usize },
    #[error("channel axis must be non-empty")]
    EmptyChannels,
    #[error("{what} {coord:?} lies outside shape {shape:?}")]
    OutOfBounds {
        what: &'static str,
        coord: Vec<i64>,
        shape: Vec<usize>,
    },
    #[error("neighbourhood window of half-size {0} is too large to index")]
    WindowTooLarge(usize),
    #[error("bandwidth must be finite and positive, got {0}")]
    InvalidBandwidth(f64),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

