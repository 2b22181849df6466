//! Error type shared by every computation in the crate.
//!
//! Numerical non-convergence is reported as data on the result types
//! ([`ActivationRate`](crate::activation::ActivationRate),
//! [`WalkResult`](crate::walk::WalkResult)) and only becomes an
//! [`Error::NotConverged`] when the caller asks for it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} out of bounds for {len} nodes")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid weight {value} at ({row}, {col}): entries must be finite and non-negative")]
    InvalidWeight { row: usize, col: usize, value: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("malformed sparse structure: {0}")]
    MalformedStructure(String),

    #[error("transfer activation ({row}, {col}) is undefined: normalizing activation sums to zero")]
    UndefinedActivation { row: usize, col: usize },

    #[error("column {column} of the transition matrix sums to {sum}, expected 1")]
    NotColumnStochastic { column: usize, sum: f64 },

    #[error("linear system is singular")]
    SingularSystem,

    #[error("solver did not converge after {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
