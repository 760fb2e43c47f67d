//! Error taxonomy for the clustering pipeline

use thiserror::Error;

/// Failure while turning a graph into a comparable signature or comparing two of them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistanceError {
    /// The Jacobi sweeps ran out before the off-diagonal mass vanished
    #[error("eigen-decomposition did not converge after {sweeps} sweeps (off-diagonal norm {residual:e})")]
    NonConvergence { sweeps: usize, residual: f64 },

    #[error("invalid metric parameter: {0}")]
    InvalidParameter(String),

    /// The metric produced something that is not a distance
    #[error("metric produced an invalid distance value: {0}")]
    InvalidValue(f64),
}

/// Rejected precomputed distance matrix
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("distance matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("diagonal entry {index} is {value}, expected 0")]
    NonZeroDiagonal { index: usize, value: f64 },

    #[error("entry ({row}, {col}) is {value}, expected a finite non-negative number")]
    InvalidEntry { row: usize, col: usize, value: f64 },

    #[error("entries ({row}, {col}) and ({col}, {row}) disagree")]
    Asymmetric { row: usize, col: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("distance threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),
}
