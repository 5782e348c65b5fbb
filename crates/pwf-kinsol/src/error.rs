//! Error taxonomy for the solver binding.
//!
//! These are call-time and integration failures only. Numerical outcomes
//! (non-convergence, singular Jacobian) are reported as data through
//! [`crate::KinsolStatus`], never as errors.

use thiserror::Error;

/// Errors raised by the solver layer.
#[derive(Debug, Error)]
pub enum KinsolError {
    /// The underlying kernel reported a status code outside the known
    /// table — an integration bug, never a numerical outcome.
    #[error("invalid KINSOL status code: {0}")]
    InvalidStatus(i32),

    /// The Jacobian skeleton does not match the state vector.
    #[error("Jacobian is {rows}x{cols} but the state vector has length {n}")]
    DimensionMismatch { rows: usize, cols: usize, n: usize },

    /// A solver parameter fails validation at call time.
    #[error("invalid solver parameter: {0}")]
    IllInput(String),
}
