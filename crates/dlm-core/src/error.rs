//! Error types shared across the flutter analysis stack.

use thiserror::Error;

/// Errors that can occur in the vector layer and the solvers built on it.
#[derive(Debug, Error)]
pub enum Error {
    /// Vector or matrix dimensions are incompatible.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A zero pivot in the Krylov orthogonalization or a zero secant
    /// denominator.
    #[error("Breakdown at step {step}: {reason}")]
    Breakdown { step: usize, reason: &'static str },

    /// An iteration cap was exceeded without meeting the tolerance.
    #[error("No convergence after {iterations} iterations")]
    NonConvergence { iterations: usize },

    /// A direct solve failed or the system is too ill-conditioned to use.
    #[error("Singular or ill-conditioned system")]
    SingularSystem,

    /// An invalid parameter was passed to a solver.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for flutter analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let e = Error::DimensionMismatch {
            expected: 10,
            actual: 9,
        };
        assert_eq!(e.to_string(), "Dimension mismatch: expected 10, got 9");

        let e = Error::Breakdown {
            step: 3,
            reason: "zero orthogonalization norm",
        };
        assert_eq!(e.to_string(), "Breakdown at step 3: zero orthogonalization norm");

        let e = Error::NonConvergence { iterations: 50 };
        assert_eq!(e.to_string(), "No convergence after 50 iterations");
    }
}
