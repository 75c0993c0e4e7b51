//! Error types for the example-data crate.

use thiserror::Error;

/// Errors that can occur while generating example users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// More users were requested than the generator supports.
    #[error("cannot generate {requested} users; the maximum is {max}")]
    TooManyUsers {
        /// Requested user count.
        requested: usize,
        /// Supported maximum.
        max: usize,
    },

    /// No usable name could be produced within the retry budget.
    #[error("failed to generate a usable name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made.
        max_attempts: usize,
    },
}
