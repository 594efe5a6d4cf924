//! Application-wide error types using thiserror.

use recap_common::RecapError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Configuration, upstream or statistics error.
    #[error(transparent)]
    Recap(#[from] RecapError),

    /// The recap could not be rendered as JSON.
    #[error("Failed to render statistics: {0}")]
    Render(#[from] serde_json::Error),

    /// Invalid command-line input.
    #[error("Invalid argument: {0}")]
    Argument(String),
}

/// Result type for the command-line application.
pub type CliResult<T> = Result<T, CliError>;
