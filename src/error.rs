//! Error types for the subtab CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! A command that starts and then fails is not an error here: launch failures,
//! non-zero exits and timeouts are recorded as `Failure` values by the runner.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for subtab operations.
#[derive(Error, Debug)]
pub enum TabError {
    /// A configuration section is missing a key or violates a constraint.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// User provided invalid arguments or a file could not be read/written.
    #[error("{0}")]
    UserError(String),

    /// Unexpected fault while supervising a child process.
    #[error("internal error: {0}")]
    Internal(String),

    /// Some tab commands failed and the run was strict.
    #[error("{failed} of {total} tab(s) failed")]
    TabFailures { failed: usize, total: usize },
}

impl TabError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TabError::ConfigError(_) => exit_codes::CONFIG_ERROR,
            TabError::UserError(_) => exit_codes::USER_ERROR,
            TabError::Internal(_) => exit_codes::INTERNAL_ERROR,
            TabError::TabFailures { .. } => exit_codes::TAB_FAILURE,
        }
    }
}

/// Result type alias for subtab operations.
pub type Result<T> = std::result::Result<T, TabError>;
