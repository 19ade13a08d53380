//! Error type for the CLI and its exit-code mapping.

use std::fmt;

use handledger_engine::errors::{SettleError, ValidationError};
use handledger_engine::history::HistoryError;

use crate::config::ConfigError;

/// Success exit code (standard Unix convention).
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for every failure, including argument errors.
pub const EXIT_FAILURE: i32 = 2;

/// Everything a command can fail with, propagated with `?`.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (input files, stdout/stderr writes)
    Io(std::io::Error),

    /// Input that is not a hand, or an argument that is not usable
    InvalidInput(String),

    Config(ConfigError),

    /// The action sequence on its own is malformed
    Validation(ValidationError),

    /// The hand could not be settled
    Settle(SettleError),

    /// The SQLite hand history failed or has no such hand
    History(HistoryError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Validation(e) => write!(f, "Invalid action sequence: {}", e),
            CliError::Settle(e) => write!(f, "Settlement failed: {}", e),
            CliError::History(e) => write!(f, "Hand history: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Validation(e) => Some(e),
            CliError::Settle(e) => Some(e),
            CliError::History(e) => Some(e),
            CliError::InvalidInput(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error)
    }
}

impl From<ValidationError> for CliError {
    fn from(error: ValidationError) -> Self {
        CliError::Validation(error)
    }
}

impl From<SettleError> for CliError {
    fn from(error: SettleError) -> Self {
        CliError::Settle(error)
    }
}

impl From<HistoryError> for CliError {
    fn from(error: HistoryError) -> Self {
        CliError::History(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn every_failure_exits_with_two() {
        let errors = [
            CliError::InvalidInput("x".into()),
            CliError::from(ValidationError::Empty),
            CliError::from(HistoryError::NotFound(Uuid::nil())),
        ];
        for e in errors {
            assert_eq!(e.exit_code(), EXIT_FAILURE);
        }
    }

    #[test]
    fn display_names_the_failing_layer() {
        let e = CliError::from(HistoryError::NotFound(Uuid::nil()));
        assert!(e.to_string().starts_with("Hand history: hand "));
        let e = CliError::from(ValidationError::Empty);
        assert!(e.to_string().starts_with("Invalid action sequence"));
    }
}
