//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Exit codes for the rmdupes binary.
///
/// - 0: Success (with or without duplicates, even if some files were skipped)
/// - 1: General error (unexpected failure)
/// - 2: Usage error (bad arguments, bad root, invalid configuration)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Usage error: nothing was scanned.
    UsageError = 2,
    /// Interrupted: Scan or removal was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RD000",
            Self::GeneralError => "RD001",
            Self::UsageError => "RD002",
            Self::Interrupted => "RD130",
        }
    }

    /// Exit code for an error that reached `main`.
    ///
    /// Looks through the whole error chain, so context added with
    /// `anyhow::Context` does not hide the cause.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<UsageError>().is_some() {
                return Self::UsageError;
            }
            if let Some(finder) = cause.downcast_ref::<FinderError>() {
                return match finder {
                    FinderError::Interrupted => Self::Interrupted,
                    FinderError::PathNotFound(_) | FinderError::NotADirectory(_) => {
                        Self::UsageError
                    }
                    FinderError::Io { .. } => Self::GeneralError,
                };
            }
        }
        Self::GeneralError
    }
}

/// Errors in how the program was invoked, detected before any work.
///
/// A bad scan root surfaces as [`FinderError::PathNotFound`] or
/// [`FinderError::NotADirectory`] and maps to the same exit code.
#[derive(thiserror::Error, Debug)]
pub enum UsageError {
    /// An option or combination of options is invalid.
    #[error("{0}")]
    InvalidOption(String),

    /// The configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for UsageError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
