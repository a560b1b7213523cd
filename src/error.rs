//! Error types.
//!
//! - [`SignalError`] is what the numeric core returns. Every variant is a local,
//!   recoverable condition for the caller.
//! - [`AppError`] is what the `psig` binary reports: a message plus a process
//!   exit code.

use thiserror::Error;

/// Errors raised by the signal-processing core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// A lookup or correlation was asked to work on zero samples.
    #[error("input is empty")]
    EmptyInput,

    /// The input violates a structural precondition (ordering, token layout, ...).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Two series that must be aligned sample-by-sample have different lengths.
    #[error("length mismatch: {left} vs {right} samples")]
    LengthMismatch { left: usize, right: usize },

    /// The numbers themselves do not allow a result (singular system, zero variance).
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

impl SignalError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::NumericDegeneracy(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Map core errors onto the binary's exit codes:
/// 2 = bad input, 3 = nothing to work on, 4 = numeric failure.
impl From<SignalError> for AppError {
    fn from(err: SignalError) -> Self {
        let exit_code = match err {
            SignalError::MalformedInput(_) | SignalError::LengthMismatch { .. } => 2,
            SignalError::EmptyInput => 3,
            SignalError::NumericDegeneracy(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
