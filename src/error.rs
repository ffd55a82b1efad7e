//! Error types for the public surface of the crate.
//!
//! Internally the crate uses `anyhow` through the `Res` alias. At the boundary (command handlers
//! and `AppState` operations) errors are classified with an `ErrorType` so that a caller can tell
//! a rejected input apart from a broken data directory.

use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of an error.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorType {
    /// User supplied input that violates a precondition. The operation was rejected and prior
    /// state is untouched.
    Validation,
    /// The configuration file or home directory is missing or invalid.
    Config,
    /// Reading or writing a data file failed.
    Io,
    /// Input data (an edit batch, a CLI value) could not be parsed.
    Parse,
    /// Anything else.
    Internal,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Validation => "validation error",
            ErrorType::Config => "configuration error",
            ErrorType::Io => "i/o error",
            ErrorType::Parse => "parse error",
            ErrorType::Internal => "internal error",
        };
        f.write_str(s)
    }
}

/// An error with an `ErrorType` and the underlying `anyhow` chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates a `Validation` error with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, anyhow::anyhow!(message.into()))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn is_validation(&self) -> bool {
        self.error_type == ErrorType::Validation
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts an internal `Res` into the public `Result` by attaching an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let res: Res<()> = Err(anyhow::anyhow!("disk full")).context("Unable to save bills");
        let err = res.pub_result(ErrorType::Io).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
        let message = err.to_string();
        assert!(message.contains("Unable to save bills"), "{message}");
        assert!(message.contains("disk full"), "{message}");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("Please enter an amount");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please enter an amount");
    }
}
