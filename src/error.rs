//! Error types for the cleaning pipeline.
//!
//! Every fallible library function returns [`Result`], whose error side is
//! [`CleanError`]. The variants map onto the ways a run can fail:
//!
//! | Variant              | Raised when                                              |
//! |----------------------|----------------------------------------------------------|
//! | `NotFound`           | the input path does not exist                            |
//! | `Parse`              | the input is not delimited data, or strict mode is missing a required column |
//! | `Config`             | the pipeline spec is invalid or cannot be read           |
//! | `DataProcessing`     | a polars operation fails mid-pipeline                    |
//! | `Io`                 | the output cannot be written                             |
//!
//! Cells that fail numeric coercion are *not* errors; they are counted in the
//! [`RunReport`](crate::pipeline::RunReport).
//!
//! ## Adding context
//!
//! ```no_run
//! use salesclean::error::ResultExt as _;
//!
//! fn read_spec() -> salesclean::error::Result<String> {
//!     let text = std::fs::read_to_string("spec.json").context("Failed to read spec")?;
//!     Ok(text)
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Main error type for cleaning operations.
#[derive(Debug)]
pub enum CleanError {
    /// Input file does not exist
    NotFound(PathBuf),

    /// Input is not valid delimited data, or a required column is absent in strict mode
    Parse(String),

    /// Invalid pipeline spec or conflicting settings
    Config(String),

    /// Polars failures while transforming the dataset
    DataProcessing(String),

    /// I/O errors while persisting output
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Input file not found: {}", path.display()),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CleanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CleanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CleanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for CleanError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<tempfile::PersistError> for CleanError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CleanError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CleanError = e.into();
            CleanError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CleanError = e.into();
            CleanError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CleanError::Parse("column not found".to_owned());
        assert_eq!(err.to_string(), "Parse error: column not found");

        let err = CleanError::NotFound(PathBuf::from("data/raw/missing.csv"));
        assert_eq!(err.to_string(), "Input file not found: data/raw/missing.csv");
    }

    #[test]
    fn test_io_error_source_is_kept() {
        use std::error::Error as _;

        let err: CleanError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert!(matches!(err, CleanError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.txt",
        ));

        let result: Result<()> = result.context("Failed to read file");
        let message = result.map_err(|e| e.to_string()).err().unwrap_or_default();
        assert!(message.contains("Failed to read file"), "got: {message}");
        assert!(message.contains("file.txt"), "got: {message}");
    }
}
