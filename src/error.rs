//! Error types for scorepad capture.
//!
//! Byte-level problems (framing, checksum) never surface here: they are
//! explicit per-stage outcomes ([`FramingError`](crate::FramingError),
//! [`ChecksumMismatch`](crate::ChecksumMismatch)) that the pipeline counts and
//! skips. `ScorepadError` covers the conditions a caller has to act on:
//! sockets, configuration, output files.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use scorepad::ScorepadError;
//!
//! let error = ScorepadError::connection_failed("scorepad refused connection");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for scorepad operations.
pub type Result<T, E = ScorepadError> = std::result::Result<T, E>;

/// Main error type for scorepad operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScorepadError {
    #[error("Scorepad connection failed: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Source read failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Serialization failed in {context}: {details}")]
    Serialization { context: String, details: String },

    #[error("Capture data error: {details}")]
    Capture { details: String },
}

impl ScorepadError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScorepadError::Connection { .. } => true,
            ScorepadError::Io { .. } => true,
            ScorepadError::Timeout { .. } => true,
            ScorepadError::File { .. } => false,
            ScorepadError::Config { .. } => false,
            ScorepadError::Serialization { .. } => false,
            ScorepadError::Capture { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ScorepadError::Connection { .. } => vec![
                "Check the scorepad is powered and on the same network",
                "Verify host and port in the configuration",
                "Check mode: the scorepad either connects to us (server) or listens (client)",
            ],
            ScorepadError::Io { .. } => vec![
                "Wait for the scorepad to reconnect",
                "Check network cabling and switch ports",
            ],
            ScorepadError::File { .. } => vec![
                "Check the output directory exists and is writable",
                "Check file permissions",
                "Ensure sufficient disk space",
            ],
            ScorepadError::Timeout { .. } => vec![
                "Increase the connect timeout",
                "Verify the scorepad is reachable",
            ],
            ScorepadError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Compare against the documented defaults",
            ],
            ScorepadError::Serialization { .. } => {
                vec!["Report the snapshot that failed to encode"]
            }
            ScorepadError::Capture { .. } => vec![
                "Check the capture file is raw bytes or hex text",
                "Re-record the capture",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        ScorepadError::File { path, source }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        ScorepadError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ScorepadError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for socket read errors.
    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        ScorepadError::Io { context: context.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        ScorepadError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for ScorepadError {
    fn from(err: std::io::Error) -> Self {
        ScorepadError::Io { context: "<unknown>".to_string(), source: err }
    }
}

impl From<serde_json::Error> for ScorepadError {
    fn from(err: serde_json::Error) -> Self {
        ScorepadError::Serialization {
            context: "snapshot JSON".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_yaml_ng::Error> for ScorepadError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ScorepadError::Config { details: err.to_string() }
    }
}
