// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the errors produced while acquiring, transforming, decoding and
//! watching configuration sources. All errors use `thiserror` for proper error handling
//! and conversion.

use std::time::Duration;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents every failure that can be reported to a caller. Flow-control
/// signals of the streaming transformer (need more input, output exhausted) are not
/// errors and are reported through [`TransformStatus`](crate::transform::TransformStatus)
/// instead. It is marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use streamcfg::domain::errors::ConfigError;
///
/// fn next_delta() -> Result<(), ConfigError> {
///     Err(ConfigError::WatcherStopped)
/// }
///
/// assert!(next_delta().unwrap_err().is_stopped());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration bytes could not be acquired (open or read failure).
    #[error("Configuration source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        /// The name of the source that could not be read
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The configured codec rejected the input bytes.
    #[error("Failed to decode configuration with codec '{codec}': {message}")]
    DecodeFailure {
        /// The codec that failed
        codec: String,
        /// The error message
        message: String,
        /// The underlying decoding error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The configured codec could not serialize the record.
    #[error("Failed to encode configuration with codec '{codec}': {message}")]
    EncodeFailure {
        /// The codec that failed
        codec: String,
        /// The error message
        message: String,
        /// The underlying encoding error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A fixed output buffer was too small to hold the transformed bytes.
    #[error("Output buffer too small: {available} bytes available, at least {needed} required")]
    OutputTooSmall {
        /// Lower bound on the number of bytes the output needs
        needed: usize,
        /// Size of the buffer that was supplied
        available: usize,
    },

    /// The watcher was stopped; no further deltas will be delivered.
    #[error("Configuration watcher stopped")]
    WatcherStopped,

    /// Neither a path nor a reader was configured for a file source.
    #[error("Configuration path does not exist")]
    PathNotExist,

    /// A substitution pattern failed to compile.
    #[error("Invalid substitution pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern text
        pattern: String,
        /// The compilation error
        #[source]
        source: regex::Error,
    },

    /// The polling interval bounds are inconsistent.
    #[error("Invalid polling interval: min {min:?} exceeds max {max:?}")]
    InvalidInterval {
        /// The lower bound
        min: Duration,
        /// The upper bound
        max: Duration,
    },

    /// A builder was finished without a required setting.
    #[error("Invalid configuration options: {message}")]
    InvalidOptions {
        /// What is missing or inconsistent
        message: String,
    },

    /// A record could not be flattened into a field map.
    #[error("Failed to map record fields: {message}")]
    FieldMapping {
        /// The error message
        message: String,
    },

    /// A lifecycle hook rejected the operation.
    #[error("{stage} hook failed: {message}")]
    HookFailed {
        /// The lifecycle stage, e.g. `before-load`
        stage: &'static str,
        /// The error message
        message: String,
    },

    /// An error occurred in a configuration watcher.
    #[error("Configuration watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Creates a `SourceUnavailable` error wrapping an I/O failure.
    pub fn source_io(source_name: impl Into<String>, message: impl Into<String>, err: std::io::Error) -> Self {
        ConfigError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates a `DecodeFailure` from any codec error.
    pub fn decode<E>(codec: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::DecodeFailure {
            codec: codec.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates an `EncodeFailure` from any codec error.
    pub fn encode<E>(codec: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::EncodeFailure {
            codec: codec.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns true if this is the terminal stopped indication of a watcher.
    pub fn is_stopped(&self) -> bool {
        matches!(self, ConfigError::WatcherStopped)
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_error() {
        let error = ConfigError::SourceUnavailable {
            source_name: "file".to_string(),
            message: "failed to open: /etc/app.json".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration source 'file' unavailable: failed to open: /etc/app.json"
        );
    }

    #[test]
    fn test_decode_failure_keeps_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ConfigError::decode("json", parse_err);
        assert!(matches!(error, ConfigError::DecodeFailure { .. }));
        assert!(error.to_string().contains("json"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_output_too_small_error() {
        let error = ConfigError::OutputTooSmall {
            needed: 10,
            available: 4,
        };
        assert_eq!(
            error.to_string(),
            "Output buffer too small: 4 bytes available, at least 10 required"
        );
    }

    #[test]
    fn test_watcher_stopped_error() {
        let error = ConfigError::WatcherStopped;
        assert!(error.is_stopped());
        assert_eq!(error.to_string(), "Configuration watcher stopped");
    }

    #[test]
    fn test_invalid_interval_error() {
        let error = ConfigError::InvalidInterval {
            min: Duration::from_secs(2),
            max: Duration::from_secs(1),
        };
        assert!(error.to_string().contains("exceeds"));
        assert!(!error.is_stopped());
    }

    #[test]
    fn test_hook_failed_error() {
        let error = ConfigError::HookFailed {
            stage: "before-load",
            message: "denied".to_string(),
        };
        assert_eq!(error.to_string(), "before-load hook failed: denied");
    }

    #[test]
    fn test_io_failure_becomes_source_unavailable() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ConfigError::source_io("file:/etc/app.json", "failed to open: /etc/app.json", io_error);
        assert!(matches!(error, ConfigError::SourceUnavailable { .. }));
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "file not found");
    }
}
