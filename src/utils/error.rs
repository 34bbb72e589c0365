//! Error types for ccplayer-common
//!
//! This module defines the error type returned by fallible constructors,
//! bundle decoding and configuration loading. We use thiserror for the
//! library error and leave anyhow to the inspector binary.

use thiserror::Error;

/// Main error type for ccplayer-common
#[derive(Error, Debug)]
pub enum MediaError {
    /// A constructor or setter received a value outside its valid range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required field is absent from a bundle
    #[error("Missing bundle field '{0}'")]
    MissingField(String),

    /// A bundle field holds a value of the wrong shape
    #[error("Bundle error: {0}")]
    Bundle(String),

    /// Serialized envelope carries a version this build cannot read
    #[error("Unsupported bundle version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),
}

impl MediaError {
    /// Create an invalid-argument error from string
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MediaError::InvalidArgument(msg.into())
    }

    /// Create a bundle error from string
    pub fn bundle<S: Into<String>>(msg: S) -> Self {
        MediaError::Bundle(msg.into())
    }
}

/// Convenience type alias for Results in ccplayer-common
pub type Result<T> = std::result::Result<T, MediaError>;

/// Returns an [`MediaError::InvalidArgument`] carrying `msg` unless `condition` holds.
pub fn check_argument(condition: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(MediaError::InvalidArgument(msg()))
    }
}

/// Extension trait for converting other errors to MediaError
pub trait IntoMediaError<T> {
    /// Convert this error into a configuration error with the given context
    fn config_err(self, context: &str) -> Result<T>;
    /// Convert this error into a bundle error with the given context
    fn bundle_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoMediaError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| MediaError::Config(format!("{}: {}", context, e)))
    }

    fn bundle_err(self, context: &str) -> Result<T> {
        self.map_err(|e| MediaError::Bundle(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MediaError::InvalidArgument("speed must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: speed must be positive");

        let err = MediaError::MissingField("0".to_string());
        assert_eq!(err.to_string(), "Missing bundle field '0'");

        let err = MediaError::UnsupportedVersion { found: 7, expected: 1 };
        assert_eq!(err.to_string(), "Unsupported bundle version 7 (expected 1)");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MediaError = io_err.into();
        assert!(matches!(err, MediaError::FileIO(_)));
    }

    #[test]
    fn test_check_argument() {
        assert!(check_argument(true, || "unused".to_string()).is_ok());
        match check_argument(false, || "max_stars must be positive".to_string()) {
            Err(MediaError::InvalidArgument(msg)) => assert_eq!(msg, "max_stars must be positive"),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_into_media_error_trait() {
        let result: std::result::Result<(), &str> = Err("bad toml");
        match result.config_err("Parsing config") {
            Err(MediaError::Config(msg)) => assert_eq!(msg, "Parsing config: bad toml"),
            _ => panic!("Expected Config error"),
        }
    }
}
