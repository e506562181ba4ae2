//! Structured error types for frontdesk-core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for frontdesk-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Configuration file missing
    #[error("Config not found at {path:?}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Password hashing or verification failed
    #[error("Password hash error: {reason}")]
    PasswordHash { reason: String },
}

/// Result type alias for frontdesk-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a password hash error
    pub fn password_hash(reason: impl Into<String>) -> Self {
        Self::PasswordHash {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("missing [database] section");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing [database] section"
        );

        let err = CoreError::ConfigNotFound {
            path: PathBuf::from("/tmp/none.toml"),
        };
        assert!(err.to_string().contains("/tmp/none.toml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();

        assert!(matches!(core_err, CoreError::Io { .. }));
    }
}
