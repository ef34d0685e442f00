//! Error types for s3cli-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for s3cli-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3cli-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required settings missing after flag/env/file resolution
    #[error("missing flag: {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    /// Only one half of the static credential pair was supplied
    #[error("-{given} must be used with -{missing}")]
    PartialCredentials {
        given: &'static str,
        missing: &'static str,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// The operation did not finish before its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Network(_) | Error::Timeout(_) => 3,
            Error::Auth(_) => 4,
            Error::NotFound(_) => 5,
            _ => 1,
        }
    }

    /// Whether this error comes from bad user input rather than a failed operation
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::MissingSettings(_) | Error::PartialCredentials { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 1);
        assert_eq!(Error::MissingSettings(vec!["region".into()]).exit_code(), 1);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Timeout("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_missing_settings_display() {
        let err = Error::MissingSettings(vec!["region".into(), "bucket".into()]);
        assert_eq!(err.to_string(), "missing flag: region, bucket");
        assert!(err.is_usage());
    }

    #[test]
    fn test_partial_credentials_display() {
        let err = Error::PartialCredentials {
            given: "access-key-id",
            missing: "secret-access-key",
        };
        assert_eq!(
            err.to_string(),
            "-access-key-id must be used with -secret-access-key"
        );
        assert!(err.is_usage());
        assert!(!Error::NotFound("k".into()).is_usage());
    }
}
