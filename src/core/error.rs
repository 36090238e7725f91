//! Unified error handling for enroute-ctl
//!
//! Every failure a step can hit is local to that step and only ever reported.
//! The one exception is [`FatalDiagnosticError`], which aborts the whole run.

use std::io;

use thiserror::Error;

/// A request could not be constructed from a step.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    /// The POST argument could not be encoded as JSON
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The target is not an absolute URI
    #[error("invalid request target [{target}]: {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// The network call itself failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// The debug request dump could not be produced or written.
///
/// Raised only when debug mode is on. It stops the run before the pending
/// request is sent.
#[derive(Debug, Error)]
pub enum FatalDiagnosticError {
    #[error("request target [{0}] has no authority to dump")]
    MissingHost(String),

    #[error("header {name} is not printable: {reason}")]
    Header { name: String, reason: String },

    #[error("failed to write request dump: {0}")]
    Write(#[from] io::Error),
}

/// Loading or validating the payload document failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read conf file from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse yaml conf: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("conf file validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RequestBuildError = err.into();
        assert!(err.to_string().starts_with("failed to encode request body"));
    }

    #[test]
    fn test_fatal_write_error_converts() {
        let err: FatalDiagnosticError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert_eq!(err.to_string(), "failed to write request dump: closed");
    }
}
