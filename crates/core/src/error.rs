//! Error types for the PersonaChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all PersonaChat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a generation backend could not produce a reply.
///
/// The session engine treats every variant the same way: the exchange ends
/// as failed and a fallback message is shown. The distinction only matters
/// for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_displays_correctly() {
        let err = Error::Generation(GenerationError::RateLimited {
            retry_after_secs: 30,
        });
        assert!(err.to_string().contains("30s"));
        assert!(err.to_string().contains("Rate limited"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = Error::Config {
            message: "temperature out of range".into(),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: temperature out of range"
        );
    }

    #[test]
    fn generation_error_converts_into_top_level() {
        fn fails() -> Result<()> {
            Err(GenerationError::BackendUnavailable("connection refused".into()))?
        }
        match fails() {
            Err(Error::Generation(GenerationError::BackendUnavailable(msg))) => {
                assert_eq!(msg, "connection refused");
            }
            other => panic!("Expected BackendUnavailable, got: {other:?}"),
        }
    }
}
