//! Token Error Types
//!
//! Error hierarchy for infrastructure failures. Business outcomes such as an
//! expired or unknown token are reported as [`TokenStatus`](crate::types::TokenStatus)
//! values, never as errors.

use std::time::Duration;
use thiserror::Error;

/// Root error type for token operations.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Token generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid token lifetime: {ttl:?}")]
    InvalidTtl { ttl: Duration },
}

impl TokenError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "TOKEN_CONFIG",
            Self::Storage(_) => "TOKEN_STORAGE",
            Self::Generation(_) => "TOKEN_GENERATION",
            Self::InvalidTtl { .. } => "TOKEN_INVALID_TTL",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Duration out of range: {duration:?}")]
    DurationOutOfRange { duration: Duration },
}

/// Storage error raised by a [`TokenStore`](crate::token::TokenStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

impl StorageError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Random source failure while generating a token.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Random source failed: {message}")]
    RandomSource { message: String },
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Get user-friendly error message.
pub fn get_user_message(error: &TokenError) -> String {
    match error {
        TokenError::Storage(e) if e.is_retryable() => {
            "The service is temporarily unavailable. Please try again later.".to_string()
        }
        TokenError::InvalidTtl { .. } | TokenError::Configuration(_) => {
            "The request could not be completed due to a server misconfiguration.".to_string()
        }
        _ => "An unexpected error occurred. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = TokenError::from(StorageError::ReadFailed {
            message: "boom".to_string(),
        });
        assert_eq!(error.error_code(), "TOKEN_STORAGE");

        let error = TokenError::InvalidTtl {
            ttl: Duration::ZERO,
        };
        assert_eq!(error.error_code(), "TOKEN_INVALID_TTL");
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(TokenError::from(StorageError::Unavailable {
            message: "connection reset".to_string()
        })
        .is_retryable());
        assert!(!TokenError::from(StorageError::WriteFailed {
            message: "duplicate key".to_string()
        })
        .is_retryable());
        assert!(!TokenError::InvalidTtl {
            ttl: Duration::ZERO
        }
        .is_retryable());
    }

    #[test]
    fn test_storage_error_is_preserved() {
        let source = StorageError::DeleteFailed {
            message: "timeout".to_string(),
        };
        match TokenError::from(source.clone()) {
            TokenError::Storage(inner) => assert_eq!(inner, source),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_user_message_is_generic() {
        let message = get_user_message(&TokenError::from(StorageError::ReadFailed {
            message: "index corrupted at page 42".to_string(),
        }));
        assert!(!message.contains("page 42"));
    }
}
