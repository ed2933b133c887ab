//! Validation Status
//!
//! Outcome of checking a token against the store.

use serde::{Deserialize, Serialize};

/// Message shared by every non-valid status.
pub const INVALID_TOKEN_MESSAGE: &str = "The link is invalid or has expired.";

/// Outcome of validating or consuming a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// A matching record exists and is inside the buffered validity window.
    Valid,
    /// A matching record exists but is past the buffered validity window.
    Expired,
    /// No record matches the user and token.
    NotFound,
}

impl TokenStatus {
    /// Check if the token was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Internal message describing the outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "Token is valid",
            Self::Expired => "Token is expired",
            Self::NotFound => "Token does not exist",
        }
    }

    /// Message safe to show end users.
    ///
    /// `Expired` and `NotFound` share the same text.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Valid => self.message(),
            Self::Expired | Self::NotFound => INVALID_TOKEN_MESSAGE,
        }
    }

    /// Label used in metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
