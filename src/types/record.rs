//! Token Record Types
//!
//! The persisted token document and the filter used to look it up.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Persisted token document.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Subject the token was issued for.
    pub user_id: String,
    /// Opaque credential value.
    pub token: String,
    /// Contact address the token was delivered to.
    pub email: String,
    /// Nominal expiration time.
    pub expires: DateTime<Utc>,
}

impl TokenRecord {
    /// Create a new token record.
    pub fn new(
        user_id: impl Into<String>,
        token: impl Into<String>,
        email: impl Into<String>,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            email: email.into(),
            expires,
        }
    }

    /// Check whether the record is still usable at `now`.
    ///
    /// A record is fresh only while `now` is strictly earlier than
    /// `expires - buffer`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        match self.expires.checked_sub_signed(buffer) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }

    /// Remaining usable lifetime at `now`, zero once stale.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>, buffer: Duration) -> Duration {
        match self.expires.checked_sub_signed(buffer) {
            Some(deadline) if deadline > now => deadline - now,
            _ => Duration::zero(),
        }
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Exact-match lookup filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenFilter {
    /// Subject to match.
    pub user_id: String,
    /// Token value to match, if any.
    pub token: Option<String>,
}

impl TokenFilter {
    /// Match any record for a user.
    pub fn by_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: None,
        }
    }

    /// Match the record holding a specific token for a user.
    pub fn by_user_and_token(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: Some(token.into()),
        }
    }

    /// Check if a record satisfies this filter.
    pub fn matches(&self, record: &TokenRecord) -> bool {
        record.user_id == self.user_id
            && self
                .token
                .as_deref()
                .map_or(true, |token| record.token == token)
    }
}
