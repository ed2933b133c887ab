//! Token Manager
//!
//! Issues, validates and consumes single-use tokens.
//!
//! A token stays usable only while the current time is strictly before
//! `expires - safety_buffer`, so the effective lifetime of a token is the
//! requested TTL minus the buffer. Expired and unknown tokens are reported
//! through [`TokenStatus`]; only infrastructure failures become errors.

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::core::{Clock, DefaultTokenGenerator, SystemClock, TokenGenerator};
use crate::error::{ConfigurationError, TokenError, TokenResult};
use crate::telemetry::{NoOpMetrics, TokenMetrics};
use crate::token::TokenStore;
use crate::types::config::to_chrono;
use crate::types::{TokenConfig, TokenFilter, TokenRecord, TokenStatus};

/// Token manager interface.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Issue a new token for a user, replacing any token they already hold.
    async fn issue(&self, user_id: &str, email: &str, ttl: Duration) -> TokenResult<String>;

    /// Check a token without touching the stored record.
    async fn validate(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus>;

    /// Check a token and delete it so it cannot be used again.
    async fn consume(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus>;

    /// Remove whatever token a user holds. Returns `true` if one was removed.
    async fn revoke(&self, user_id: &str) -> TokenResult<bool>;

    /// Delete every record already stale under the buffered rule.
    async fn purge_expired(&self) -> TokenResult<u64>;
}

/// Default token manager implementation.
pub struct DefaultTokenManager<S: TokenStore> {
    config: TokenConfig,
    store: Arc<S>,
    generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn TokenMetrics>,
}

impl<S: TokenStore> DefaultTokenManager<S> {
    /// Create new token manager backed by `store`.
    pub fn new(config: TokenConfig, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            generator: Arc::new(DefaultTokenGenerator::new()),
            clock: Arc::new(SystemClock),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Replace the token generator.
    pub fn with_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn TokenMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a token using the configured default lifetime.
    pub async fn issue_with_default_ttl(&self, user_id: &str, email: &str) -> TokenResult<String> {
        self.issue(user_id, email, self.config.default_ttl).await
    }

    fn classify(&self, record: &TokenRecord, buffer: ChronoDuration) -> TokenStatus {
        let now = self.clock.now();
        if record.is_fresh_at(now, buffer) {
            debug!(
                remaining_secs = record.remaining_lifetime(now, buffer).num_seconds(),
                "Token is fresh"
            );
            TokenStatus::Valid
        } else {
            TokenStatus::Expired
        }
    }

    fn track<T>(&self, operation: &str, result: TokenResult<T>) -> TokenResult<T> {
        if let Err(error) = &result {
            warn!(operation, error_code = error.error_code(), error = %error, "Token operation failed");
            self.metrics.record_error(operation, error.error_code());
        }
        result
    }

    async fn issue_token(&self, user_id: &str, email: &str, ttl: Duration) -> TokenResult<String> {
        if ttl.is_zero() {
            return Err(TokenError::InvalidTtl { ttl });
        }
        let lifetime = to_chrono(ttl)?;
        self.config.safety_buffer_delta()?;

        if ttl <= self.config.safety_buffer {
            warn!(
                ttl_secs = ttl.as_secs(),
                buffer_secs = self.config.safety_buffer.as_secs(),
                "Token lifetime does not exceed the safety buffer; token will never validate"
            );
        }

        let token = self.generator.generate()?;
        let expires = self
            .clock
            .now()
            .checked_add_signed(lifetime)
            .ok_or(TokenError::InvalidTtl { ttl })?;

        self.store
            .replace_for_user(TokenRecord::new(user_id, token.clone(), email, expires))
            .await?;

        self.metrics.record_issued();
        info!(%expires, "Issued token");
        Ok(token)
    }

    async fn check_token(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        let buffer = self.config.safety_buffer_delta()?;
        let filter = TokenFilter::by_user_and_token(user_id, token);
        match self.store.find_one(&filter).await? {
            Some(record) => Ok(self.classify(&record, buffer)),
            None => Ok(TokenStatus::NotFound),
        }
    }

    async fn consume_token(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        let buffer = self.config.safety_buffer_delta()?;
        let filter = TokenFilter::by_user_and_token(user_id, token);
        let Some(record) = self.store.find_one(&filter).await? else {
            return Ok(TokenStatus::NotFound);
        };

        if !self.store.delete_one(&filter).await? {
            debug!("Token was consumed by a concurrent caller");
            return Ok(TokenStatus::NotFound);
        }

        Ok(self.classify(&record, buffer))
    }

    async fn revoke_token(&self, user_id: &str) -> TokenResult<bool> {
        let filter = TokenFilter::by_user(user_id);
        let mut removed = 0u32;
        while self.store.delete_one(&filter).await? {
            removed += 1;
        }

        if removed > 1 {
            warn!(removed, "User held more than one token record");
        }
        Ok(removed > 0)
    }

    async fn purge_stale(&self) -> TokenResult<u64> {
        let buffer = self.config.safety_buffer_delta()?;
        let cutoff = self.clock.now().checked_add_signed(buffer).ok_or(
            ConfigurationError::DurationOutOfRange {
                duration: self.config.safety_buffer,
            },
        )?;

        Ok(self.store.delete_expired(cutoff).await?)
    }
}

#[async_trait]
impl<S: TokenStore> TokenManager for DefaultTokenManager<S> {
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn issue(&self, user_id: &str, email: &str, ttl: Duration) -> TokenResult<String> {
        let result = self.issue_token(user_id, email, ttl).await;
        self.track("issue", result)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn validate(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        let result = self.check_token(token, user_id).await;
        let status = self.track("validate", result)?;

        self.metrics.record_check("validate", status);
        debug!(status = status.as_label(), "Validated token");
        Ok(status)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn consume(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        let result = self.consume_token(token, user_id).await;
        let status = self.track("consume", result)?;

        self.metrics.record_check("consume", status);
        debug!(status = status.as_label(), "Consumed token");
        Ok(status)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn revoke(&self, user_id: &str) -> TokenResult<bool> {
        let result = self.revoke_token(user_id).await;
        let removed = self.track("revoke", result)?;

        self.metrics.record_revoked(removed);
        info!(removed, "Revoked token");
        Ok(removed)
    }

    #[instrument(skip_all)]
    async fn purge_expired(&self) -> TokenResult<u64> {
        let result = self.purge_stale().await;
        let count = self.track("purge_expired", result)?;

        self.metrics.record_purged(count);
        info!(count, "Purged expired tokens");
        Ok(count)
    }
}

/// Mock token manager for testing.
#[derive(Default)]
pub struct MockTokenManager {
    tokens: Mutex<HashMap<String, String>>,
    issue_history: Mutex<Vec<(String, String, Duration)>>,
    validate_history: Mutex<Vec<(String, String)>>,
    consume_history: Mutex<Vec<(String, String)>>,
    next_status: Mutex<Option<TokenStatus>>,
    next_error: Mutex<Option<TokenError>>,
}

impl MockTokenManager {
    /// Create new mock token manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next validate or consume to report `status`.
    pub fn set_next_status(&self, status: TokenStatus) -> &Self {
        *self.next_status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
        self
    }

    /// Set next error.
    pub fn set_next_error(&self, error: TokenError) -> &Self {
        *self.next_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Pre-populate a token.
    pub fn add_token(&self, user_id: &str, token: &str) -> &Self {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), token.to_string());
        self
    }

    /// Get issue history as `(user_id, email, ttl)`.
    pub fn get_issue_history(&self) -> Vec<(String, String, Duration)> {
        self.issue_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get validate history as `(token, user_id)`.
    pub fn get_validate_history(&self) -> Vec<(String, String)> {
        self.validate_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get consume history as `(token, user_id)`.
    pub fn get_consume_history(&self) -> Vec<(String, String)> {
        self.consume_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_error(&self) -> TokenResult<()> {
        if let Some(error) = self
            .next_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }
        Ok(())
    }

    fn lookup(&self, token: &str, user_id: &str) -> TokenStatus {
        if let Some(status) = self
            .next_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return status;
        }

        match self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
        {
            Some(stored) if stored == token => TokenStatus::Valid,
            _ => TokenStatus::NotFound,
        }
    }
}

#[async_trait]
impl TokenManager for MockTokenManager {
    async fn issue(&self, user_id: &str, email: &str, ttl: Duration) -> TokenResult<String> {
        self.check_error()?;

        let mut history = self
            .issue_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        history.push((user_id.to_string(), email.to_string(), ttl));
        let token = format!("mock-token-{}-{}", user_id, history.len());

        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), token.clone());
        Ok(token)
    }

    async fn validate(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        self.check_error()?;

        self.validate_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token.to_string(), user_id.to_string()));
        Ok(self.lookup(token, user_id))
    }

    async fn consume(&self, token: &str, user_id: &str) -> TokenResult<TokenStatus> {
        self.check_error()?;

        self.consume_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token.to_string(), user_id.to_string()));

        let status = self.lookup(token, user_id);
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        if tokens.get(user_id).map(String::as_str) == Some(token) {
            tokens.remove(user_id);
        }
        Ok(status)
    }

    async fn revoke(&self, user_id: &str) -> TokenResult<bool> {
        self.check_error()?;
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id)
            .is_some())
    }

    async fn purge_expired(&self) -> TokenResult<u64> {
        self.check_error()?;
        Ok(0)
    }
}

/// Create mock token manager for testing.
pub fn create_mock_token_manager() -> MockTokenManager {
    MockTokenManager::new()
}
