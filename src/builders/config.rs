//! Configuration Builder
//!
//! Fluent builder for token configuration.

use std::time::Duration;

use crate::error::TokenError;
use crate::types::{TokenConfig, DEFAULT_SAFETY_BUFFER, DEFAULT_TOKEN_TTL};

/// Token configuration builder.
pub struct TokenConfigBuilder {
    default_ttl: Duration,
    safety_buffer: Duration,
}

impl TokenConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self {
            default_ttl: DEFAULT_TOKEN_TTL,
            safety_buffer: DEFAULT_SAFETY_BUFFER,
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: TokenConfig) -> Self {
        Self {
            default_ttl: config.default_ttl,
            safety_buffer: config.safety_buffer,
        }
    }

    /// Set default token lifetime.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set safety buffer.
    pub fn safety_buffer(mut self, buffer: Duration) -> Self {
        self.safety_buffer = buffer;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<TokenConfig, TokenError> {
        let config = TokenConfig {
            default_ttl: self.default_ttl,
            safety_buffer: self.safety_buffer,
        };
        config.validate()?;

        if self.default_ttl <= self.safety_buffer {
            tracing::warn!(
                default_ttl_secs = self.default_ttl.as_secs(),
                safety_buffer_secs = self.safety_buffer.as_secs(),
                "default_ttl does not exceed safety_buffer; tokens issued with it will never validate"
            );
        }

        Ok(config)
    }
}

impl Default for TokenConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new token configuration builder.
pub fn token_config() -> TokenConfigBuilder {
    TokenConfigBuilder::new()
}
