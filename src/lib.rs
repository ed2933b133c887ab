//! Auth Tokens Integration Module
//!
//! Single-use, time-limited opaque tokens for authentication flows such as
//! password reset, email verification and magic-link sign-in.
//!
//! # Features
//!
//! - 128-bit random tokens, hex encoded
//! - One live token per user; reissuing replaces the previous token
//! - Buffered expiration: a token stops validating 5 minutes before its nominal expiry
//! - Single-use consumption
//! - Pluggable storage, clock, generator and metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use auth_tokens_integration::{token_config, DefaultTokenManager, InMemoryTokenStore, TokenManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = token_config()
//!         .default_ttl(Duration::from_secs(3600))
//!         .build()?;
//!
//!     let manager = DefaultTokenManager::new(config, Arc::new(InMemoryTokenStore::new()));
//!
//!     let token = manager.issue_with_default_ttl("user-42", "user@example.com").await?;
//!
//!     // Later, when the user follows the emailed link:
//!     let status = manager.consume(&token, "user-42").await?;
//!     if !status.is_valid() {
//!         println!("{}", status.public_message());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: Token record, lookup filter, validation status, configuration
//! - `error`: Error hierarchy for infrastructure failures
//! - `core`: Clock and token generator seams
//! - `token`: Storage trait and the token manager
//! - `builders`: Fluent builder for configuration
//! - `telemetry`: Metrics

pub mod builders;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod token;
pub mod types;

// Re-export builders
pub use builders::{token_config, TokenConfigBuilder};

// Re-export errors
pub use error::{
    get_user_message, ConfigurationError, GenerationError, StorageError, TokenError, TokenResult,
};

// Re-export types
pub use types::{
    TokenConfig, TokenFilter, TokenRecord, TokenStatus, DEFAULT_SAFETY_BUFFER, DEFAULT_TOKEN_TTL,
    INVALID_TOKEN_MESSAGE, TOKEN_BYTES,
};

// Re-export core components
pub use self::core::{
    Clock, DefaultTokenGenerator, MockClock, MockTokenGenerator, SystemClock, TokenGenerator,
};

// Re-export token management
pub use token::{
    // Storage
    InMemoryTokenStore, MockTokenStore, StoreCall, TokenStore,
    // Manager
    DefaultTokenManager, MockTokenManager, TokenManager,
};

// Re-export telemetry
pub use telemetry::{InMemoryMetrics, MetricEntry, MetricLabels, NoOpMetrics, TokenMetrics};
