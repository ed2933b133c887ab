//! Builders
//!
//! Fluent builders for token configuration.

pub mod config;

pub use config::{token_config, TokenConfigBuilder};
