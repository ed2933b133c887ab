//! Configuration Types
//!
//! Token lifetime configuration.

use std::time::Duration;

use crate::error::ConfigurationError;

/// Number of random bytes in a generated token.
pub const TOKEN_BYTES: usize = 16;

/// Default token lifetime (1 hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Default margin subtracted from the expiration time (5 minutes).
pub const DEFAULT_SAFETY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Environment variable holding the default lifetime in seconds.
pub const ENV_TOKEN_TTL_SECS: &str = "AUTH_TOKEN_TTL_SECS";

/// Environment variable holding the safety buffer in seconds.
pub const ENV_SAFETY_BUFFER_SECS: &str = "AUTH_TOKEN_SAFETY_BUFFER_SECS";

/// Token manager configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
    /// Lifetime used by `issue_with_default_ttl`.
    pub default_ttl: Duration,
    /// Margin before `expires` at which a token is already treated as expired.
    pub safety_buffer: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TOKEN_TTL,
            safety_buffer: DEFAULT_SAFETY_BUFFER,
        }
    }
}

impl TokenConfig {
    /// Create configuration from environment variables.
    ///
    /// Missing variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            default_ttl: read_secs(&lookup, ENV_TOKEN_TTL_SECS)?.unwrap_or(defaults.default_ttl),
            safety_buffer: read_secs(&lookup, ENV_SAFETY_BUFFER_SECS)?
                .unwrap_or(defaults.safety_buffer),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the lifetimes are usable.
    ///
    /// `default_ttl` must be non-zero and both durations must fit chrono's range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.default_ttl.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "default_ttl must be greater than zero".to_string(),
            });
        }

        to_chrono(self.default_ttl)?;
        to_chrono(self.safety_buffer)?;
        Ok(())
    }

    /// Safety buffer as a chrono duration.
    pub fn safety_buffer_delta(&self) -> Result<chrono::Duration, ConfigurationError> {
        to_chrono(self.safety_buffer)
    }
}

fn read_secs<F>(lookup: &F, name: &str) -> Result<Option<Duration>, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigurationError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Convert a std duration into a chrono duration.
pub(crate) fn to_chrono(duration: Duration) -> Result<chrono::Duration, ConfigurationError> {
    chrono::Duration::from_std(duration)
        .map_err(|_| ConfigurationError::DurationOutOfRange { duration })
}
