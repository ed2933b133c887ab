//! Token Generator
//!
//! Opaque token value generation.

use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{GenerationError, TokenError};
use crate::types::TOKEN_BYTES;

/// Token generator interface (for dependency injection).
pub trait TokenGenerator: Send + Sync {
    /// Produce a new token value.
    fn generate(&self) -> Result<String, TokenError>;
}

/// Default generator: 16 bytes from the operating system RNG, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTokenGenerator;

impl DefaultTokenGenerator {
    /// Create new token generator.
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for DefaultTokenGenerator {
    fn generate(&self) -> Result<String, TokenError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| GenerationError::RandomSource {
                message: e.to_string(),
            })?;
        Ok(hex::encode(bytes))
    }
}

/// Mock token generator for testing.
#[derive(Default)]
pub struct MockTokenGenerator {
    queued: Mutex<VecDeque<String>>,
    counter: AtomicU64,
    next_error: Mutex<Option<GenerationError>>,
}

impl MockTokenGenerator {
    /// Create new mock token generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a token to hand out next.
    pub fn push_token(&self, token: impl Into<String>) -> &Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(token.into());
        self
    }

    /// Fail the next generation.
    pub fn set_next_error(&self, error: GenerationError) -> &Self {
        *self.next_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }
}

impl TokenGenerator for MockTokenGenerator {
    fn generate(&self) -> Result<String, TokenError> {
        if let Some(error) = self
            .next_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error.into());
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        Ok(queued.unwrap_or_else(|| format!("mock-token-{}", n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_token_shape() {
        let token = DefaultTokenGenerator::new().generate().unwrap();

        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_default_tokens_differ() {
        let generator = DefaultTokenGenerator::new();
        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_mock_generator_queue() {
        let generator = MockTokenGenerator::new();
        generator.push_token("first");

        assert_eq!(generator.generate().unwrap(), "first");
        assert_eq!(generator.generate().unwrap(), "mock-token-1");
    }

    #[test]
    fn test_mock_generator_error() {
        let generator = MockTokenGenerator::new();
        generator.set_next_error(GenerationError::RandomSource {
            message: "entropy exhausted".to_string(),
        });

        assert!(matches!(
            generator.generate(),
            Err(TokenError::Generation(_))
        ));
        assert!(generator.generate().is_ok());
    }
}
