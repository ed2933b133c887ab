//! Core Infrastructure
//!
//! Injectable seams used by the token manager.

pub mod clock;
pub mod generator;

pub use clock::{Clock, MockClock, SystemClock};
pub use generator::{DefaultTokenGenerator, MockTokenGenerator, TokenGenerator};
