//! Token Types
//!
//! Core type definitions for token lifecycle operations.

pub mod config;
pub mod record;
pub mod status;

pub use config::*;
pub use record::*;
pub use status::*;
