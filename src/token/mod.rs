//! Token Management
//!
//! Token lifecycle management: persistence and the issue/validate/consume
//! rules built on top of it.
//!
//! This module provides:
//!
//! - **Token Storage**: The persistence collaborator trait with in-memory and mock stores
//! - **Token Manager**: Issuance, buffered freshness checks, and single-use consumption

pub mod manager;
pub mod storage;

// Token Storage
pub use storage::{
    create_in_memory_token_store, create_mock_token_store, InMemoryTokenStore, MockTokenStore,
    StoreCall, TokenStore,
};

// Token Manager
pub use manager::{create_mock_token_manager, DefaultTokenManager, MockTokenManager, TokenManager};
