//! Token Storage
//!
//! Persistence collaborator for token records, with in-memory and mock
//! implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StorageError;
use crate::types::{TokenFilter, TokenRecord};

/// Token storage interface.
///
/// Mirrors a document collection: exact-match lookups, inserts, and
/// single-document deletes.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Find the first record matching the filter.
    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TokenRecord>, StorageError>;

    /// Insert a new record.
    async fn create(&self, record: TokenRecord) -> Result<(), StorageError>;

    /// Delete at most one record matching the filter.
    async fn delete_one(&self, filter: &TokenFilter) -> Result<bool, StorageError>;

    /// Delete every record with `expires <= cutoff`.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError>;

    /// Replace whatever record `record.user_id` currently holds.
    ///
    /// The provided implementation runs find, delete, create as separate
    /// calls. Two concurrent callers for the same user can both pass the find
    /// and leave two records behind. Stores with per-document atomicity
    /// should override this with an upsert keyed by user.
    async fn replace_for_user(&self, record: TokenRecord) -> Result<(), StorageError> {
        let filter = TokenFilter::by_user(record.user_id.clone());
        if self.find_one(&filter).await?.is_some() {
            self.delete_one(&filter).await?;
        }
        self.create(record).await
    }
}

/// In-memory token storage implementation.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: Mutex<Vec<TokenRecord>>,
}

impl InMemoryTokenStore {
    /// Create new in-memory token storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored records.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Number of records held for a user.
    pub fn count_for_user(&self, user_id: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| r.user_id == user_id)
            .count()
    }

    fn records(&self) -> MutexGuard<'_, Vec<TokenRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TokenRecord>, StorageError> {
        Ok(self.records().iter().find(|r| filter.matches(r)).cloned())
    }

    async fn create(&self, record: TokenRecord) -> Result<(), StorageError> {
        self.records().push(record);
        Ok(())
    }

    async fn delete_one(&self, filter: &TokenFilter) -> Result<bool, StorageError> {
        let mut records = self.records();
        match records.iter().position(|r| filter.matches(r)) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut records = self.records();
        let initial_count = records.len();
        records.retain(|r| r.expires > cutoff);
        Ok((initial_count - records.len()) as u64)
    }

    async fn replace_for_user(&self, record: TokenRecord) -> Result<(), StorageError> {
        let mut records = self.records();
        records.retain(|r| r.user_id != record.user_id);
        records.push(record);
        Ok(())
    }
}

/// A single call observed by [`MockTokenStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    /// `find_one` with its filter.
    FindOne(TokenFilter),
    /// `create` with the inserted record.
    Create(TokenRecord),
    /// `delete_one` with its filter.
    DeleteOne(TokenFilter),
    /// `delete_expired` with its cutoff.
    DeleteExpired(DateTime<Utc>),
}

/// Mock token storage for testing.
///
/// Keeps the provided `replace_for_user`, so issuance shows up as the
/// individual find, delete, create calls.
#[derive(Default)]
pub struct MockTokenStore {
    records: Mutex<Vec<TokenRecord>>,
    calls: Mutex<Vec<StoreCall>>,
    next_error: Mutex<Option<StorageError>>,
    should_fail: Mutex<bool>,
}

impl MockTokenStore {
    /// Create new mock token storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next error to return.
    pub fn set_next_error(&self, error: StorageError) -> &Self {
        *self.next_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Set storage to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) = should_fail;
        self
    }

    /// Pre-populate a record.
    pub fn add_record(&self, record: TokenRecord) -> &Self {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        self
    }

    /// Snapshot of stored records.
    pub fn get_records(&self) -> Vec<TokenRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every call received, in order.
    pub fn get_calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get delete history.
    pub fn get_delete_history(&self) -> Vec<TokenFilter> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::DeleteOne(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    fn record_call(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn check_error(&self) -> Result<(), StorageError> {
        if *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(StorageError::Unavailable {
                message: "Mock storage failure".to_string(),
            });
        }

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
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TokenRecord>, StorageError> {
        self.check_error()?;
        self.record_call(StoreCall::FindOne(filter.clone()));

        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().find(|r| filter.matches(r)).cloned())
    }

    async fn create(&self, record: TokenRecord) -> Result<(), StorageError> {
        self.check_error()?;
        self.record_call(StoreCall::Create(record.clone()));

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }

    async fn delete_one(&self, filter: &TokenFilter) -> Result<bool, StorageError> {
        self.check_error()?;
        self.record_call(StoreCall::DeleteOne(filter.clone()));

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match records.iter().position(|r| filter.matches(r)) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        self.check_error()?;
        self.record_call(StoreCall::DeleteExpired(cutoff));

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let initial_count = records.len();
        records.retain(|r| r.expires > cutoff);
        Ok((initial_count - records.len()) as u64)
    }
}

/// Create in-memory token storage.
pub fn create_in_memory_token_store() -> InMemoryTokenStore {
    InMemoryTokenStore::new()
}

/// Create mock token storage for testing.
pub fn create_mock_token_store() -> MockTokenStore {
    MockTokenStore::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user_id: &str, token: &str, expires: DateTime<Utc>) -> TokenRecord {
        TokenRecord::new(user_id, token, format!("{}@example.com", user_id), expires)
    }

    #[tokio::test]
    async fn test_in_memory_find_and_delete() {
        let store = InMemoryTokenStore::new();
        let expires = Utc::now() + Duration::hours(1);
        store.create(record("user1", "t1", expires)).await.unwrap();

        let found = store
            .find_one(&TokenFilter::by_user_and_token("user1", "t1"))
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.token), Some("t1".to_string()));

        let missing = store
            .find_one(&TokenFilter::by_user_and_token("user1", "t2"))
            .await
            .unwrap();
        assert!(missing.is_none());

        assert!(store.delete_one(&TokenFilter::by_user("user1")).await.unwrap());
        assert!(!store.delete_one(&TokenFilter::by_user("user1")).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_delete_one_removes_single_match() {
        let store = InMemoryTokenStore::new();
        let expires = Utc::now() + Duration::hours(1);
        store.create(record("user1", "t1", expires)).await.unwrap();
        store.create(record("user1", "t2", expires)).await.unwrap();

        store.delete_one(&TokenFilter::by_user("user1")).await.unwrap();
        assert_eq!(store.count_for_user("user1"), 1);
    }

    #[tokio::test]
    async fn test_in_memory_replace_for_user() {
        let store = InMemoryTokenStore::new();
        let expires = Utc::now() + Duration::hours(1);
        store.create(record("user1", "old", expires)).await.unwrap();
        store.create(record("user2", "other", expires)).await.unwrap();

        store
            .replace_for_user(record("user1", "new", expires))
            .await
            .unwrap();

        assert_eq!(store.count_for_user("user1"), 1);
        assert_eq!(store.count_for_user("user2"), 1);
        let current = store
            .find_one(&TokenFilter::by_user("user1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.token, "new");
    }

    #[tokio::test]
    async fn test_in_memory_delete_expired() {
        let store = InMemoryTokenStore::new();
        let now = Utc::now();
        store.create(record("user1", "t1", now)).await.unwrap();
        store
            .create(record("user2", "t2", now + Duration::hours(1)))
            .await
            .unwrap();

        let removed = store.delete_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_for_user("user2"), 1);
    }

    #[tokio::test]
    async fn test_mock_default_replace_sequence() {
        let store = MockTokenStore::new();
        let expires = Utc::now() + Duration::hours(1);
        store.add_record(record("user1", "old", expires));

        store
            .replace_for_user(record("user1", "new", expires))
            .await
            .unwrap();

        let calls = store.get_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], StoreCall::FindOne(TokenFilter::by_user("user1")));
        assert_eq!(calls[1], StoreCall::DeleteOne(TokenFilter::by_user("user1")));
        assert!(matches!(&calls[2], StoreCall::Create(r) if r.token == "new"));
        assert_eq!(store.get_records().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_replace_skips_delete_when_absent() {
        let store = MockTokenStore::new();
        let expires = Utc::now() + Duration::hours(1);

        store
            .replace_for_user(record("user1", "new", expires))
            .await
            .unwrap();

        assert!(store.get_delete_history().is_empty());
        assert_eq!(store.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_storage_failure() {
        let store = MockTokenStore::new();
        store.set_should_fail(true);

        let result = store.find_one(&TokenFilter::by_user("user1")).await;
        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
        assert!(store.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_mock_next_error_is_one_shot() {
        let store = MockTokenStore::new();
        store.set_next_error(StorageError::WriteFailed {
            message: "duplicate key".to_string(),
        });

        let expires = Utc::now() + Duration::hours(1);
        assert!(store.create(record("user1", "t1", expires)).await.is_err());
        assert!(store.create(record("user1", "t1", expires)).await.is_ok());
    }
}
