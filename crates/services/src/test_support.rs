use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use storage::repository::{InMemoryRepository, KeyValueStore, StorageError};

/// Fails the first read, then behaves like the wrapped repository.
pub(crate) struct FailFirstRead {
    inner: InMemoryRepository,
    failed: AtomicBool,
}

impl FailFirstRead {
    pub(crate) fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            failed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl KeyValueStore for FailFirstRead {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Unavailable("database is locked".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
