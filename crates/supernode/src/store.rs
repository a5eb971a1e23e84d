//! Record storage backing a routing server.
//!
//! Only routing records (values and provider sets) are written here. The
//! storage engine itself is pluggable through [`RecordStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for routing record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verify that the backend can be used. Called once when a routing
    /// server is constructed.
    fn check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn put(&self, key: String, value: Vec<u8>) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// In-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, key: String, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}
