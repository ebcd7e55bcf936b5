//! Durable storage of deck state
//!
//! The core only needs a key-value contract ([`KeyValueStore`]); the adapter
//! ([`DeckPersistence`]) owns the key naming and the JSON encoding, and
//! [`SaveDebouncer`] keeps writes off the answer path.

pub mod debounce;
pub mod file;
pub mod keys;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::deck::DeckState;

pub use debounce::SaveDebouncer;
pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key-value contract provided by the storage collaborator.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
    async fn put(&self, key: &str, value: String) -> StoreResult<()>;
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

pub struct DeckPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl DeckPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persisted record as raw JSON, for best-effort merging.
    pub async fn load_raw(&self, deck_id: &str) -> StoreResult<Option<Value>> {
        let Some(payload) = self.store.get(&keys::deck_state_key(deck_id)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&payload)?))
    }

    /// Persisted record merged over `defaults`.
    pub async fn load(&self, deck_id: &str, defaults: DeckState) -> StoreResult<Option<DeckState>> {
        Ok(self
            .load_raw(deck_id)
            .await?
            .map(|raw| DeckState::merge_over(defaults, &raw)))
    }

    pub async fn save(&self, state: &DeckState) -> StoreResult<()> {
        let payload = serde_json::to_string(state)?;
        self.store.put(&keys::deck_state_key(&state.id), payload).await
    }

    pub async fn delete(&self, deck_id: &str) -> StoreResult<()> {
        self.store.delete(&keys::deck_state_key(deck_id)).await
    }
}
