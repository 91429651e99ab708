//! In-memory store
//!
//! Thread-safe store that keeps the document in process memory.
//! Suitable for unit tests, short-lived embeddings, and development
//! environments where durability across restarts is not required.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use warden_kernel::state::AllUserState;
use warden_kernel::storage::{StateStore, StoreResult};

/// Memory-backed [`StateStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<AllUserState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle to an empty store.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create a store pre-populated with `data`.
    #[must_use]
    pub fn seeded(data: AllUserState) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Snapshot of the current document, for assertions.
    pub async fn snapshot(&self) -> AllUserState {
        self.data.read().await.clone()
    }

    /// Drop all stored state.
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn load(&self) -> StoreResult<AllUserState> {
        Ok(self.data.read().await.clone())
    }

    async fn save(&self, data: &AllUserState) -> StoreResult<()> {
        *self.data.write().await = data.clone();
        Ok(())
    }
}
