//! Storage trait for the persisted user-state document
//!
//! Defines the abstract store the engine reads and writes through.
//! Implementations live in `warden-foundation` (JSON file, in-memory);
//! anything that can hold the full document (a database row, an object
//! store key) can slot in without touching decision logic.

use crate::state::AllUserState;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a state store backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific error described by a message string.
    #[error("{0}")]
    Backend(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable home of the full user-state document.
///
/// The document is always read and written wholesale. Callers never see
/// a missing store as an error: implementations return an empty document
/// when nothing has been persisted yet, and the read-through cache maps
/// any remaining load failure to an empty document as well. A failed
/// `save` loses durability for that write only; the decision that
/// produced it still stands.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the full document.
    ///
    /// Returns an empty document if nothing has been persisted yet.
    async fn load(&self) -> StoreResult<AllUserState>;

    /// Replace the full document.
    async fn save(&self, data: &AllUserState) -> StoreResult<()>;
}
