//! Read-through cache for the user-state document
//!
//! Sits between the engine and the [`StateStore`]. Reads are served from
//! memory while the last load is younger than [`CACHE_STALENESS_SECS`];
//! anything older, an explicit `force_reload`, or a cache that has never
//! held a non-empty document goes back to the store. Commits write
//! through to the store first and only replace the in-memory copy after
//! the write succeeds, so a failed save can never make the cache lie
//! about what is on disk.
//!
//! The staleness bound is an accepted inconsistency window for
//! multi-process deployments, not a correctness mechanism; the primary
//! deployment is a single process.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::error;
use warden_kernel::clock::Clock;
use warden_kernel::state::AllUserState;
use warden_kernel::storage::{StateStore, StoreResult};

/// Seconds an in-memory snapshot may be served before the store is
/// consulted again.
pub const CACHE_STALENESS_SECS: i64 = 5;

struct CacheSlot {
    data: Option<AllUserState>,
    loaded_at: i64,
}

/// Read-through cache over a [`StateStore`].
pub struct StateCache {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    slot: Mutex<CacheSlot>,
}

impl StateCache {
    /// Create a cache over `store`, timing staleness with `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            slot: Mutex::new(CacheSlot {
                data: None,
                loaded_at: 0,
            }),
        }
    }

    /// Current document, from memory when fresh, otherwise from the
    /// store.
    ///
    /// A load failure is logged and served as an empty document; the
    /// caller never sees an error. The returned map is the caller's own
    /// copy to mutate and hand back via [`StateCache::commit`].
    pub async fn get(&self, force_reload: bool) -> AllUserState {
        let now = self.clock.now_ts();
        {
            let slot = self.slot.lock();
            if !force_reload {
                if let Some(data) = slot.data.as_ref() {
                    if !data.is_empty() && now - slot.loaded_at <= CACHE_STALENESS_SECS {
                        return data.clone();
                    }
                }
            }
        }

        let data = match self.store.load().await {
            Ok(data) => data,
            Err(e) => {
                error!("Could not load user state: {e}");
                AllUserState::new()
            }
        };

        let mut slot = self.slot.lock();
        slot.data = Some(data.clone());
        slot.loaded_at = now;
        data
    }

    /// Persist `data` and, on success, make it the cached snapshot.
    ///
    /// On failure the cache is left untouched: subsequent reads keep
    /// serving the last state the store confirmed.
    pub async fn commit(&self, data: AllUserState) -> StoreResult<()> {
        self.store.save(&data).await?;

        let now = self.clock.now_ts();
        let mut slot = self.slot.lock();
        slot.data = Some(data);
        slot.loaded_at = now;
        Ok(())
    }
}
