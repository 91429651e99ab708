use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use warden_kernel::state::AllUserState;
use warden_kernel::storage::{StateStore, StoreError, StoreResult};

/// A store wrapper that fails on command
///
/// Wraps any real store and injects load or save failures, so tests can
/// drive the engine down its degraded paths. Also counts the saves that
/// reached it, letting tests assert on write traffic as well as
/// outcomes.
pub struct FlakyStore {
    inner: Arc<dyn StateStore>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn StateStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_loads: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
            save_count: AtomicUsize::new(0),
        })
    }

    /// Make every subsequent load fail (or stop failing).
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent save fail (or stop failing).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of save attempts, failed ones included.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn load(&self) -> StoreResult<AllUserState> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected load failure".into()));
        }
        self.inner.load().await
    }

    async fn save(&self, data: &AllUserState) -> StoreResult<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected save failure".into()));
        }
        self.inner.save(data).await
    }
}
