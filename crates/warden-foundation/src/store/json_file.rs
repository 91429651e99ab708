//! JSON file store
//!
//! Persists the full user-state document as one pretty-printed JSON
//! file. A missing file reads as an empty document; a malformed file is
//! logged and also reads as empty, so a damaged store degrades to a
//! fresh start instead of an outage. Writes go to a sibling temp file
//! first and are renamed into place, so a crash mid-write leaves the
//! previous document intact.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;
use warden_kernel::state::AllUserState;
use warden_kernel::storage::{StateStore, StoreResult};

/// File-backed [`StateStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store that persists to `path`.
    ///
    /// Parent directories are created on the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the persisted document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> StoreResult<AllUserState> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AllUserState::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(
                    "User state file {} is malformed ({}), starting with empty state",
                    self.path.display(),
                    e
                );
                Ok(AllUserState::new())
            }
        }
    }

    async fn save(&self, data: &AllUserState) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
