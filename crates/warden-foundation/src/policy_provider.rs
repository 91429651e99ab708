//! Policy sources
//!
//! [`StaticPolicyProvider`] serves one fixed policy and never fails;
//! embedders that manage configuration themselves hand the engine one
//! of these. [`FilePolicyProvider`] re-reads a configuration file on
//! every load, so operators can tune the guard without a restart. The
//! format is detected from the file extension (TOML, JSON, YAML, and
//! the other formats the `config` crate understands); missing fields
//! fall back to the policy defaults.

use async_trait::async_trait;
use error_stack::Report;
use std::path::{Path, PathBuf};
use warden_kernel::error::{WardenError, WardenResult};
use warden_kernel::policy::{GuardPolicy, PolicyError, PolicyProvider};

// =============================================================================
// StaticPolicyProvider
// =============================================================================

/// Provider that always serves the same policy.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyProvider {
    policy: GuardPolicy,
}

impl StaticPolicyProvider {
    /// Wrap a fixed policy.
    #[must_use]
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    /// Shared handle around a fixed policy.
    #[must_use]
    pub fn shared(policy: GuardPolicy) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::new(policy))
    }
}

#[async_trait]
impl PolicyProvider for StaticPolicyProvider {
    async fn load_policy(&self) -> WardenResult<GuardPolicy> {
        Ok(self.policy.clone())
    }
}

// =============================================================================
// FilePolicyProvider
// =============================================================================

/// Provider backed by a configuration file.
#[derive(Debug, Clone)]
pub struct FilePolicyProvider {
    path: PathBuf,
}

impl FilePolicyProvider {
    /// Read policy from the file at `path` on every load.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PolicyProvider for FilePolicyProvider {
    async fn load_policy(&self) -> WardenResult<GuardPolicy> {
        if !self.path.exists() {
            return Err(Report::new(WardenError::Policy(PolicyError::Unavailable(
                format!("no such file: {}", self.path.display()),
            ))));
        }

        let cfg = config::Config::builder()
            .add_source(config::File::from(self.path.as_path()))
            .build()
            .map_err(|e| PolicyError::Parse(e.to_string()))
            .map_err(WardenError::from)
            .map_err(Report::new)?;

        cfg.try_deserialize()
            .map_err(|e| PolicyError::Parse(e.to_string()))
            .map_err(WardenError::from)
            .map_err(Report::new)
    }
}
