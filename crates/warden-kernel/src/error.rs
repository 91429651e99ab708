//! Crate-level error types for `warden-kernel`.
//!
//! Provides a unified [`WardenError`] that composes errors from every
//! sub-module (storage, policy, IO, serialization) together with
//! [`error_stack::Report`] for rich, context-carrying error propagation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use warden_kernel::error::{WardenError, WardenResult};
//! use error_stack::ResultExt;
//!
//! fn read_policy_file() -> WardenResult<String> {
//!     // Errors from sub-modules convert automatically via From impls.
//!     // Attach extra context with .change_context() / .attach().
//!     let raw = std::fs::read_to_string("guard.toml")
//!         .map_err(WardenError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach("loading guard.toml")?;
//!     Ok(raw)
//! }
//! ```

use crate::policy::PolicyError;
use crate::storage::StoreError;
use thiserror::Error;

/// Crate-level error type for `warden-kernel`.
///
/// Wraps each sub-module's typed error via `#[from]` so that the `?`
/// operator converts them automatically. Use
/// [`error_stack::Report<WardenError>`] (via [`WardenResult`]) to attach
/// human-readable context as the error propagates up the call stack.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WardenError {
    /// An error from the state store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An error from the policy source.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// A low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal / untyped error described by a message string.
    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias using [`error_stack::Report`].
///
/// Equivalent to `Result<T, error_stack::Report<WardenError>>`.
pub type WardenResult<T> = Result<T, error_stack::Report<WardenError>>;
