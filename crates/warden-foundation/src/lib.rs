//! Warden Foundation
//!
//! Implementations behind the `warden-kernel` contracts: durable stores,
//! the read-through cache, message screening, frequency accounting, the
//! escalation rules, and the [`GuardEngine`] that composes them into one
//! verdict per inbound message.

// store module - durable backends for the user-state document
pub mod store;

// cache module - read-through cache with a staleness bound
pub mod cache;

// analyzer module - content screening checks
pub mod analyzer;

// frequency module - sliding-window accounting
pub mod frequency;

// escalation module - infraction and decay rules
pub mod escalation;

// engine module - the decision orchestrator
pub mod engine;

// policy_provider module - static and file-backed policy sources
pub mod policy_provider;

// Re-export the types most embedders need
pub use cache::StateCache;
pub use engine::{GuardEngine, UserStatus};
pub use policy_provider::{FilePolicyProvider, StaticPolicyProvider};
pub use store::{InMemoryStore, JsonFileStore};
