//! Warden Testing Framework
//!
//! Provides harnesses and failure-injection doubles for exercising the
//! guard engine end to end, without touching real storage locations or
//! wall-clock time.

pub mod store;

pub use harness::GuardHarness;
pub use store::FlakyStore;
