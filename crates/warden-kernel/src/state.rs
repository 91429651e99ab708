//! Per-user guard state
//!
//! Defines the durable record kept for every user the engine has seen:
//! recent message timestamps, lifetime totals, the content infraction
//! level, and an optional active suspension.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The full persisted document: user identifier -> per-user state.
///
/// Loaded wholesale from the store, mutated for exactly one user per
/// decision, and written back wholesale.
pub type AllUserState = HashMap<String, UserState>;

// =============================================================================
// Suspension
// =============================================================================

/// Why a user is currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionReason {
    /// A content rule was violated (length, forbidden keyword, or
    /// character-ratio check).
    Content,
    /// Too many messages inside the sliding window.
    RateLimit,
}

impl fmt::Display for SuspensionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::RateLimit => write!(f, "rate_limit"),
        }
    }
}

/// An active (or expired but not yet cleaned up) suspension.
///
/// The deadline and the reason travel together so a record can never
/// hold one without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
    /// Epoch seconds at which the suspension ends.
    pub until: i64,
    /// What triggered the suspension.
    pub reason: SuspensionReason,
}

impl Suspension {
    /// Returns `true` while the deadline lies in the future.
    ///
    /// At `now == until` the suspension is already over.
    #[must_use]
    pub fn is_active(&self, now: i64) -> bool {
        now < self.until
    }

    /// Minutes left until the suspension ends, rounded up.
    ///
    /// Returns 0 once the suspension has expired.
    #[must_use]
    pub fn remaining_minutes(&self, now: i64) -> i64 {
        if !self.is_active(now) {
            return 0;
        }
        ((self.until - now) as u64).div_ceil(60) as i64
    }
}

// =============================================================================
// UserState
// =============================================================================

/// Durable per-user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Epoch seconds of recent messages, appended in non-decreasing
    /// order. Entries older than the frequency window are dropped when
    /// the record is next written; they are never re-sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_timestamps: Vec<i64>,

    /// Lifetime count of accepted messages. Blocked messages do not
    /// count.
    #[serde(default)]
    pub total_messages: u64,

    /// Escalation position for content infractions. Starts at 0,
    /// raised on every content infraction, reset to 0 after a period
    /// of inactivity. Rate-limit infractions never touch it.
    #[serde(default)]
    pub infraction_level: u32,

    /// Active suspension, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension: Option<Suspension>,
}

impl UserState {
    /// Epoch seconds of the most recently recorded message, if any.
    #[must_use]
    pub fn last_activity(&self) -> Option<i64> {
        self.message_timestamps.last().copied()
    }

    /// Returns the suspension only while it is still in force.
    #[must_use]
    pub fn active_suspension(&self, now: i64) -> Option<Suspension> {
        self.suspension.filter(|s| s.is_active(now))
    }
}

// =============================================================================
// Tests
// =============================================================================
