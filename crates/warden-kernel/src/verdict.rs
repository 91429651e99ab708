//! Screening findings and engine verdicts
//!
//! A [`ContentViolation`] is what the message analyzer reports; a
//! [`GuardVerdict`] is what the engine hands back to the host for every
//! inbound message.

use crate::state::SuspensionReason;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Content violations
// =============================================================================

/// A single triggered content check.
///
/// Checks run in a fixed priority order (length, keyword, ratio) and the
/// first hit wins, so a message yields at most one violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ContentViolation {
    /// The message exceeded the configured character count.
    TooLong {
        /// The limit that was exceeded.
        max_length: i64,
    },
    /// The message contained one of the configured forbidden phrases.
    ForbiddenKeyword,
    /// The share of non-alphanumeric characters exceeded the threshold.
    RatioExceeded {
        /// The configured threshold in `(0, 1]`.
        threshold: f64,
    },
}

impl ContentViolation {
    /// Returns `true` for a forbidden-keyword hit.
    ///
    /// Keyword hits can escalate straight to the configured jailbreak
    /// severity level; the other checks cannot.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::ForbiddenKeyword)
    }
}

impl fmt::Display for ContentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max_length } => {
                write!(f, "exceeded max length of {max_length} characters")
            }
            Self::ForbiddenKeyword => write!(f, "contained a forbidden keyword"),
            Self::RatioExceeded { threshold } => {
                write!(
                    f,
                    "exceeded non-alphanumeric threshold of {}%",
                    threshold * 100.0
                )
            }
        }
    }
}

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of screening one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum GuardVerdict {
    /// Let the message through; the host continues normal processing.
    Allow,
    /// Stop processing and show `message` to the user instead.
    Block {
        /// Which template produced the message.
        reason: SuspensionReason,
        /// Minutes reported to the user. For a fresh infraction this is
        /// the newly imposed duration; for an already-suspended user it
        /// is the remaining time, rounded up.
        minutes: i64,
        /// The rendered user-facing text.
        message: String,
    },
}

impl GuardVerdict {
    /// Returns `true` if the message may pass.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if the message was blocked.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    /// The user-facing text for a blocked message, if any.
    #[must_use]
    pub fn block_message(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Block { message, .. } => Some(message),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
