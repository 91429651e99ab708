//! Guard policy: tunables, defaults, and validation
//!
//! [`GuardPolicy`] carries every knob the engine consults while screening
//! a message. All fields have serde defaults so a partially specified
//! configuration file deserializes into a complete, working policy.
//!
//! [`GuardPolicy::validate`] reports configurations that deserialize fine
//! but cannot behave the way the operator probably intended (an empty
//! suspension ladder, a threshold above 1.0, a zero-width window). The
//! engine logs these findings once at construction and falls back to
//! documented floors at runtime instead of failing requests.

use crate::error::WardenResult;
use crate::state::SuspensionReason;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suspension minutes used when the content ladder is configured empty.
pub const FALLBACK_SUSPENSION_MINUTES: i64 = 5;

// =============================================================================
// Policy
// =============================================================================

/// Tunables for message screening, frequency limiting, and escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardPolicy {
    /// Master switch. When off every message is allowed untouched.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum messages a user may send inside one window.
    #[serde(default = "default_max_messages")]
    pub rate_limit_max_messages: usize,

    /// Width of the sliding frequency window, in minutes.
    #[serde(default = "default_window_minutes")]
    pub rate_limit_window_minutes: i64,

    /// Fixed suspension length for frequency violations, in minutes.
    #[serde(default = "default_rate_limit_suspension_minutes")]
    pub rate_limit_suspension_minutes: i64,

    /// Maximum message length in characters. Zero or negative disables
    /// the check.
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: i64,

    /// Case-insensitive phrases that trigger a content infraction when
    /// found anywhere in a message.
    #[serde(default = "default_jailbreak_keywords")]
    pub jailbreak_keywords: Vec<String>,

    /// Block messages whose non-alphanumeric character share strictly
    /// exceeds this ratio. Zero or negative disables the check.
    #[serde(default = "default_non_alphanumeric_threshold")]
    pub non_alphanumeric_threshold: f64,

    /// Progressive suspension durations for content infractions, in
    /// minutes, indexed by infraction level. The last entry repeats for
    /// all later levels.
    #[serde(default = "default_suspension_ladder")]
    pub content_infraction_suspensions_minutes: Vec<i64>,

    /// Infraction level assigned immediately on a forbidden-keyword hit,
    /// when higher than the user's current level.
    #[serde(default = "default_jailbreak_severity")]
    pub jailbreak_severity_level: u32,

    /// Minutes of inactivity after which a user's infraction level drops
    /// back to 0. Zero or negative disables the decay.
    #[serde(default = "default_infraction_reset_minutes")]
    pub infraction_reset_minutes: i64,

    /// Template shown for content suspensions. `{minutes}` is replaced
    /// with the suspension or remaining time.
    #[serde(default = "default_blocked_message")]
    pub user_blocked_message: String,

    /// Template shown for rate-limit suspensions. `{minutes}` is
    /// replaced with the suspension or remaining time.
    #[serde(default = "default_limited_message")]
    pub user_limited_message: String,
}

fn default_enabled() -> bool {
    true
}

fn default_max_messages() -> usize {
    30
}

fn default_window_minutes() -> i64 {
    60
}

fn default_rate_limit_suspension_minutes() -> i64 {
    30
}

fn default_max_prompt_length() -> i64 {
    500
}

fn default_jailbreak_keywords() -> Vec<String> {
    [
        "ignore your instructions",
        "pretend to be",
        "act as if",
        "developer mode",
        "reply as",
        "you are without restrictions",
        "without censorship",
        "you have no limits",
        "you have no rules",
        "DAN",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_non_alphanumeric_threshold() -> f64 {
    0.4
}

fn default_suspension_ladder() -> Vec<i64> {
    vec![5, 15, 60]
}

fn default_jailbreak_severity() -> u32 {
    2
}

fn default_infraction_reset_minutes() -> i64 {
    60
}

fn default_blocked_message() -> String {
    "Your account has been temporarily suspended for {minutes} minutes due to a content policy violation."
        .to_string()
}

fn default_limited_message() -> String {
    "You have sent too many messages. Please wait {minutes} minutes before sending new messages."
        .to_string()
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            rate_limit_max_messages: default_max_messages(),
            rate_limit_window_minutes: default_window_minutes(),
            rate_limit_suspension_minutes: default_rate_limit_suspension_minutes(),
            max_prompt_length: default_max_prompt_length(),
            jailbreak_keywords: default_jailbreak_keywords(),
            non_alphanumeric_threshold: default_non_alphanumeric_threshold(),
            content_infraction_suspensions_minutes: default_suspension_ladder(),
            jailbreak_severity_level: default_jailbreak_severity(),
            infraction_reset_minutes: default_infraction_reset_minutes(),
            user_blocked_message: default_blocked_message(),
            user_limited_message: default_limited_message(),
        }
    }
}

impl GuardPolicy {
    /// Width of the sliding frequency window, in seconds.
    #[must_use]
    pub fn window_seconds(&self) -> i64 {
        self.rate_limit_window_minutes * 60
    }

    /// Suspension length for a content infraction at `level`.
    ///
    /// Indexes the ladder, repeating the last entry for levels past the
    /// end. An empty ladder yields [`FALLBACK_SUSPENSION_MINUTES`];
    /// [`GuardPolicy::validate`] reports that case so it can be flagged
    /// once at startup.
    #[must_use]
    pub fn suspension_minutes_for_level(&self, level: u32) -> i64 {
        let ladder = &self.content_infraction_suspensions_minutes;
        match ladder.get(level as usize) {
            Some(minutes) => *minutes,
            None => ladder.last().copied().unwrap_or(FALLBACK_SUSPENSION_MINUTES),
        }
    }

    /// Renders the user-facing block message for `reason`, substituting
    /// `{minutes}`.
    #[must_use]
    pub fn render_block_message(&self, reason: SuspensionReason, minutes: i64) -> String {
        let template = match reason {
            SuspensionReason::Content => &self.user_blocked_message,
            SuspensionReason::RateLimit => &self.user_limited_message,
        };
        template.replace("{minutes}", &minutes.to_string())
    }

    /// Checks the policy for configurations that silently disable or
    /// distort screening. Returns one finding per problem; an empty list
    /// means the policy is sound.
    #[must_use]
    pub fn validate(&self) -> Vec<PolicyFinding> {
        let mut findings = Vec::new();

        if self.content_infraction_suspensions_minutes.is_empty() {
            findings.push(PolicyFinding::EmptySuspensionLadder);
        }
        if self.non_alphanumeric_threshold > 1.0 || self.non_alphanumeric_threshold < 0.0 {
            findings.push(PolicyFinding::ThresholdOutOfRange(
                self.non_alphanumeric_threshold,
            ));
        }
        if self.rate_limit_window_minutes <= 0 {
            findings.push(PolicyFinding::NonPositiveWindow(
                self.rate_limit_window_minutes,
            ));
        }
        if self.rate_limit_max_messages == 0 {
            findings.push(PolicyFinding::ZeroMessageCeiling);
        }
        if !self.user_blocked_message.contains("{minutes}") {
            findings.push(PolicyFinding::TemplateMissingPlaceholder {
                field: "user_blocked_message",
            });
        }
        if !self.user_limited_message.contains("{minutes}") {
            findings.push(PolicyFinding::TemplateMissingPlaceholder {
                field: "user_limited_message",
            });
        }

        findings
    }
}

// =============================================================================
// Validation findings
// =============================================================================

/// A policy value that deserialized fine but cannot do what the operator
/// probably intended.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PolicyFinding {
    /// No content suspension durations configured; the fallback floor of
    /// [`FALLBACK_SUSPENSION_MINUTES`] minutes applies to every content
    /// infraction.
    #[error(
        "content_infraction_suspensions_minutes is empty; \
         falling back to {FALLBACK_SUSPENSION_MINUTES} minute(s) per content infraction"
    )]
    EmptySuspensionLadder,

    /// Threshold outside `[0, 1]`; above 1.0 the ratio check can never
    /// trigger.
    #[error("non_alphanumeric_threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),

    /// A zero or negative window empties itself instantly, so the
    /// frequency ceiling can never be reached.
    #[error("rate_limit_window_minutes {0} disables frequency accounting")]
    NonPositiveWindow(i64),

    /// A ceiling of zero rate-limits every message that passes the
    /// content checks.
    #[error("rate_limit_max_messages is 0; every message will be rate-limited")]
    ZeroMessageCeiling,

    /// A block template without `{minutes}` renders without the wait
    /// time.
    #[error("{field} does not contain the {{minutes}} placeholder")]
    TemplateMissingPlaceholder {
        /// Name of the offending template field.
        field: &'static str,
    },
}

// =============================================================================
// Policy source errors
// =============================================================================

/// Errors from loading or parsing a guard policy.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolicyError {
    /// The policy source could not be reached or read.
    #[error("Policy source unavailable: {0}")]
    Unavailable(String),

    /// The policy source was read but did not parse.
    #[error("Policy parse error: {0}")]
    Parse(String),
}

// =============================================================================
// PolicyProvider
// =============================================================================

/// Source of the current [`GuardPolicy`].
///
/// The engine asks the provider for a fresh policy on every decision, so
/// providers backed by files pick up edits without a restart. A provider
/// failure makes the engine fail open: the message is allowed and the
/// failure is logged.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    /// Produce the current policy.
    async fn load_policy(&self) -> WardenResult<GuardPolicy>;
}

// =============================================================================
// Tests
// =============================================================================
