//! Infraction escalation and decay rules
//!
//! Pure state-machine pieces the engine applies once it knows whether a
//! message violated a rule: how long to suspend for a content
//! infraction, what the user's next infraction level is, and when an
//! inactive user's level decays back to zero.

use warden_kernel::policy::GuardPolicy;
use warden_kernel::state::UserState;

/// Outcome of a content infraction at a given escalation position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentPenalty {
    /// Suspension length in minutes.
    pub minutes: i64,
    /// Infraction level to persist on the record.
    pub new_level: u32,
}

/// Penalty for a content infraction by a user currently at
/// `current_level`.
///
/// A forbidden-keyword hit first raises the effective level to the
/// configured jailbreak severity when that is higher (it never lowers
/// it). The suspension length is the ladder entry at the effective
/// level, and the persisted level is one past it.
#[must_use]
pub fn content_penalty(policy: &GuardPolicy, current_level: u32, keyword_hit: bool) -> ContentPenalty {
    let mut level = current_level;
    if keyword_hit && policy.jailbreak_severity_level > level {
        level = policy.jailbreak_severity_level;
    }
    ContentPenalty {
        minutes: policy.suspension_minutes_for_level(level),
        new_level: level.saturating_add(1),
    }
}

/// Whether an idle user's infraction level should drop back to zero.
///
/// Reads the raw stored timestamps, so the check sees the user's true
/// last activity even when every entry has aged out of the frequency
/// window. Only meaningful on the no-infraction path; the engine never
/// calls it on a pass that just recorded a violation.
#[must_use]
pub fn should_reset_level(state: &UserState, now: i64, reset_minutes: i64) -> bool {
    if reset_minutes <= 0 || state.infraction_level == 0 {
        return false;
    }
    let last_activity = state.last_activity().unwrap_or(0);
    now - last_activity > reset_minutes * 60
}
