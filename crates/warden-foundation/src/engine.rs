//! The guard decision engine
//!
//! [`GuardEngine`] screens one inbound message at a time: active
//! suspension first, then the content checks, then frequency
//! accounting, then one write-back of the user's updated record. The
//! whole read-modify-write runs under a single decision lock because
//! the store persists the document wholesale; two concurrent decisions
//! would otherwise lose one user's update.
//!
//! Failure policy: a policy source failure lets the message through
//! untouched, a state load failure evaluates against empty state, and a
//! state save failure keeps the verdict but loses durability for that
//! write. Only the policy source can change a decision outcome.

use crate::analyzer;
use crate::cache::StateCache;
use crate::escalation;
use crate::frequency;
use error_stack::Report;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use warden_kernel::clock::Clock;
use warden_kernel::error::{WardenError, WardenResult};
use warden_kernel::policy::PolicyProvider;
use warden_kernel::state::{Suspension, SuspensionReason};
use warden_kernel::verdict::GuardVerdict;

/// Per-message abuse-prevention engine.
pub struct GuardEngine {
    provider: Arc<dyn PolicyProvider>,
    cache: StateCache,
    clock: Arc<dyn Clock>,
    decision_lock: Mutex<()>,
}

impl GuardEngine {
    /// Build an engine over a policy source, a state cache, and a
    /// clock.
    ///
    /// The policy is loaded once here so misconfigurations are reported
    /// loudly at startup rather than on every message; runtime lookups
    /// then apply documented fallbacks silently.
    pub async fn new(
        provider: Arc<dyn PolicyProvider>,
        cache: StateCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        match provider.load_policy().await {
            Ok(policy) => {
                for finding in policy.validate() {
                    warn!("Guard policy finding: {finding}");
                }
            }
            Err(e) => {
                error!(
                    "Could not load guard policy at startup: {e:?}. \
                     Messages will be allowed until a policy loads."
                );
            }
        }

        Self {
            provider,
            cache,
            clock,
            decision_lock: Mutex::new(()),
        }
    }

    /// Screen one inbound message from `user_id`.
    ///
    /// Never fails: every internal error degrades to the documented
    /// fallback and the caller always receives a verdict.
    pub async fn check_message(&self, user_id: &str, text: &str) -> GuardVerdict {
        let policy = match self.provider.load_policy().await {
            Ok(policy) => policy,
            Err(e) => {
                error!("Could not load guard policy: {e:?}. Letting message through.");
                return GuardVerdict::Allow;
            }
        };
        if !policy.enabled {
            return GuardVerdict::Allow;
        }

        let _guard = self.decision_lock.lock().await;
        let now = self.clock.now_ts();

        let mut all = self.cache.get(false).await;
        let mut user = all.get(user_id).cloned().unwrap_or_default();

        // A standing suspension preempts everything and touches nothing.
        if let Some(suspension) = user.suspension {
            if suspension.is_active(now) {
                let minutes = suspension.remaining_minutes(now);
                let message = policy.render_block_message(suspension.reason, minutes);
                return GuardVerdict::Block {
                    reason: suspension.reason,
                    minutes,
                    message,
                };
            }
            // Expired on this pass: clear it and evaluate normally.
            user.suspension = None;
        }

        let violation = analyzer::screen_message(text, &policy);
        let mut window =
            frequency::within_window(&user.message_timestamps, now, policy.window_seconds());
        let frequency_hit =
            violation.is_none() && frequency::at_capacity(&window, policy.rate_limit_max_messages);

        if violation.is_some() || frequency_hit {
            let (reason, block_minutes, reason_text) = match violation {
                Some(violation) => {
                    let penalty = escalation::content_penalty(
                        &policy,
                        user.infraction_level,
                        violation.is_keyword(),
                    );
                    user.infraction_level = penalty.new_level;
                    (
                        SuspensionReason::Content,
                        penalty.minutes,
                        violation.to_string(),
                    )
                }
                None => (
                    SuspensionReason::RateLimit,
                    policy.rate_limit_suspension_minutes,
                    format!(
                        "exceeded frequency limit of {} messages per {} minute(s)",
                        policy.rate_limit_max_messages, policy.rate_limit_window_minutes
                    ),
                ),
            };
            warn!("User {} blocked. Reason: {}.", user_id, reason_text);

            user.suspension = Some(Suspension {
                until: now + block_minutes * 60,
                reason,
            });
            // The refused message still occupies a slot in the window.
            window.push(now);
            user.message_timestamps = window;

            all.insert(user_id.to_string(), user);
            if let Err(e) = self.cache.commit(all).await {
                error!("Could not save user state: {e}");
            }

            let message = policy.render_block_message(reason, block_minutes);
            return GuardVerdict::Block {
                reason,
                minutes: block_minutes,
                message,
            };
        }

        // No infraction. Decay the level first; the check reads the raw
        // stored timestamps, not the filtered window.
        if escalation::should_reset_level(&user, now, policy.infraction_reset_minutes) {
            info!(
                "User {} has been inactive. Content infraction level reset.",
                user_id
            );
            user.infraction_level = 0;
        }

        window.push(now);
        user.message_timestamps = window;
        user.total_messages += 1;
        let total_messages = user.total_messages;
        let in_window = user.message_timestamps.len();

        all.insert(user_id.to_string(), user);
        if let Err(e) = self.cache.commit(all).await {
            error!("Could not save user state: {e}");
        }

        info!(
            "Valid message from user {} recorded. Total messages: {}. Current count in window: {}/{}.",
            user_id, total_messages, in_window, policy.rate_limit_max_messages
        );
        GuardVerdict::Allow
    }

    /// Current standing of one user, without recording anything.
    ///
    /// Returns `Ok(None)` for users the engine has never seen. An
    /// expired-but-uncleaned suspension is reported as no suspension.
    pub async fn user_status(&self, user_id: &str) -> WardenResult<Option<UserStatus>> {
        let policy = self.provider.load_policy().await?;
        let now = self.clock.now_ts();

        let all = self.cache.get(false).await;
        let Some(state) = all.get(user_id) else {
            return Ok(None);
        };

        let suspension = state.active_suspension(now);
        let in_window =
            frequency::within_window(&state.message_timestamps, now, policy.window_seconds()).len();

        Ok(Some(UserStatus {
            user_id: user_id.to_string(),
            total_messages: state.total_messages,
            infraction_level: state.infraction_level,
            messages_in_window: in_window,
            window_limit: policy.rate_limit_max_messages,
            suspension,
            remaining_minutes: suspension.map(|s| s.remaining_minutes(now)),
        }))
    }

    /// Remove a user's record entirely (operator action).
    ///
    /// Returns `true` if a record existed. Lifts any suspension and
    /// forgets the escalation history.
    pub async fn reset_user(&self, user_id: &str) -> WardenResult<bool> {
        let _guard = self.decision_lock.lock().await;

        let mut all = self.cache.get(true).await;
        if all.remove(user_id).is_none() {
            return Ok(false);
        }
        self.cache
            .commit(all)
            .await
            .map_err(WardenError::from)
            .map_err(Report::new)?;

        info!("User {} state reset by operator.", user_id);
        Ok(true)
    }

    /// Drop records of users idle for longer than `min_idle_secs`.
    ///
    /// Records with an active suspension or a non-zero infraction level
    /// are kept regardless of idle time, so escalation history cannot be
    /// shed by going quiet. Returns the number of records removed.
    pub async fn prune_inactive(&self, min_idle_secs: i64) -> WardenResult<usize> {
        let _guard = self.decision_lock.lock().await;
        let now = self.clock.now_ts();

        let mut all = self.cache.get(true).await;
        let before = all.len();
        all.retain(|_, state| {
            now - state.last_activity().unwrap_or(0) <= min_idle_secs
                || state.infraction_level > 0
                || state.active_suspension(now).is_some()
        });
        let removed = before - all.len();

        if removed > 0 {
            self.cache
                .commit(all)
                .await
                .map_err(WardenError::from)
                .map_err(Report::new)?;
            info!("Pruned {} dormant user record(s).", removed);
        }
        Ok(removed)
    }
}

/// Snapshot of one user's standing, as reported by
/// [`GuardEngine::user_status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatus {
    /// The user identifier the snapshot describes.
    pub user_id: String,
    /// Lifetime accepted messages.
    pub total_messages: u64,
    /// Current escalation position.
    pub infraction_level: u32,
    /// Messages inside the frequency window right now.
    pub messages_in_window: usize,
    /// The configured window ceiling.
    pub window_limit: usize,
    /// The active suspension, if one is in force.
    pub suspension: Option<Suspension>,
    /// Minutes left on the active suspension, rounded up.
    pub remaining_minutes: Option<i64>,
}
