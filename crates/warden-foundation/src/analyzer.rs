//! Content screening
//!
//! Three stateless checks against one message, run in a fixed priority
//! order with short-circuit evaluation: length, forbidden keyword, then
//! non-alphanumeric ratio. The first hit wins and later checks are not
//! evaluated, so a message yields at most one [`ContentViolation`].
//!
//! Each check has its own disable switch in the policy: a non-positive
//! length limit, an empty keyword list, or a non-positive threshold
//! turns the corresponding check off.

use warden_kernel::policy::GuardPolicy;
use warden_kernel::verdict::ContentViolation;

/// Run the content checks against `text` under `policy`.
#[must_use]
pub fn screen_message(text: &str, policy: &GuardPolicy) -> Option<ContentViolation> {
    if exceeds_max_length(text, policy.max_prompt_length) {
        return Some(ContentViolation::TooLong {
            max_length: policy.max_prompt_length,
        });
    }
    if contains_forbidden_keyword(text, &policy.jailbreak_keywords) {
        return Some(ContentViolation::ForbiddenKeyword);
    }
    if exceeds_ratio(text, policy.non_alphanumeric_threshold) {
        return Some(ContentViolation::RatioExceeded {
            threshold: policy.non_alphanumeric_threshold,
        });
    }
    None
}

/// Character count strictly above the limit. Non-positive limits
/// disable the check.
fn exceeds_max_length(text: &str, max_length: i64) -> bool {
    if max_length <= 0 {
        return false;
    }
    text.chars().count() as i64 > max_length
}

/// Case-insensitive substring search over the keyword list.
fn contains_forbidden_keyword(text: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// Share of non-alphanumeric characters strictly above the threshold.
/// Non-positive thresholds and empty messages never trigger.
fn exceeds_ratio(text: &str, threshold: f64) -> bool {
    if threshold <= 0.0 || text.is_empty() {
        return false;
    }
    let total = text.chars().count();
    let non_alphanumeric = text.chars().filter(|c| !c.is_alphanumeric()).count();
    (non_alphanumeric as f64 / total as f64) > threshold
}
