//! Sliding-window frequency accounting
//!
//! Pure helpers over a user's message timestamps. A timestamp is inside
//! the window while `now - t < window_seconds`; an entry exactly at the
//! boundary has aged out. The filtered window is what gets carried
//! forward into the persisted record, so expired entries disappear the
//! next time the record is written.

/// Timestamps still inside the window, in their original order.
#[must_use]
pub fn within_window(timestamps: &[i64], now: i64, window_seconds: i64) -> Vec<i64> {
    timestamps
        .iter()
        .copied()
        .filter(|&t| now - t < window_seconds)
        .collect()
}

/// Whether the window has reached the configured ceiling.
#[must_use]
pub fn at_capacity(window: &[i64], max_messages: usize) -> bool {
    window.len() >= max_messages
}
