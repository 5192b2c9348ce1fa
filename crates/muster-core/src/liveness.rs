//! Responsiveness classification
//!
//! "Online" is structural: a session currently bound to a live connection.
//! "Responsive" is a weaker, query-time notion derived from the recency of
//! the last status report versus the polling window. It is a function of
//! wall-clock time, so it is recomputed on every query and never stored.

use std::time::Duration;

/// Default polling window: an agent reporting within this interval is
/// considered responsive.
pub const DEFAULT_POLL_WINDOW: Duration = Duration::from_secs(60);

/// Query-time classification of an agent's report recency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Responsiveness {
    /// Last report arrived within the polling window
    Responsive,
    /// No report within the polling window
    Unresponsive,
}

impl Responsiveness {
    /// Classify a session from its last-seen timestamp.
    ///
    /// Both timestamps are Unix milliseconds. A `last_seen` in the future
    /// (clock skew between queries) classifies as responsive.
    pub fn classify(last_seen_ms: u64, now_ms: u64, window: Duration) -> Self {
        if now_ms.saturating_sub(last_seen_ms) < window.as_millis() as u64 {
            Responsiveness::Responsive
        } else {
            Responsiveness::Unresponsive
        }
    }

    /// True if this classification is `Responsive`
    pub fn is_responsive(&self) -> bool {
        matches!(self, Responsiveness::Responsive)
    }
}
