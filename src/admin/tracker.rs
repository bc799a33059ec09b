//! Recently-saved row markers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::draft::{RowStatus, StatusLabel};

/// How long a row reads as saved after a successful write.
pub const SAVED_INDICATOR: Duration = Duration::from_secs(2);

/// Remembers which rows were saved recently, shared across requests.
#[derive(Debug, Clone)]
pub struct SaveTracker {
    saved: Arc<DashMap<String, Instant>>,
    window: Duration,
}

impl Default for SaveTracker {
    fn default() -> Self {
        Self::new(SAVED_INDICATOR)
    }
}

impl SaveTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            saved: Arc::new(DashMap::new()),
            window,
        }
    }

    /// Mark a row as saved at `now`, returning when the marker lapses.
    ///
    /// Lapsed markers of other rows are dropped on the way.
    pub fn mark_saved(&self, id: &str, now: Instant) -> Instant {
        self.saved.retain(|_, until| *until > now);

        let until = now + self.window;
        self.saved.insert(id.to_string(), until);
        until
    }

    /// Status of a row at `now`. Lapsed markers are dropped.
    pub fn status(&self, id: &str, now: Instant) -> StatusLabel {
        let label = match self.saved.get(id) {
            Some(until) => RowStatus::SavedUntil(*until).at(now),
            None => return StatusLabel::Neutral,
        };

        if label == StatusLabel::Neutral {
            self.saved.remove_if(id, |_, until| *until <= now);
        }
        label
    }
}
