//! Debounced auto-save timer

use std::time::{Duration, Instant};

/// Fires once after edits have been quiet for `delay`
#[derive(Debug, Clone)]
pub struct AutoSave {
    enabled: bool,
    delay: Duration,
    pending_since: Option<Instant>,
}

impl AutoSave {
    pub fn new(enabled: bool, delay: Duration) -> Self {
        Self {
            enabled,
            delay,
            pending_since: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending_since = None;
        }
    }

    /// Restart the quiet period after an edit
    pub fn note_change(&mut self, now: Instant) {
        if self.enabled {
            self.pending_since = Some(now);
        }
    }

    /// Drop any pending save, e.g. after a manual save or a document switch
    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    /// Returns `true` exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if self.enabled && now.duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending save fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let since = self.pending_since?;
        Some(self.delay.saturating_sub(now.duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(2000);

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut timer = AutoSave::new(true, DELAY);
        timer.note_change(start);

        assert!(!timer.poll(start + Duration::from_millis(1999)));
        assert!(timer.poll(start + DELAY));
        assert!(!timer.poll(start + DELAY * 2));
    }

    #[test]
    fn test_edits_restart_the_timer() {
        let start = Instant::now();
        let mut timer = AutoSave::new(true, DELAY);
        timer.note_change(start);
        timer.note_change(start + Duration::from_millis(1500));

        assert!(!timer.poll(start + DELAY));
        assert_eq!(
            timer.remaining(start + DELAY),
            Some(Duration::from_millis(1500))
        );
        assert!(timer.poll(start + Duration::from_millis(3500)));
    }

    #[test]
    fn test_disabled_never_fires() {
        let start = Instant::now();
        let mut timer = AutoSave::new(false, DELAY);
        timer.note_change(start);
        assert!(!timer.poll(start + DELAY * 10));

        timer.set_enabled(true);
        timer.note_change(start);
        timer.set_enabled(false);
        assert!(timer.remaining(start).is_none());
    }

    #[test]
    fn test_cancel_drops_pending_save() {
        let start = Instant::now();
        let mut timer = AutoSave::new(true, DELAY);
        timer.note_change(start);
        timer.cancel();
        assert!(!timer.poll(start + DELAY));
    }
}
