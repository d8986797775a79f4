//! Per-context auto-save timer.
//!
//! Each open context owns one timer; the host event loop drives all of them
//! through [`crate::ContextStackManager::pump`]. Ownership ties teardown to
//! context destruction: popping a context drops its timer, so a stale timer
//! can never keep writing to the store for an engine that no longer exists.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct AutoSaveTimer {
    interval: Duration,
    next_due: Instant,
}

impl AutoSaveTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once per elapsed interval; rearms itself relative to `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now >= self.next_due {
            self.next_due = now + self.interval;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = AutoSaveTimer::new(Duration::from_secs(5), start);

        assert!(!timer.due(start));
        assert!(!timer.due(start + Duration::from_secs(4)));
        assert!(timer.due(start + Duration::from_secs(5)));
        // rearmed: not due again until another interval passes
        assert!(!timer.due(start + Duration::from_secs(6)));
        assert!(timer.due(start + Duration::from_secs(10)));
    }
}
