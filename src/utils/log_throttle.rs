use std::time::{Duration, Instant};

/// Rate limits a repeating log line, e.g. the same watch failure reported on
/// every backoff retry during an API server outage.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    window_started_at: Option<Instant>,
    suppressed: u64,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            window_started_at: None,
            suppressed: 0,
        }
    }

    /// Returns `Some(suppressed_count)` when the log should be emitted,
    /// otherwise `None` and the event is counted as suppressed for the active window.
    pub fn should_emit(&mut self) -> Option<u64> {
        self.should_emit_at(Instant::now())
    }

    fn should_emit_at(&mut self, now: Instant) -> Option<u64> {
        match self.window_started_at {
            Some(started) if now.duration_since(started) < self.interval => {
                self.suppressed += 1;
                None
            }
            _ => {
                let suppressed = self.suppressed;
                self.window_started_at = Some(now);
                self.suppressed = 0;
                Some(suppressed)
            }
        }
    }

    /// Forgets the current window so the next failure after a recovery is
    /// reported immediately.
    pub fn reset(&mut self) {
        self.window_started_at = None;
        self.suppressed = 0;
    }
}
