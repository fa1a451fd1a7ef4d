use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" timestamps, injected into the engine so schedulers and
/// tests control time explicitly instead of the engine free-running.
pub trait Clock: Send {
    /// A monotonic timestamp. The origin is arbitrary; only differences
    /// matter.
    fn now(&self) -> Duration;
}

/// Production clock backed by `Instant`.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-cranked clock for tests. Clones share the same underlying time, so
/// a test can keep a handle while the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock().unwrap() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}

/// Tracks elapsed session time from explicit timestamps.
///
/// Observed timestamps are clamped non-decreasing, elapsed time freezes
/// when the controller is stopped, and in time mode the frozen value is
/// clamped to the limit so final metrics line up with the configured
/// duration exactly.
#[derive(Debug)]
pub struct TimingController {
    limit: Option<Duration>,
    started_at: Option<Duration>,
    latest: Duration,
    frozen: Option<Duration>,
}

impl TimingController {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            limit,
            started_at: None,
            latest: Duration::ZERO,
            frozen: None,
        }
    }

    pub fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.latest = now;
        }
    }

    /// Record a timestamp. Non-monotonic inputs clamp to the previous
    /// observation; a stopped controller ignores them.
    pub fn observe(&mut self, now: Duration) {
        if self.started_at.is_some() && self.frozen.is_none() {
            self.latest = self.latest.max(now);
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        match self.started_at {
            Some(started) => self.latest.saturating_sub(started),
            None => Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.limit.map(|l| l.saturating_sub(self.elapsed()))
    }

    pub fn expired(&self) -> bool {
        self.limit.is_some_and(|l| self.elapsed() >= l)
    }

    /// Freeze elapsed time. Idempotent; later observations are ignored.
    pub fn stop(&mut self) {
        if self.frozen.is_none() {
            let mut elapsed = self.elapsed();
            if let Some(limit) = self.limit {
                elapsed = elapsed.min(limit);
            }
            self.frozen = Some(elapsed);
        }
    }
}
