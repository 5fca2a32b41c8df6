use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now", measured from an arbitrary fixed origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Simulated time. Clones share one timeline, so a test can keep a handle
/// and advance the clock it gave away.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to an absolute time, backwards included.
    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("clock already started")]
    AlreadyStarted,
}

/// Elapsed-time accumulator with a binary running flag.
pub struct Clock {
    source: Box<dyn TimeSource>,
    started_at: Option<Duration>,
    high_water: Cell<f64>,
}

impl Clock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            started_at: None,
            high_water: Cell::new(0.0),
        }
    }

    /// A clock that is already running.
    pub fn started(source: impl TimeSource + 'static) -> Self {
        let mut clock = Self::new(source);
        clock.started_at = Some(clock.source.now());
        clock
    }

    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.started_at.is_some() {
            return Err(ClockError::AlreadyStarted);
        }
        self.started_at = Some(self.source.now());
        tracing::debug!("clock started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Seconds since [`Clock::start`]; `0.0` before it.
    ///
    /// Never smaller than a previously returned value, even if the source
    /// goes backwards.
    pub fn elapsed_seconds(&self) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        let now = self.source.now().saturating_sub(start).as_secs_f64();
        let elapsed = now.max(self.high_water.get());
        self.high_water.set(elapsed);
        elapsed
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("running", &self.is_running())
            .field("high_water", &self.high_water.get())
            .finish()
    }
}
