use std::time::{Duration, Instant};

/// Time source used to pace trajectory streaming.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock with blocking sleeps.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(feature = "mock")]
pub use manual::ManualClock;

#[cfg(feature = "mock")]
mod manual {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Inner {
        now: Duration,
        sleeps: Vec<Duration>,
    }

    /// Simulated clock: time only moves when someone sleeps. Clones share one timeline.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        inner: Arc<Mutex<Inner>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every sleep requested so far, in order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.inner.lock().sleeps.clone()
        }

        pub fn advance(&self, by: Duration) {
            self.inner.lock().now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            self.inner.lock().now
        }

        fn sleep(&self, duration: Duration) {
            let mut inner = self.inner.lock();
            inner.now += duration;
            inner.sleeps.push(duration);
        }
    }
}
