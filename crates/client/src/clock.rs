//! Millisecond clock used to stamp locally created messages.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Source of epoch-millisecond timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock that never goes backwards.
///
/// If the system time steps back, the last returned value is repeated until
/// the wall clock catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        now.max(previous)
    }
}

/// Clock driven by hand, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(ms: i64) -> Self {
        Self {
            now: AtomicI64::new(ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::default();
        let mut previous = clock.now_ms();
        for _ in 0..1000 {
            let now = clock.now_ms();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn system_clock_holds_value_when_wall_clock_lags() {
        let clock = SystemClock::default();
        let future = Utc::now().timestamp_millis() + 60_000;
        clock.last.store(future, Ordering::SeqCst);
        assert_eq!(clock.now_ms(), future);
    }
}
