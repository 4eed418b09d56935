use std::cell::Cell;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of "now" for the hub and its channels.
///
/// Injecting the clock lets a recorded session drive the whole graph
/// deterministically.
pub trait Clock {
    fn current_time(&self) -> DateTime<Utc>;
}

/// Wall clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used for replay and in tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        self.now.set(time);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn current_time(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let clock = ManualClock::default();
        assert_eq!(clock.current_time(), DateTime::UNIX_EPOCH);

        clock.advance(TimeDelta::milliseconds(1500));
        assert_eq!(clock.current_time().timestamp_millis(), 1500);

        let later = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.current_time(), later);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.current_time();
        assert!(now > DateTime::from_timestamp(1_600_000_000, 0).unwrap());
    }
}
