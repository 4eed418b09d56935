use chrono::{DateTime, Utc};

/// A value and the time it was observed
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSample<T> {
    pub time: DateTime<Utc>,
    pub value: T,
}

impl<T> TimedSample<T> {
    pub fn new(time: DateTime<Utc>, value: T) -> Self {
        Self { time, value }
    }

    /// Absolute distance in milliseconds between this sample and `time`
    pub fn distance_ms(&self, time: DateTime<Utc>) -> i64 {
        (self.time - time).num_milliseconds().abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        let t0 = DateTime::from_timestamp_millis(10_000).unwrap();
        let sample = TimedSample::new(t0, 1.0);
        assert_eq!(sample.distance_ms(DateTime::from_timestamp_millis(9_250).unwrap()), 750);
        assert_eq!(sample.distance_ms(DateTime::from_timestamp_millis(10_750).unwrap()), 750);
        assert_eq!(sample.distance_ms(t0), 0);
    }
}
