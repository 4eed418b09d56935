use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use n2k_transport::ReassemblyStats;

/// Counters for the replay pipeline, from dump lines to published values
pub struct AppMetrics {
    /// Number of CAN frames read from the dump
    pub can_frames: u64,
    /// Number of complete NMEA2000 packets
    pub packets: u64,
    /// Number of values published to the hub
    pub published_values: u64,
    /// Number of dump lines that could not be parsed
    pub dump_errors: u64,
}

impl AppMetrics {
    /// Create a new AppMetrics instance with all counters at zero
    pub fn new() -> Self {
        Self {
            can_frames: 0,
            packets: 0,
            published_values: 0,
            dump_errors: 0,
        }
    }

    /// Reset all counters to zero
    pub fn reset(&mut self) {
        self.can_frames = 0;
        self.packets = 0;
        self.published_values = 0;
        self.dump_errors = 0;
    }

    /// Log current metrics together with the reassembly table counters
    pub fn log(&self, reassembly: &ReassemblyStats) {
        info!(
            "[Metrics] CAN frames: {}, packets: {}, values: {}, dump errors: {} | fast packets: completed {}, pending {}, evicted {}, late duplicates {}",
            self.can_frames,
            self.packets,
            self.published_values,
            self.dump_errors,
            reassembly.completed,
            reassembly.pending,
            reassembly.evicted,
            reassembly.duplicates_ignored
        );
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic logging of application metrics, paced by hub time so a replay
/// logs at the rate the data was recorded
pub struct MetricsLogger {
    last_log: Option<DateTime<Utc>>,
    log_interval: TimeDelta,
}

impl MetricsLogger {
    pub fn new(log_interval: TimeDelta) -> Self {
        Self {
            last_log: None,
            log_interval,
        }
    }

    /// Check if it's time to log metrics, and if so, log them and reset
    /// Returns true if metrics were logged
    pub fn check_and_log(
        &mut self,
        now: DateTime<Utc>,
        metrics: &mut AppMetrics,
        reassembly: &ReassemblyStats,
    ) -> bool {
        let Some(last_log) = self.last_log else {
            self.last_log = Some(now);
            return false;
        };
        if now - last_log >= self.log_interval {
            metrics.log(reassembly);
            metrics.reset();
            self.last_log = Some(now);
            true
        } else {
            false
        }
    }
}
