use std::fmt;

use chrono::{DateTime, Utc};

use super::date_time_at;

/// PGN 126992, System Time
#[derive(Debug, Clone)]
pub struct SystemTime {
    pub source: u8,
    pub date_time: Option<DateTime<Utc>>,
}

impl SystemTime {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        Some(Self {
            source: data[1] & 0x0F,
            date_time: date_time_at(data, 2),
        })
    }
}

impl fmt::Display for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.date_time {
            Some(time) => write!(f, "System time: {} (source {})", time.to_rfc3339(), self.source),
            None => write!(f, "System time: N/A (source {})", self.source),
        }
    }
}
