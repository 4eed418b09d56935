use std::fmt;

use chrono::{DateTime, Utc};

use super::{date_time_at, i16_at};

/// PGN 129033, Time & Date
#[derive(Debug, Clone)]
pub struct TimeDate {
    pub date_time: Option<DateTime<Utc>>,
    /// Local offset in minutes
    pub local_offset: Option<i16>,
}

impl TimeDate {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        Some(Self {
            date_time: date_time_at(data, 0),
            local_offset: i16_at(data, 6),
        })
    }
}

impl fmt::Display for TimeDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.date_time {
            Some(time) => write!(f, "Time: {}", time.to_rfc3339())?,
            None => write!(f, "Time: N/A")?,
        }
        if let Some(offset) = self.local_offset {
            write!(f, " (local offset {} min)", offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_and_offset() {
        // 2015-03-06T04:56:12, UTC+1
        let data = [0x74, 0x40, 0xC0, 0xCA, 0x97, 0x0A, 0x3C, 0x00];
        let time = TimeDate::from_bytes(&data).unwrap();
        assert_eq!(time.date_time.unwrap().to_rfc3339(), "2015-03-06T04:56:12+00:00");
        assert_eq!(time.local_offset, Some(60));
    }
}
