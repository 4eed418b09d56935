use std::fmt;

use uom::si::length::{meter, nautical_mile};

use nmea_hub::values::Length;

use super::u32_at;

/// PGN 128275, Distance Log
#[derive(Debug, Clone)]
pub struct DistanceLog {
    pub log: Option<Length>,
    pub trip: Option<Length>,
}

impl DistanceLog {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 14 {
            return None;
        }
        let metres = |raw: u32| Length::new::<meter>(raw as f64);
        Some(Self {
            log: u32_at(data, 6).map(metres),
            trip: u32_at(data, 10).map(metres),
        })
    }
}

impl fmt::Display for DistanceLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let nm = |length: Option<Length>| length.map(|l| l.get::<nautical_mile>());
        match (nm(self.log), nm(self.trip)) {
            (Some(log), Some(trip)) => write!(f, "Log: {:.2} NM | Trip: {:.2} NM", log, trip),
            (Some(log), None) => write!(f, "Log: {:.2} NM | Trip: N/A", log),
            (None, Some(trip)) => write!(f, "Log: N/A | Trip: {:.2} NM", trip),
            (None, None) => write!(f, "Log: N/A | Trip: N/A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_log_and_trip() {
        let mut data = vec![0x74, 0x40, 0xC0, 0xCA, 0x97, 0x0A];
        data.extend_from_slice(&1852u32.to_le_bytes());
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        let log = DistanceLog::from_bytes(&data).unwrap();

        assert_abs_diff_eq!(log.log.unwrap().get::<nautical_mile>(), 1.0, epsilon = 1e-9);
        assert!(log.trip.is_none());
        assert_eq!(log.to_string(), "Log: 1.00 NM | Trip: N/A");
        assert!(DistanceLog::from_bytes(&data[..10]).is_none());
    }
}
