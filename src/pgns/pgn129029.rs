use std::fmt;

use chrono::{DateTime, Utc};
use uom::si::angle::degree;
use uom::si::length::meter;

use nmea_hub::values::{Angle, GeographicPosition, Length};

use super::{date_time_at, i16_at, i64_at};

/// PGN 129029, GNSS Position Data
#[derive(Debug, Clone)]
pub struct GnssPositionData {
    pub date_time: Option<DateTime<Utc>>,
    pub position: Option<GeographicPosition>,
    pub num_svs: u8,
    pub hdop: Option<f64>,
}

impl GnssPositionData {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 43 {
            return None;
        }
        // 1e-16 degrees and 1e-6 m per bit
        let degrees = |raw: i64| Angle::new::<degree>(raw as f64 * 1e-16);
        let position = match (i64_at(data, 7), i64_at(data, 15), i64_at(data, 23)) {
            (Some(lat), Some(lon), Some(alt)) => Some(GeographicPosition::with_altitude(
                degrees(lon),
                degrees(lat),
                Length::new::<meter>(alt as f64 * 1e-6),
            )),
            _ => None,
        };
        Some(Self {
            date_time: date_time_at(data, 1),
            position,
            num_svs: data[33],
            hdop: i16_at(data, 34).map(|raw| raw as f64 * 0.01),
        })
    }
}

impl fmt::Display for GnssPositionData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "GNSS: {}", position)?,
            None => write!(f, "GNSS: N/A")?,
        }
        write!(f, " | sats: {}", self.num_svs)?;
        if let Some(hdop) = self.hdop {
            write!(f, " | HDOP: {:.2}", hdop)?;
        }
        Ok(())
    }
}
