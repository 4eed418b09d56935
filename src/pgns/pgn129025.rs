use std::fmt;

use uom::si::angle::degree;

use nmea_hub::values::{Angle, GeographicPosition};

use super::i32_at;

/// PGN 129025, Position, Rapid Update
#[derive(Debug, Clone)]
pub struct PositionRapidUpdate {
    pub position: Option<GeographicPosition>,
}

impl PositionRapidUpdate {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        // 1e-7 degrees per bit
        let degrees = |raw: i32| Angle::new::<degree>(raw as f64 * 1e-7);
        let position = i32_at(data, 0)
            .zip(i32_at(data, 4))
            .map(|(lat, lon)| GeographicPosition::new(degrees(lon), degrees(lat)));
        Some(Self { position })
    }
}

impl fmt::Display for PositionRapidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "Position: {}", position),
            None => write!(f, "Position: N/A"),
        }
    }
}
