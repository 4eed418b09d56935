use std::fmt;

use nmea_hub::values::Velocity;

use super::{u16_at, velocity_1e2, write_speed};

/// PGN 128259, Speed, Water Referenced
#[derive(Debug, Clone)]
pub struct SpeedWaterReferenced {
    pub water: Option<Velocity>,
    pub ground: Option<Velocity>,
}

impl SpeedWaterReferenced {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }
        Some(Self {
            water: u16_at(data, 1).map(velocity_1e2),
            ground: u16_at(data, 3).map(velocity_1e2),
        })
    }
}

impl fmt::Display for SpeedWaterReferenced {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_speed(f, "Speed through water", self.water)?;
        write!(f, " | ")?;
        write_speed(f, "over ground", self.ground)
    }
}
