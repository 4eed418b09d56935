use std::fmt;

use nmea_hub::values::{Angle, Velocity};

use super::{angle_1e4, u16_at, velocity_1e2, write_angle, write_speed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindReference {
    TrueGroundNorth,
    Magnetic,
    Apparent,
    TrueBoat,
    TrueWater,
}

/// PGN 130306, Wind Data
#[derive(Debug, Clone)]
pub struct WindData {
    pub speed: Option<Velocity>,
    pub angle: Option<Angle>,
    pub reference: WindReference,
}

impl WindData {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            speed: u16_at(data, 1).map(velocity_1e2),
            angle: u16_at(data, 3).map(angle_1e4),
            reference: match data[5] & 0x07 {
                0 => WindReference::TrueGroundNorth,
                1 => WindReference::Magnetic,
                2 => WindReference::Apparent,
                3 => WindReference::TrueBoat,
                4 => WindReference::TrueWater,
                _ => return None,
            },
        })
    }
}

impl fmt::Display for WindData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_speed(f, "Wind speed", self.speed)?;
        write!(f, " | ")?;
        write_angle(f, "angle", self.angle)?;
        write!(f, " | Ref: {:?}", self.reference)
    }
}
