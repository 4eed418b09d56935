use std::fmt;

use nmea_hub::values::{Angle, Velocity};

use super::{HeadingReference, angle_1e4, u16_at, velocity_1e2, write_angle, write_speed};

/// PGN 129026, COG & SOG, Rapid Update
#[derive(Debug, Clone)]
pub struct CogSogRapidUpdate {
    pub reference: HeadingReference,
    pub cog: Option<Angle>,
    pub sog: Option<Velocity>,
}

impl CogSogRapidUpdate {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            reference: match data[1] & 0x03 {
                0 => HeadingReference::True,
                1 => HeadingReference::Magnetic,
                2 => HeadingReference::Error,
                _ => HeadingReference::Null,
            },
            cog: u16_at(data, 2).map(angle_1e4),
            sog: u16_at(data, 4).map(velocity_1e2),
        })
    }
}

impl fmt::Display for CogSogRapidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_angle(f, "COG", self.cog)?;
        write!(f, " ({:?}) | ", self.reference)?;
        write_speed(f, "SOG", self.sog)
    }
}
