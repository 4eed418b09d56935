use std::fmt;

use nmea_hub::values::Angle;

use super::{angle_1e4, i16_at, write_angle};

/// PGN 127257, Attitude
#[derive(Debug, Clone)]
pub struct Attitude {
    pub yaw: Option<Angle>,
    pub pitch: Option<Angle>,
    pub roll: Option<Angle>,
}

impl Attitude {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 7 {
            return None;
        }
        Some(Self {
            yaw: i16_at(data, 1).map(angle_1e4),
            pitch: i16_at(data, 3).map(angle_1e4),
            roll: i16_at(data, 5).map(angle_1e4),
        })
    }
}

impl fmt::Display for Attitude {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_angle(f, "Yaw", self.yaw)?;
        write!(f, " | ")?;
        write_angle(f, "Pitch", self.pitch)?;
        write!(f, " | ")?;
        write_angle(f, "Roll", self.roll)
    }
}
