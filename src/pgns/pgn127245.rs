use std::fmt;

use nmea_hub::values::Angle;

use super::{angle_1e4, i16_at, write_angle};

/// PGN 127245, Rudder
#[derive(Debug, Clone)]
pub struct Rudder {
    pub instance: u8,
    pub angle_order: Option<Angle>,
    pub position: Option<Angle>,
}

impl Rudder {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 6 {
            return None;
        }
        Some(Self {
            instance: data[0],
            angle_order: i16_at(data, 2).map(angle_1e4),
            position: i16_at(data, 4).map(angle_1e4),
        })
    }
}

impl fmt::Display for Rudder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rudder {} ", self.instance)?;
        write_angle(f, "position", self.position)?;
        write!(f, " | ")?;
        write_angle(f, "order", self.angle_order)
    }
}
