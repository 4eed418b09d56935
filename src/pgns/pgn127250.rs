use std::fmt;

use nmea_hub::values::Angle;

use super::{angle_1e4, i16_at, u16_at, write_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingReference {
    True,
    Magnetic,
    Error,
    Null,
}

/// PGN 127250, Vessel Heading
#[derive(Debug, Clone)]
pub struct VesselHeading {
    pub heading: Option<Angle>,
    pub deviation: Option<Angle>,
    pub variation: Option<Angle>,
    pub reference: HeadingReference,
}

impl VesselHeading {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        Some(Self {
            heading: u16_at(data, 1).map(angle_1e4),
            deviation: i16_at(data, 3).map(angle_1e4),
            variation: i16_at(data, 5).map(angle_1e4),
            reference: match data[7] & 0x03 {
                0 => HeadingReference::True,
                1 => HeadingReference::Magnetic,
                2 => HeadingReference::Error,
                _ => HeadingReference::Null,
            },
        })
    }
}

impl fmt::Display for VesselHeading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_angle(f, "Heading", self.heading)?;
        write!(f, " ({:?})", self.reference)?;
        write!(f, " | ")?;
        write_angle(f, "deviation", self.deviation)?;
        write!(f, " | ")?;
        write_angle(f, "variation", self.variation)
    }
}
