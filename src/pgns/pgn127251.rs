use std::fmt;

use uom::si::angular_velocity::{degree_per_second, radian_per_second};

use nmea_hub::values::AngularVelocity;

use super::i32_at;

/// PGN 127251, Rate of Turn
#[derive(Debug, Clone)]
pub struct RateOfTurn {
    pub rate: Option<AngularVelocity>,
}

impl RateOfTurn {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 5 {
            return None;
        }
        // 3.125e-8 rad/s per bit
        let rate = i32_at(data, 1)
            .map(|raw| AngularVelocity::new::<radian_per_second>(raw as f64 * 3.125e-8));
        Some(Self { rate })
    }
}

impl fmt::Display for RateOfTurn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rate {
            Some(rate) => write!(f, "Rate of turn: {:.3}°/s", rate.get::<degree_per_second>()),
            None => write!(f, "Rate of turn: N/A"),
        }
    }
}
