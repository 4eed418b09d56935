use std::fmt;

use uom::si::angular_velocity::revolution_per_minute;

use nmea_hub::values::AngularVelocity;

use super::u16_at;

/// PGN 127488, Engine Parameters, Rapid Update
#[derive(Debug, Clone)]
pub struct EngineRapidUpdate {
    pub instance: u8,
    pub speed: Option<AngularVelocity>,
}

impl EngineRapidUpdate {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }
        // 0.25 rpm per bit
        let speed = u16_at(data, 1)
            .map(|raw| AngularVelocity::new::<revolution_per_minute>(raw as f64 * 0.25));
        Some(Self {
            instance: data[0],
            speed,
        })
    }
}

impl fmt::Display for EngineRapidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.speed {
            Some(speed) => write!(
                f,
                "Engine {}: {:.0} rpm",
                self.instance,
                speed.get::<revolution_per_minute>()
            ),
            None => write!(f, "Engine {}: N/A", self.instance),
        }
    }
}
