//! Typed decoders for the PGNs the hub understands.
//!
//! Every decoder reads little endian fields and maps the all-ones (or max
//! positive) raw value to `None`, which is how NMEA2000 marks a field as not
//! available.

pub mod message;
pub mod pgn126992;
pub mod pgn127245;
pub mod pgn127250;
pub mod pgn127251;
pub mod pgn127257;
pub mod pgn127488;
pub mod pgn128259;
pub mod pgn128275;
pub mod pgn129025;
pub mod pgn129026;
pub mod pgn129029;
pub mod pgn129033;
pub mod pgn130306;

pub use message::N2kMessage;
pub use pgn127250::HeadingReference;
pub use pgn130306::WindReference;

use chrono::{DateTime, Utc};
use uom::si::angle::{degree, radian};
use uom::si::velocity::{knot, meter_per_second};

use nmea_hub::values::{Angle, Velocity};

pub(crate) fn u16_at(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?.try_into().ok()?;
    Some(u16::from_le_bytes(bytes)).filter(|v| *v != u16::MAX)
}

pub(crate) fn i16_at(data: &[u8], at: usize) -> Option<i16> {
    let bytes = data.get(at..at + 2)?.try_into().ok()?;
    Some(i16::from_le_bytes(bytes)).filter(|v| *v != i16::MAX)
}

pub(crate) fn u32_at(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes)).filter(|v| *v != u32::MAX)
}

pub(crate) fn i32_at(data: &[u8], at: usize) -> Option<i32> {
    let bytes = data.get(at..at + 4)?.try_into().ok()?;
    Some(i32::from_le_bytes(bytes)).filter(|v| *v != i32::MAX)
}

pub(crate) fn i64_at(data: &[u8], at: usize) -> Option<i64> {
    let bytes = data.get(at..at + 8)?.try_into().ok()?;
    Some(i64::from_le_bytes(bytes)).filter(|v| *v != i64::MAX)
}

/// Angle in units of 0.0001 rad
pub(crate) fn angle_1e4<R: Into<f64>>(raw: R) -> Angle {
    Angle::new::<radian>(raw.into() * 0.0001)
}

/// Speed in units of 0.01 m/s
pub(crate) fn velocity_1e2(raw: u16) -> Velocity {
    Velocity::new::<meter_per_second>(raw as f64 * 0.01)
}

/// Date as days since 1970-01-01 at `at`, followed by the time of day in
/// units of 0.0001 s
pub(crate) fn date_time_at(data: &[u8], at: usize) -> Option<DateTime<Utc>> {
    let days = u16_at(data, at)?;
    let time = u32_at(data, at + 2)?;
    let secs = i64::from(days) * 86_400 + i64::from(time / 10_000);
    let nanos = (time % 10_000) * 100_000;
    DateTime::from_timestamp(secs, nanos)
}

pub(crate) fn write_angle(
    f: &mut std::fmt::Formatter,
    label: &str,
    angle: Option<Angle>,
) -> std::fmt::Result {
    match angle {
        Some(angle) => write!(f, "{}: {:.2}°", label, angle.get::<degree>()),
        None => write!(f, "{}: N/A", label),
    }
}

pub(crate) fn write_speed(
    f: &mut std::fmt::Formatter,
    label: &str,
    speed: Option<Velocity>,
) -> std::fmt::Result {
    match speed {
        Some(speed) => write!(f, "{}: {:.2} kn", label, speed.get::<knot>()),
        None => write!(f, "{}: N/A", label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_available_fields() {
        assert_eq!(u16_at(&[0xFF, 0xFF], 0), None);
        assert_eq!(i16_at(&[0xFF, 0x7F], 0), None);
        assert_eq!(i16_at(&[0x18, 0xFC], 0), Some(-1000));
        assert_eq!(u32_at(&[0x01, 0x02], 0), None);
    }

    #[test]
    fn test_date_time() {
        // 16500 days, 17772 s after midnight
        let data = [0x74, 0x40, 0xC0, 0xCA, 0x97, 0x0A];
        let time = date_time_at(&data, 0).unwrap();
        assert_eq!(time.to_rfc3339(), "2015-03-06T04:56:12+00:00");
        assert_eq!(date_time_at(&[0xFF, 0xFF, 0, 0, 0, 0], 0), None);
    }
}
