//! Value types carried by the channels.
//!
//! Every physical dimension has its own type, so an angle can never be
//! published to a channel that expects a speed. Scalar quantities are the
//! `uom` SI types; composite values are small structs built from them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uom::si::angle::degree;
use uom::si::length::meter;

pub use uom::si::f64::{Angle, AngularVelocity, Length, Velocity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Angle,
    Velocity,
    Length,
    AngularVelocity,
    GeographicPosition,
    TimeStamp,
    AbsoluteOrientation,
    BinaryEdge,
}

/// Implemented by every type that can flow through a channel.
pub trait ChannelValue: Clone + fmt::Debug + 'static {
    const KIND: ValueKind;
}

impl ChannelValue for Angle {
    const KIND: ValueKind = ValueKind::Angle;
}

impl ChannelValue for Velocity {
    const KIND: ValueKind = ValueKind::Velocity;
}

impl ChannelValue for Length {
    const KIND: ValueKind = ValueKind::Length;
}

impl ChannelValue for AngularVelocity {
    const KIND: ValueKind = ValueKind::AngularVelocity;
}

impl ChannelValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::TimeStamp;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicPosition {
    pub lon: Angle,
    pub lat: Angle,
    pub alt: Length,
}

impl GeographicPosition {
    pub fn new(lon: Angle, lat: Angle) -> Self {
        Self::with_altitude(lon, lat, Length::new::<meter>(0.0))
    }

    pub fn with_altitude(lon: Angle, lat: Angle, alt: Length) -> Self {
        Self { lon, lat, alt }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(Angle::new::<degree>(lon_deg), Angle::new::<degree>(lat_deg))
    }
}

impl ChannelValue for GeographicPosition {
    const KIND: ValueKind = ValueKind::GeographicPosition;
}

impl fmt::Display for GeographicPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.6}°, {:.6}°",
            self.lat.get::<degree>(),
            self.lon.get::<degree>()
        )
    }
}

/// Orientation of the device in space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteOrientation {
    pub heading: Angle,
    pub roll: Angle,
    pub pitch: Angle,
}

impl ChannelValue for AbsoluteOrientation {
    const KIND: ValueKind = ValueKind::AbsoluteOrientation;
}

/// Start or end of a period, e.g. a period with a valid GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryEdge {
    ToOn,
    ToOff,
}

impl ChannelValue for BinaryEdge {
    const KIND: ValueKind = ValueKind::BinaryEdge;
}
