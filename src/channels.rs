//! The catalogue of channels the hub knows about.
//!
//! [`Channel`] is the untyped identity of a channel: a stable code, a short
//! name and a description. [`TypedChannel`] ties a channel to the value type
//! it carries, and the constants at the bottom of this module are the only
//! way to obtain one, so a channel and its value type can never disagree.

use std::fmt;
use std::marker::PhantomData;

use crate::error::HubError;
use crate::values::{
    AbsoluteOrientation, Angle, AngularVelocity, BinaryEdge, ChannelValue, GeographicPosition,
    Length, ValueKind, Velocity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Channel {
    Awa = 1,
    Aws = 2,
    Twa = 3,
    Tws = 4,
    Twdir = 5,
    GpsSpeed = 6,
    GpsBearing = 7,
    MagHeading = 8,
    WatSpeed = 9,
    WatDist = 10,
    GpsPosition = 11,
    DateTime = 12,
    TargetVmg = 13,
    Vmg = 14,
    Orient = 15,
    RudderAngle = 16,
    ValidGps = 17,
    RateOfTurn = 18,
    TotalWatDist = 19,
    EngineRpm = 20,
    Yaw = 21,
    Pitch = 22,
    Roll = 23,
}

impl Channel {
    pub const ALL: [Channel; 23] = [
        Channel::Awa,
        Channel::Aws,
        Channel::Twa,
        Channel::Tws,
        Channel::Twdir,
        Channel::GpsSpeed,
        Channel::GpsBearing,
        Channel::MagHeading,
        Channel::WatSpeed,
        Channel::WatDist,
        Channel::GpsPosition,
        Channel::DateTime,
        Channel::TargetVmg,
        Channel::Vmg,
        Channel::Orient,
        Channel::RudderAngle,
        Channel::ValidGps,
        Channel::RateOfTurn,
        Channel::TotalWatDist,
        Channel::EngineRpm,
        Channel::Yaw,
        Channel::Pitch,
        Channel::Roll,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, HubError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(HubError::UnknownChannelCode(code))
    }

    /// Look a channel up by its short name
    pub fn from_short_name(name: &str) -> Result<Self, HubError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.short_name() == name)
            .ok_or_else(|| HubError::UnknownChannelName(name.to_string()))
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Channel::Awa => "awa",
            Channel::Aws => "aws",
            Channel::Twa => "twa",
            Channel::Tws => "tws",
            Channel::Twdir => "twdir",
            Channel::GpsSpeed => "gpsSpeed",
            Channel::GpsBearing => "gpsBearing",
            Channel::MagHeading => "magHdg",
            Channel::WatSpeed => "watSpeed",
            Channel::WatDist => "watDist",
            Channel::GpsPosition => "pos",
            Channel::DateTime => "dateTime",
            Channel::TargetVmg => "targetVmg",
            Channel::Vmg => "vmg",
            Channel::Orient => "orient",
            Channel::RudderAngle => "rudderAngle",
            Channel::ValidGps => "validGps",
            Channel::RateOfTurn => "rot",
            Channel::TotalWatDist => "totDist",
            Channel::EngineRpm => "rpm",
            Channel::Yaw => "yaw",
            Channel::Pitch => "pitch",
            Channel::Roll => "roll",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Channel::Awa => "Apparent wind angle",
            Channel::Aws => "Apparent wind speed",
            Channel::Twa => "True wind angle",
            Channel::Tws => "True wind speed",
            Channel::Twdir => "True wind direction",
            Channel::GpsSpeed => "GPS speed over ground",
            Channel::GpsBearing => "GPS bearing",
            Channel::MagHeading => "Magnetic heading",
            Channel::WatSpeed => "Water speed",
            Channel::WatDist => "Distance over water",
            Channel::GpsPosition => "GPS position",
            Channel::DateTime => "GPS date and time",
            Channel::TargetVmg => "Target VMG",
            Channel::Vmg => "VMG",
            Channel::Orient => "Absolute orientation",
            Channel::RudderAngle => "Rudder angle",
            Channel::ValidGps => "Valid GPS periods",
            Channel::RateOfTurn => "Rate of turn",
            Channel::TotalWatDist => "Total distance over water",
            Channel::EngineRpm => "Engine revolutions",
            Channel::Yaw => "Yaw",
            Channel::Pitch => "Pitch",
            Channel::Roll => "Roll",
        }
    }

    /// The kind of value published to this channel
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Channel::Awa
            | Channel::Twa
            | Channel::Twdir
            | Channel::GpsBearing
            | Channel::MagHeading
            | Channel::RudderAngle
            | Channel::Yaw
            | Channel::Pitch
            | Channel::Roll => ValueKind::Angle,
            Channel::Aws
            | Channel::Tws
            | Channel::GpsSpeed
            | Channel::WatSpeed
            | Channel::TargetVmg
            | Channel::Vmg => ValueKind::Velocity,
            Channel::WatDist | Channel::TotalWatDist => ValueKind::Length,
            Channel::GpsPosition => ValueKind::GeographicPosition,
            Channel::DateTime => ValueKind::TimeStamp,
            Channel::Orient => ValueKind::AbsoluteOrientation,
            Channel::ValidGps => ValueKind::BinaryEdge,
            Channel::RateOfTurn | Channel::EngineRpm => ValueKind::AngularVelocity,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A channel together with the type of the values it carries
pub struct TypedChannel<T> {
    channel: Channel,
    _value: PhantomData<fn() -> T>,
}

impl<T> TypedChannel<T> {
    const fn new(channel: Channel) -> Self {
        Self {
            channel,
            _value: PhantomData,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

impl<T> Clone for TypedChannel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedChannel<T> {}

impl<T> fmt::Debug for TypedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TypedChannel({})", self.channel)
    }
}

impl<T> From<TypedChannel<T>> for Channel {
    fn from(typed: TypedChannel<T>) -> Self {
        typed.channel
    }
}

impl<T: ChannelValue> TypedChannel<T> {
    pub fn value_kind(&self) -> ValueKind {
        T::KIND
    }
}

pub const AWA: TypedChannel<Angle> = TypedChannel::new(Channel::Awa);
pub const AWS: TypedChannel<Velocity> = TypedChannel::new(Channel::Aws);
pub const TWA: TypedChannel<Angle> = TypedChannel::new(Channel::Twa);
pub const TWS: TypedChannel<Velocity> = TypedChannel::new(Channel::Tws);
pub const TWDIR: TypedChannel<Angle> = TypedChannel::new(Channel::Twdir);
pub const GPS_SPEED: TypedChannel<Velocity> = TypedChannel::new(Channel::GpsSpeed);
pub const GPS_BEARING: TypedChannel<Angle> = TypedChannel::new(Channel::GpsBearing);
pub const MAG_HEADING: TypedChannel<Angle> = TypedChannel::new(Channel::MagHeading);
pub const WAT_SPEED: TypedChannel<Velocity> = TypedChannel::new(Channel::WatSpeed);
pub const WAT_DIST: TypedChannel<Length> = TypedChannel::new(Channel::WatDist);
pub const GPS_POSITION: TypedChannel<GeographicPosition> =
    TypedChannel::new(Channel::GpsPosition);
pub const DATE_TIME: TypedChannel<chrono::DateTime<chrono::Utc>> =
    TypedChannel::new(Channel::DateTime);
pub const TARGET_VMG: TypedChannel<Velocity> = TypedChannel::new(Channel::TargetVmg);
pub const VMG: TypedChannel<Velocity> = TypedChannel::new(Channel::Vmg);
pub const ORIENT: TypedChannel<AbsoluteOrientation> = TypedChannel::new(Channel::Orient);
pub const RUDDER_ANGLE: TypedChannel<Angle> = TypedChannel::new(Channel::RudderAngle);
pub const VALID_GPS: TypedChannel<BinaryEdge> = TypedChannel::new(Channel::ValidGps);
pub const RATE_OF_TURN: TypedChannel<AngularVelocity> = TypedChannel::new(Channel::RateOfTurn);
pub const TOTAL_WAT_DIST: TypedChannel<Length> = TypedChannel::new(Channel::TotalWatDist);
pub const ENGINE_RPM: TypedChannel<AngularVelocity> = TypedChannel::new(Channel::EngineRpm);
pub const YAW: TypedChannel<Angle> = TypedChannel::new(Channel::Yaw);
pub const PITCH: TypedChannel<Angle> = TypedChannel::new(Channel::Pitch);
pub const ROLL: TypedChannel<Angle> = TypedChannel::new(Channel::Roll);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_code(channel.code()).unwrap(), channel);
        }
        assert!(matches!(
            Channel::from_code(0),
            Err(HubError::UnknownChannelCode(0))
        ));
        assert!(matches!(
            Channel::from_code(24),
            Err(HubError::UnknownChannelCode(24))
        ));
    }

    #[test]
    fn test_codes_and_names_are_unique() {
        let codes: HashSet<u8> = Channel::ALL.iter().map(|c| c.code()).collect();
        let names: HashSet<&str> = Channel::ALL.iter().map(|c| c.short_name()).collect();
        assert_eq!(codes.len(), Channel::ALL.len());
        assert_eq!(names.len(), Channel::ALL.len());
    }

    #[test]
    fn test_short_names() {
        assert_eq!(Channel::Awa.short_name(), "awa");
        assert_eq!(Channel::MagHeading.to_string(), "magHdg");
        assert_eq!(Channel::from_short_name("pos").unwrap(), Channel::GpsPosition);
        assert_eq!(Channel::from_short_name("rpm").unwrap(), Channel::EngineRpm);
        assert!(matches!(
            Channel::from_short_name("nope"),
            Err(HubError::UnknownChannelName(_))
        ));
    }

    #[test]
    fn test_typed_channels_match_channel_kind() {
        let typed: [(Channel, ValueKind); 23] = [
            (AWA.channel(), AWA.value_kind()),
            (AWS.channel(), AWS.value_kind()),
            (TWA.channel(), TWA.value_kind()),
            (TWS.channel(), TWS.value_kind()),
            (TWDIR.channel(), TWDIR.value_kind()),
            (GPS_SPEED.channel(), GPS_SPEED.value_kind()),
            (GPS_BEARING.channel(), GPS_BEARING.value_kind()),
            (MAG_HEADING.channel(), MAG_HEADING.value_kind()),
            (WAT_SPEED.channel(), WAT_SPEED.value_kind()),
            (WAT_DIST.channel(), WAT_DIST.value_kind()),
            (GPS_POSITION.channel(), GPS_POSITION.value_kind()),
            (DATE_TIME.channel(), DATE_TIME.value_kind()),
            (TARGET_VMG.channel(), TARGET_VMG.value_kind()),
            (VMG.channel(), VMG.value_kind()),
            (ORIENT.channel(), ORIENT.value_kind()),
            (RUDDER_ANGLE.channel(), RUDDER_ANGLE.value_kind()),
            (VALID_GPS.channel(), VALID_GPS.value_kind()),
            (RATE_OF_TURN.channel(), RATE_OF_TURN.value_kind()),
            (TOTAL_WAT_DIST.channel(), TOTAL_WAT_DIST.value_kind()),
            (ENGINE_RPM.channel(), ENGINE_RPM.value_kind()),
            (YAW.channel(), YAW.value_kind()),
            (PITCH.channel(), PITCH.value_kind()),
            (ROLL.channel(), ROLL.value_kind()),
        ];

        let covered: HashSet<Channel> = typed.iter().map(|(c, _)| *c).collect();
        assert_eq!(covered.len(), Channel::ALL.len());
        for (channel, kind) in typed {
            assert_eq!(channel.value_kind(), kind, "{channel}");
        }
    }
}
