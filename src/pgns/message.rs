use std::fmt;

use super::pgn126992::SystemTime;
use super::pgn127245::Rudder;
use super::pgn127250::VesselHeading;
use super::pgn127251::RateOfTurn;
use super::pgn127257::Attitude;
use super::pgn127488::EngineRapidUpdate;
use super::pgn128259::SpeedWaterReferenced;
use super::pgn128275::DistanceLog;
use super::pgn129025::PositionRapidUpdate;
use super::pgn129026::CogSogRapidUpdate;
use super::pgn129029::GnssPositionData;
use super::pgn129033::TimeDate;
use super::pgn130306::WindData;

// Any decoded message
#[derive(Debug, Clone)]
pub enum N2kMessage {
    SystemTime(SystemTime),
    Rudder(Rudder),
    VesselHeading(VesselHeading),
    RateOfTurn(RateOfTurn),
    Attitude(Attitude),
    EngineRapidUpdate(EngineRapidUpdate),
    SpeedWaterReferenced(SpeedWaterReferenced),
    DistanceLog(DistanceLog),
    PositionRapidUpdate(PositionRapidUpdate),
    CogSogRapidUpdate(CogSogRapidUpdate),
    GnssPositionData(GnssPositionData),
    TimeDate(TimeDate),
    WindData(WindData),
    /// A PGN without decoder, or a payload too short for its decoder
    Unknown(u32),
}

impl N2kMessage {
    pub fn from_pgn(pgn: u32, data: &[u8]) -> Self {
        let message = match pgn {
            126992 => SystemTime::from_bytes(data).map(N2kMessage::SystemTime),
            127245 => Rudder::from_bytes(data).map(N2kMessage::Rudder),
            127250 => VesselHeading::from_bytes(data).map(N2kMessage::VesselHeading),
            127251 => RateOfTurn::from_bytes(data).map(N2kMessage::RateOfTurn),
            127257 => Attitude::from_bytes(data).map(N2kMessage::Attitude),
            127488 => EngineRapidUpdate::from_bytes(data).map(N2kMessage::EngineRapidUpdate),
            128259 => SpeedWaterReferenced::from_bytes(data).map(N2kMessage::SpeedWaterReferenced),
            128275 => DistanceLog::from_bytes(data).map(N2kMessage::DistanceLog),
            129025 => PositionRapidUpdate::from_bytes(data).map(N2kMessage::PositionRapidUpdate),
            129026 => CogSogRapidUpdate::from_bytes(data).map(N2kMessage::CogSogRapidUpdate),
            129029 => GnssPositionData::from_bytes(data).map(N2kMessage::GnssPositionData),
            129033 => TimeDate::from_bytes(data).map(N2kMessage::TimeDate),
            130306 => WindData::from_bytes(data).map(N2kMessage::WindData),
            _ => None,
        };
        message.unwrap_or(N2kMessage::Unknown(pgn))
    }
}

impl fmt::Display for N2kMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            N2kMessage::SystemTime(m) => m.fmt(f),
            N2kMessage::Rudder(m) => m.fmt(f),
            N2kMessage::VesselHeading(m) => m.fmt(f),
            N2kMessage::RateOfTurn(m) => m.fmt(f),
            N2kMessage::Attitude(m) => m.fmt(f),
            N2kMessage::EngineRapidUpdate(m) => m.fmt(f),
            N2kMessage::SpeedWaterReferenced(m) => m.fmt(f),
            N2kMessage::DistanceLog(m) => m.fmt(f),
            N2kMessage::PositionRapidUpdate(m) => m.fmt(f),
            N2kMessage::CogSogRapidUpdate(m) => m.fmt(f),
            N2kMessage::GnssPositionData(m) => m.fmt(f),
            N2kMessage::TimeDate(m) => m.fmt(f),
            N2kMessage::WindData(m) => m.fmt(f),
            N2kMessage::Unknown(pgn) => write!(f, "Unknown PGN {}", pgn),
        }
    }
}
