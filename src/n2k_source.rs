use std::rc::Rc;

use tracing::trace;

use n2k_transport::AssembledPacket;
use nmea_hub::Hub;
use nmea_hub::channels::{self, TypedChannel};
use nmea_hub::values::ChannelValue;

use crate::pgns::{HeadingReference, N2kMessage, WindReference};

/// Decodes NMEA2000 packets and publishes their values to the hub.
///
/// Every device on the bus is a separate source named `NMEA2000/<address>`.
pub struct Nmea2000Source {
    hub: Rc<Hub>,
}

impl Nmea2000Source {
    pub fn new(hub: Rc<Hub>) -> Self {
        Self { hub }
    }

    pub fn source_name(address: u8) -> String {
        format!("NMEA2000/{}", address)
    }

    /// Decode `packet` and publish what it carries.
    ///
    /// # Returns
    /// The number of values published
    pub fn process(&self, packet: &AssembledPacket) -> usize {
        let message = N2kMessage::from_pgn(packet.pgn, &packet.data);
        trace!("PGN {} from {}: {}", packet.pgn, packet.source, message);

        let mut publisher = Publisher {
            hub: &self.hub,
            source: Self::source_name(packet.source),
            count: 0,
        };
        match message {
            N2kMessage::SystemTime(m) => publisher.publish(channels::DATE_TIME, m.date_time),
            N2kMessage::Rudder(m) => publisher.publish(channels::RUDDER_ANGLE, m.position),
            N2kMessage::VesselHeading(m) => match m.reference {
                HeadingReference::True => publisher.publish(channels::GPS_BEARING, m.heading),
                HeadingReference::Magnetic => publisher.publish(channels::MAG_HEADING, m.heading),
                _ => {}
            },
            N2kMessage::RateOfTurn(m) => publisher.publish(channels::RATE_OF_TURN, m.rate),
            N2kMessage::Attitude(m) => {
                publisher.publish(channels::YAW, m.yaw);
                publisher.publish(channels::PITCH, m.pitch);
                publisher.publish(channels::ROLL, m.roll);
            }
            N2kMessage::EngineRapidUpdate(m) => publisher.publish(channels::ENGINE_RPM, m.speed),
            N2kMessage::SpeedWaterReferenced(m) => publisher.publish(channels::WAT_SPEED, m.water),
            N2kMessage::DistanceLog(m) => {
                publisher.publish(channels::TOTAL_WAT_DIST, m.log);
                publisher.publish(channels::WAT_DIST, m.trip);
            }
            N2kMessage::PositionRapidUpdate(m) => {
                publisher.publish(channels::GPS_POSITION, m.position)
            }
            N2kMessage::CogSogRapidUpdate(m) => {
                if m.reference == HeadingReference::True {
                    publisher.publish(channels::GPS_BEARING, m.cog);
                }
                publisher.publish(channels::GPS_SPEED, m.sog);
            }
            N2kMessage::GnssPositionData(m) => {
                publisher.publish(channels::DATE_TIME, m.date_time);
                publisher.publish(channels::GPS_POSITION, m.position);
            }
            N2kMessage::TimeDate(m) => publisher.publish(channels::DATE_TIME, m.date_time),
            N2kMessage::WindData(m) => match m.reference {
                WindReference::Apparent => {
                    publisher.publish(channels::AWA, m.angle);
                    publisher.publish(channels::AWS, m.speed);
                }
                WindReference::TrueGroundNorth => {
                    publisher.publish(channels::TWA, m.angle);
                    publisher.publish(channels::TWS, m.speed);
                }
                _ => {}
            },
            N2kMessage::Unknown(_) => {}
        }
        publisher.count
    }
}

struct Publisher<'a> {
    hub: &'a Hub,
    source: String,
    count: usize,
}

impl Publisher<'_> {
    fn publish<T: ChannelValue>(&mut self, channel: TypedChannel<T>, value: Option<T>) {
        if let Some(value) = value {
            self.hub.publish_value(channel, &self.source, value);
            self.count += 1;
        }
    }
}
