use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;
use uom::si::angle::degree;
use uom::si::angular_velocity::degree_per_second;
use uom::si::length::meter;
use uom::si::velocity::knot;

use nmea_hub::channels::{self, TypedChannel};
use nmea_hub::config::SubscriptionConfig;
use nmea_hub::values::{
    AbsoluteOrientation, Angle, AngularVelocity, BinaryEdge, ChannelValue, GeographicPosition,
    Length, Velocity,
};
use nmea_hub::{BufferedChannel, Channel, Hub, HubError, Subscription};

/// How a value reads in the log
trait LogFormat {
    fn log_format(&self) -> String;
}

impl LogFormat for Angle {
    fn log_format(&self) -> String {
        format!("{:.1}°", self.get::<degree>())
    }
}

impl LogFormat for Velocity {
    fn log_format(&self) -> String {
        format!("{:.2} kn", self.get::<knot>())
    }
}

impl LogFormat for Length {
    fn log_format(&self) -> String {
        format!("{:.0} m", self.get::<meter>())
    }
}

impl LogFormat for AngularVelocity {
    fn log_format(&self) -> String {
        format!("{:.2}°/s", self.get::<degree_per_second>())
    }
}

impl LogFormat for GeographicPosition {
    fn log_format(&self) -> String {
        self.to_string()
    }
}

impl LogFormat for DateTime<Utc> {
    fn log_format(&self) -> String {
        self.to_rfc3339()
    }
}

impl LogFormat for AbsoluteOrientation {
    fn log_format(&self) -> String {
        format!(
            "hdg {} roll {} pitch {}",
            self.heading.log_format(),
            self.roll.log_format(),
            self.pitch.log_format()
        )
    }
}

impl LogFormat for BinaryEdge {
    fn log_format(&self) -> String {
        format!("{:?}", self)
    }
}

/// A subscription of any value type
trait ActiveSubscription {
    fn is_listening(&self) -> bool;
}

impl<T: ChannelValue> ActiveSubscription for Subscription<T> {
    fn is_listening(&self) -> bool {
        Subscription::is_listening(self)
    }
}

/// Logs the merged view of selected channels, at most once per interval
/// per channel
pub struct ChannelLogger {
    subscriptions: Vec<Box<dyn ActiveSubscription>>,
    lines: Rc<Cell<u64>>,
}

impl ChannelLogger {
    pub fn new(hub: &Hub, config: &SubscriptionConfig) -> Result<Self, HubError> {
        let mut logger = Self {
            subscriptions: Vec::new(),
            lines: Rc::new(Cell::new(0)),
        };
        let interval = config.log_interval();
        for channel in config.channels()? {
            logger.add(hub, channel, interval);
        }
        Ok(logger)
    }

    pub fn add(&mut self, hub: &Hub, channel: Channel, interval: TimeDelta) {
        match channel {
            Channel::Awa => self.attach(hub, channels::AWA, interval),
            Channel::Aws => self.attach(hub, channels::AWS, interval),
            Channel::Twa => self.attach(hub, channels::TWA, interval),
            Channel::Tws => self.attach(hub, channels::TWS, interval),
            Channel::Twdir => self.attach(hub, channels::TWDIR, interval),
            Channel::GpsSpeed => self.attach(hub, channels::GPS_SPEED, interval),
            Channel::GpsBearing => self.attach(hub, channels::GPS_BEARING, interval),
            Channel::MagHeading => self.attach(hub, channels::MAG_HEADING, interval),
            Channel::WatSpeed => self.attach(hub, channels::WAT_SPEED, interval),
            Channel::WatDist => self.attach(hub, channels::WAT_DIST, interval),
            Channel::GpsPosition => self.attach(hub, channels::GPS_POSITION, interval),
            Channel::DateTime => self.attach(hub, channels::DATE_TIME, interval),
            Channel::TargetVmg => self.attach(hub, channels::TARGET_VMG, interval),
            Channel::Vmg => self.attach(hub, channels::VMG, interval),
            Channel::Orient => self.attach(hub, channels::ORIENT, interval),
            Channel::RudderAngle => self.attach(hub, channels::RUDDER_ANGLE, interval),
            Channel::ValidGps => self.attach(hub, channels::VALID_GPS, interval),
            Channel::RateOfTurn => self.attach(hub, channels::RATE_OF_TURN, interval),
            Channel::TotalWatDist => self.attach(hub, channels::TOTAL_WAT_DIST, interval),
            Channel::EngineRpm => self.attach(hub, channels::ENGINE_RPM, interval),
            Channel::Yaw => self.attach(hub, channels::YAW, interval),
            Channel::Pitch => self.attach(hub, channels::PITCH, interval),
            Channel::Roll => self.attach(hub, channels::ROLL, interval),
        }
    }

    fn attach<T: ChannelValue + LogFormat>(
        &mut self,
        hub: &Hub,
        channel: TypedChannel<T>,
        interval: TimeDelta,
    ) {
        let name = channel.channel().short_name();
        let lines = Rc::clone(&self.lines);
        let log_line = move |values: &BufferedChannel<T>| {
            if let Some(sample) = values.last_sample() {
                info!("[{}] {} at {}", name, sample.value.log_format(), sample.time);
                lines.set(lines.get() + 1);
            }
        };
        let mut subscription = Subscription::with_min_interval(log_line, interval);
        hub.subscribe(channel, &mut subscription);
        self.subscriptions.push(Box::new(subscription));
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.is_listening())
            .count()
    }

    /// Number of values logged so far
    pub fn lines(&self) -> u64 {
        self.lines.get()
    }
}
