//! Channel and source addressed value hub for marine instrument data.
//!
//! Decoded samples are published to a [`Hub`] under a [`channels::TypedChannel`]
//! and the name of the source that produced them. Consumers read the bounded
//! history of a channel through a [`BufferedChannel`] or attach a
//! [`Subscription`] to be called back on every new value.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use nmea_hub::{channels, BufferedChannel, Hub, HubConfig, ManualClock, Subscription};
//! use nmea_hub::values::Angle;
//! use uom::si::angle::degree;
//!
//! let hub = Hub::new(Rc::new(ManualClock::default()), HubConfig::default());
//! let mut sub = Subscription::new(|awa: &BufferedChannel<Angle>| {
//!     println!("AWA {:?}", awa.last_value());
//! });
//! hub.subscribe(channels::AWA, &mut sub);
//!
//! hub.publish_value(channels::AWA, "NMEA2000/12", Angle::new::<degree>(35.0));
//! assert_eq!(hub.get(channels::AWA).unwrap().len(), 1);
//! ```

pub mod buffered_channel;
pub mod channels;
pub mod clock;
pub mod config;
pub mod error;
pub mod hub;
pub mod subscription;
pub mod timed_sample;
pub mod values;

pub use buffered_channel::BufferedChannel;
pub use channels::{Channel, TypedChannel};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, HubConfig};
pub use error::HubError;
pub use hub::{ChannelInfo, EventListenerId, Hub, HubEvent};
pub use subscription::{Listener, Subscription};
pub use timed_sample::TimedSample;
