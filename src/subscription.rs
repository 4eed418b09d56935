//! Consumers of channel updates.
//!
//! A [`Subscription`] owns a [`Listener`] and is attached to at most one
//! [`BufferedChannel`] at a time. Dropping the subscription detaches it, so a
//! listener can never be called after its handle is gone.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use crate::buffered_channel::{BufferedChannel, ChannelCore};
use crate::values::ChannelValue;

/// Receives a callback each time a new value is recorded on the channel it
/// listens to. Implemented for every `FnMut(&BufferedChannel<T>)`.
pub trait Listener<T> {
    fn on_new_value(&mut self, channel: &BufferedChannel<T>);
}

impl<T, F> Listener<T> for F
where
    F: FnMut(&BufferedChannel<T>),
{
    fn on_new_value(&mut self, channel: &BufferedChannel<T>) {
        self(channel)
    }
}

/// The part of a subscription shared with the channel it is attached to
pub(crate) struct ListenerSlot<T> {
    listener: RefCell<Box<dyn Listener<T>>>,
    min_interval: TimeDelta,
    last_notified: Cell<Option<DateTime<Utc>>>,
}

impl<T> ListenerSlot<T> {
    /// Deliver a notification unless the rate limit suppresses it
    pub(crate) fn notify(&self, channel: &BufferedChannel<T>, now: DateTime<Utc>) {
        if let Some(last) = self.last_notified.get()
            && now - last < self.min_interval
        {
            trace!("Notification suppressed, last delivered at {}", last);
            return;
        }
        // A listener that publishes to its own channel is not re-entered
        let Ok(mut listener) = self.listener.try_borrow_mut() else {
            return;
        };
        self.last_notified.set(Some(now));
        listener.on_new_value(channel);
    }
}

pub struct Subscription<T: ChannelValue> {
    slot: Rc<ListenerSlot<T>>,
    channel: Option<Weak<ChannelCore<T>>>,
}

impl<T: ChannelValue> Subscription<T> {
    /// A subscription notified on every new value
    pub fn new(listener: impl Listener<T> + 'static) -> Self {
        Self::with_min_interval(listener, TimeDelta::zero())
    }

    /// A subscription notified at most once every `min_interval`
    pub fn with_min_interval(
        listener: impl Listener<T> + 'static,
        min_interval: TimeDelta,
    ) -> Self {
        Self {
            slot: Rc::new(ListenerSlot {
                listener: RefCell::new(Box::new(listener)),
                min_interval,
                last_notified: Cell::new(None),
            }),
            channel: None,
        }
    }

    /// Attach to `channel`, detaching from the previous channel first
    pub fn listen(&mut self, channel: &BufferedChannel<T>) {
        self.stop();
        channel.attach(Rc::clone(&self.slot));
        self.channel = Some(channel.downgrade());
    }

    /// Detach from the current channel, if any
    pub fn stop(&mut self) {
        if let Some(core) = self.channel.take().and_then(|weak| weak.upgrade()) {
            BufferedChannel::from_core(core).detach(&self.slot);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// The channel this subscription is attached to
    pub fn channel(&self) -> Option<BufferedChannel<T>> {
        self.channel
            .as_ref()
            .and_then(Weak::upgrade)
            .map(BufferedChannel::from_core)
    }

    pub fn min_interval(&self) -> TimeDelta {
        self.slot.min_interval
    }

    pub fn last_notified(&self) -> Option<DateTime<Utc>> {
        self.slot.last_notified.get()
    }
}

impl<T: ChannelValue> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::values::Velocity;
    use uom::si::velocity::meter_per_second;

    fn speed(v: f64) -> Velocity {
        Velocity::new::<meter_per_second>(v)
    }

    fn counter() -> (Rc<Cell<usize>>, impl Listener<Velocity> + 'static) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        (count, move |_: &BufferedChannel<Velocity>| seen.set(seen.get() + 1))
    }

    fn setup() -> (Rc<ManualClock>, BufferedChannel<Velocity>) {
        let clock = Rc::new(ManualClock::default());
        let channel = BufferedChannel::new(Rc::clone(&clock) as Rc<dyn Clock>, 16);
        (clock, channel)
    }

    #[test]
    fn test_listener_receives_channel() {
        let (_clock, channel) = setup();
        let last = Rc::new(Cell::new(0.0));
        let seen = Rc::clone(&last);
        let mut sub = Subscription::new(move |ch: &BufferedChannel<Velocity>| {
            seen.set(ch.last_value().unwrap().get::<meter_per_second>());
        });
        sub.listen(&channel);

        channel.set_value(speed(3.5));
        assert_eq!(last.get(), 3.5);
        assert!(sub.is_listening());
        assert!(sub.channel().unwrap().same_channel(&channel));
    }

    #[test]
    fn test_rate_limit_counts_from_last_delivery() {
        let (clock, channel) = setup();
        let (count, listener) = counter();
        let mut sub = Subscription::with_min_interval(listener, TimeDelta::milliseconds(1000));
        sub.listen(&channel);

        channel.set_value(speed(1.0));
        assert_eq!(count.get(), 1);

        clock.advance(TimeDelta::milliseconds(600));
        channel.set_value(speed(2.0));
        assert_eq!(count.get(), 1);
        // Suppressed updates are still recorded
        assert_eq!(channel.len(), 2);

        // 1000 ms after the delivered notification, not after the suppressed one
        clock.advance(TimeDelta::milliseconds(400));
        channel.set_value(speed(3.0));
        assert_eq!(count.get(), 2);
        assert_eq!(sub.last_notified(), Some(clock.current_time()));
    }

    #[test]
    fn test_listen_moves_between_channels() {
        let (_clock, first) = setup();
        let (_clock2, second) = setup();
        let (count, listener) = counter();
        let mut sub = Subscription::new(listener);

        sub.listen(&first);
        sub.listen(&first);
        assert_eq!(first.subscriber_count(), 1);

        sub.listen(&second);
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);

        first.set_value(speed(1.0));
        assert_eq!(count.get(), 0);
        second.set_value(speed(1.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let (_clock, channel) = setup();
        let (count, listener) = counter();
        {
            let mut sub = Subscription::new(listener);
            sub.listen(&channel);
            assert_eq!(channel.subscriber_count(), 1);
        }
        assert_eq!(channel.subscriber_count(), 0);
        channel.set_value(speed(1.0));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_stop_and_channel_dropped_first() {
        let (_clock, channel) = setup();
        let (_count, listener) = counter();
        let mut sub = Subscription::new(listener);
        sub.listen(&channel);
        sub.stop();
        assert!(!sub.is_listening());
        assert_eq!(channel.subscriber_count(), 0);

        sub.listen(&channel);
        drop(channel);
        assert!(!sub.is_listening());
        assert!(sub.channel().is_none());
    }

    #[test]
    fn test_self_unsubscribe_during_notification() {
        let (_clock, channel) = setup();

        let (first_count, first) = counter();
        let mut first_sub = Subscription::new(first);
        first_sub.listen(&channel);

        // The second subscriber drops its own handle from inside the callback
        let holder: Rc<RefCell<Option<Subscription<Velocity>>>> = Rc::new(RefCell::new(None));
        let quitting = Rc::clone(&holder);
        let quit_count = Rc::new(Cell::new(0));
        let quit_seen = Rc::clone(&quit_count);
        let mut quitter = Subscription::new(move |_: &BufferedChannel<Velocity>| {
            quit_seen.set(quit_seen.get() + 1);
            quitting.borrow_mut().take();
        });
        quitter.listen(&channel);
        *holder.borrow_mut() = Some(quitter);

        let (third_count, third) = counter();
        let mut third_sub = Subscription::new(third);
        third_sub.listen(&channel);

        channel.set_value(speed(1.0));
        assert_eq!(first_count.get(), 1);
        assert_eq!(quit_count.get(), 1);
        assert_eq!(third_count.get(), 1);
        assert_eq!(channel.subscriber_count(), 2);

        channel.set_value(speed(2.0));
        assert_eq!(first_count.get(), 2);
        assert_eq!(quit_count.get(), 1);
        assert_eq!(third_count.get(), 2);
    }

    #[test]
    fn test_listener_trait_object() {
        struct Collector(Rc<RefCell<Vec<f64>>>);
        impl Listener<Velocity> for Collector {
            fn on_new_value(&mut self, channel: &BufferedChannel<Velocity>) {
                if let Some(v) = channel.last_value() {
                    self.0.borrow_mut().push(v.get::<meter_per_second>());
                }
            }
        }

        let (_clock, channel) = setup();
        let values = Rc::new(RefCell::new(Vec::new()));
        let mut sub = Subscription::new(Collector(Rc::clone(&values)));
        sub.listen(&channel);
        channel.set_value(speed(1.0));
        channel.set_value(speed(2.0));
        assert_eq!(*values.borrow(), vec![1.0, 2.0]);
    }
}
