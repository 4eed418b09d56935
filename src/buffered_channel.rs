//! Bounded history of timed samples for one channel and source.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::subscription::ListenerSlot;
use crate::timed_sample::TimedSample;
use crate::values::ChannelValue;

pub(crate) struct ChannelCore<T> {
    /// Newest first
    samples: RefCell<VecDeque<TimedSample<T>>>,
    capacity: usize,
    clock: Rc<dyn Clock>,
    listeners: RefCell<Vec<Rc<ListenerSlot<T>>>>,
}

/// A handle to a bounded, newest-first history of samples.
///
/// Handles are cheap to clone and all clones share the same history and the
/// same set of subscriptions.
///
/// The history is ordered by insertion, not by timestamp: a sample published
/// with an older timestamp than the newest one still goes to the front.
pub struct BufferedChannel<T> {
    core: Rc<ChannelCore<T>>,
}

impl<T> Clone for BufferedChannel<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: ChannelValue> BufferedChannel<T> {
    pub fn new(clock: Rc<dyn Clock>, capacity: usize) -> Self {
        Self {
            core: Rc::new(ChannelCore {
                samples: RefCell::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity: capacity.max(1),
                clock,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn from_core(core: Rc<ChannelCore<T>>) -> Self {
        Self { core }
    }

    pub(crate) fn downgrade(&self) -> Weak<ChannelCore<T>> {
        Rc::downgrade(&self.core)
    }

    /// Record `value` stamped with the current time and notify subscribers
    pub fn set_value(&self, value: T) {
        let time = self.core.clock.current_time();
        self.set_timed_value(time, value);
    }

    /// Record `value` observed at `time` and notify subscribers
    pub fn set_timed_value(&self, time: DateTime<Utc>, value: T) {
        self.record(TimedSample::new(time, value));
        self.notify_listeners();
    }

    fn record(&self, sample: TimedSample<T>) {
        let mut samples = self.core.samples.borrow_mut();
        if let Some(newest) = samples.front()
            && sample.time < newest.time
        {
            debug!(
                "Sample at {} is older than the newest one at {}",
                sample.time, newest.time
            );
        }
        samples.push_front(sample);
        samples.truncate(self.core.capacity);
    }

    fn notify_listeners(&self) {
        // Listeners may attach or detach while being notified
        let snapshot: Vec<Rc<ListenerSlot<T>>> = self.core.listeners.borrow().clone();
        if snapshot.is_empty() {
            return;
        }
        let now = self.core.clock.current_time();
        for slot in snapshot {
            slot.notify(self, now);
        }
    }

    /// Merge a batch of samples into the history without notifying.
    ///
    /// The resulting history is sorted newest first by timestamp.
    pub fn insert(&self, batch: impl IntoIterator<Item = TimedSample<T>>) {
        let mut samples = self.core.samples.borrow_mut();
        samples.extend(batch);
        samples
            .make_contiguous()
            .sort_by(|a, b| b.time.cmp(&a.time));
        samples.truncate(self.core.capacity);
    }

    pub fn has_value(&self) -> bool {
        !self.core.samples.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.core.samples.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_value()
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity
    }

    pub fn last_sample(&self) -> Option<TimedSample<T>> {
        self.core.samples.borrow().front().cloned()
    }

    pub fn last_value(&self) -> Option<T> {
        self.core
            .samples
            .borrow()
            .front()
            .map(|sample| sample.value.clone())
    }

    pub fn last_time_stamp(&self) -> Option<DateTime<Utc>> {
        self.core.samples.borrow().front().map(|sample| sample.time)
    }

    /// Copy of the whole history, newest first
    pub fn history(&self) -> Vec<TimedSample<T>> {
        self.core.samples.borrow().iter().cloned().collect()
    }

    /// The sample closest in time to `time`
    pub fn nearest(&self, time: DateTime<Utc>) -> Option<TimedSample<T>> {
        self.core
            .samples
            .borrow()
            .iter()
            .min_by_key(|sample| sample.distance_ms(time))
            .cloned()
    }

    /// True if the newest sample is younger than `max_age`
    pub fn is_fresh(&self, max_age: TimeDelta) -> bool {
        self.last_time_stamp()
            .is_some_and(|last| self.core.clock.current_time() - last < max_age)
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.listeners.borrow().len()
    }

    /// True if both handles refer to the same history
    pub fn same_channel(&self, other: &BufferedChannel<T>) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    pub(crate) fn attach(&self, slot: Rc<ListenerSlot<T>>) {
        self.core.listeners.borrow_mut().push(slot);
    }

    pub(crate) fn detach(&self, slot: &Rc<ListenerSlot<T>>) {
        self.core
            .listeners
            .borrow_mut()
            .retain(|attached| !Rc::ptr_eq(attached, slot));
    }
}
