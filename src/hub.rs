//! The publish/subscribe hub.
//!
//! Every decoded sample enters through [`Hub::publish_value`]. The hub keeps
//! one [`BufferedChannel`] per (channel, source) pair and, for every channel,
//! a merged view that follows a single source at a time.
//!
//! # Source arbitration
//!
//! Each publish is always recorded in its source's own history. It is also
//! written to the merged view when its source is the channel's current
//! source. The current source changes when a publish arrives and
//! - there is no current source yet, or
//! - the current source has not published within the freshness window, or
//! - the publishing source has a strictly higher priority.
//!
//! Priorities default to 0.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::buffered_channel::BufferedChannel;
use crate::channels::{Channel, TypedChannel};
use crate::clock::Clock;
use crate::config::HubConfig;
use crate::subscription::Subscription;
use crate::timed_sample::TimedSample;
use crate::values::{ChannelValue, ValueKind};

/// Changes in the set of sources feeding the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// First sample from `source` on `channel`
    NewSource { channel: Channel, source: String },
    /// The merged view of `channel` now follows `current`
    SourceSwitched {
        channel: Channel,
        previous: Option<String>,
        current: String,
    },
}

pub type EventListenerId = usize;

type EventListener = Rc<RefCell<dyn FnMut(&HubEvent)>>;

/// Description of one (channel, source) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub code: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ValueKind,
    pub source: String,
    pub priority: i32,
    pub is_current: bool,
    pub samples: usize,
    pub subscribers: usize,
    pub last_time_stamp: Option<DateTime<Utc>>,
}

/// Type-erased access to a channel history
trait ErasedChannel {
    fn as_any(&self) -> &dyn Any;
    fn len(&self) -> usize;
    fn last_time_stamp(&self) -> Option<DateTime<Utc>>;
    fn subscriber_count(&self) -> usize;
}

impl<T: ChannelValue> ErasedChannel for BufferedChannel<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn len(&self) -> usize {
        BufferedChannel::len(self)
    }

    fn last_time_stamp(&self) -> Option<DateTime<Utc>> {
        BufferedChannel::last_time_stamp(self)
    }

    fn subscriber_count(&self) -> usize {
        BufferedChannel::subscriber_count(self)
    }
}

fn typed<T: ChannelValue>(channel: &dyn ErasedChannel) -> Option<BufferedChannel<T>> {
    channel.as_any().downcast_ref::<BufferedChannel<T>>().cloned()
}

struct ChannelEntry {
    merged: Box<dyn ErasedChannel>,
    sources: BTreeMap<String, Box<dyn ErasedChannel>>,
    current: Option<String>,
}

/// Where a publish lands
struct PublishTarget<T> {
    source: BufferedChannel<T>,
    merged: BufferedChannel<T>,
    is_current: bool,
}

pub struct Hub {
    clock: Rc<dyn Clock>,
    config: HubConfig,
    entries: RefCell<BTreeMap<Channel, ChannelEntry>>,
    priorities: RefCell<HashMap<String, i32>>,
    listeners: RefCell<Vec<(EventListenerId, EventListener)>>,
    next_listener_id: Cell<EventListenerId>,
}

impl Hub {
    pub fn new(clock: Rc<dyn Clock>, config: HubConfig) -> Self {
        Self {
            clock,
            config,
            entries: RefCell::new(BTreeMap::new()),
            priorities: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(1),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.clock.current_time()
    }

    /// Publish `value` from `source`, stamped with the hub's current time
    pub fn publish_value<T: ChannelValue>(&self, channel: TypedChannel<T>, source: &str, value: T) {
        let time = self.current_time();
        self.publish_timed_value(channel, source, time, value);
    }

    /// Publish `value` observed by `source` at `time`
    pub fn publish_timed_value<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        source: &str,
        time: DateTime<Utc>,
        value: T,
    ) {
        let Some(target) = self.prepare_source(channel, source, self.config.default_capacity) else {
            return;
        };
        if target.is_current {
            target.source.set_timed_value(time, value.clone());
            target.merged.set_timed_value(time, value);
        } else {
            target.source.set_timed_value(time, value);
        }
    }

    /// Bulk load a history for `source` without notifying subscribers
    pub fn insert_values<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        source: &str,
        samples: Vec<TimedSample<T>>,
    ) {
        if samples.is_empty() {
            return;
        }
        let capacity = self.config.default_capacity.max(samples.len());
        let Some(target) = self.prepare_source(channel, source, capacity) else {
            return;
        };
        if target.is_current {
            target.merged.insert(samples.iter().cloned());
        }
        target.source.insert(samples);
    }

    /// Find or create the histories a publish from `source` goes to, and
    /// run source arbitration for it.
    fn prepare_source<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        source: &str,
        capacity: usize,
    ) -> Option<PublishTarget<T>> {
        let id = channel.channel();
        let mut events = Vec::new();
        let target = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .entry(id)
                .or_insert_with(|| self.new_entry::<T>());

            if !entry.sources.contains_key(source) {
                debug!("New source '{}' for channel {}", source, id);
                let history = BufferedChannel::<T>::new(self.clock(), capacity);
                entry.sources.insert(source.to_string(), Box::new(history));
                events.push(HubEvent::NewSource {
                    channel: id,
                    source: source.to_string(),
                });
            }

            if self.prefers(entry, source) {
                let previous = entry.current.replace(source.to_string());
                info!(
                    "Channel {} switched source from {:?} to '{}'",
                    id, previous, source
                );
                events.push(HubEvent::SourceSwitched {
                    channel: id,
                    previous,
                    current: source.to_string(),
                });
            }

            let source_history = entry.sources.get(source).and_then(|c| typed::<T>(c.as_ref()));
            let merged = typed::<T>(entry.merged.as_ref());
            match (source_history, merged) {
                (Some(source_history), Some(merged)) => Some(PublishTarget {
                    source: source_history,
                    merged,
                    is_current: entry.current.as_deref() == Some(source),
                }),
                _ => {
                    error!("Channel {} holds values of another type", id);
                    None
                }
            }
        };

        for event in &events {
            self.emit(event);
        }
        target
    }

    fn new_entry<T: ChannelValue>(&self) -> ChannelEntry {
        ChannelEntry {
            merged: Box::new(BufferedChannel::<T>::new(
                self.clock(),
                self.config.default_capacity,
            )),
            sources: BTreeMap::new(),
            current: None,
        }
    }

    /// True if a publish from `candidate` should take over the merged view
    fn prefers(&self, entry: &ChannelEntry, candidate: &str) -> bool {
        let Some(current) = entry.current.as_deref() else {
            return true;
        };
        if current == candidate {
            return false;
        }
        let now = self.current_time();
        let window = self.config.freshness_window();
        let current_is_fresh = entry
            .sources
            .get(current)
            .and_then(|history| history.last_time_stamp())
            .is_some_and(|last| now - last < window);

        !current_is_fresh || self.source_priority(candidate) > self.source_priority(current)
    }

    /// The merged view of `channel`
    pub fn get<T: ChannelValue>(&self, channel: TypedChannel<T>) -> Option<BufferedChannel<T>> {
        self.entries
            .borrow()
            .get(&channel.channel())
            .and_then(|entry| typed(entry.merged.as_ref()))
    }

    /// The history of one source of `channel`
    pub fn get_source<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        source: &str,
    ) -> Option<BufferedChannel<T>> {
        self.entries
            .borrow()
            .get(&channel.channel())
            .and_then(|entry| entry.sources.get(source))
            .and_then(|history| typed(history.as_ref()))
    }

    /// Attach `subscription` to the merged view of `channel`, creating the
    /// view if nothing was published to it yet
    pub fn subscribe<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        subscription: &mut Subscription<T>,
    ) {
        let merged = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .entry(channel.channel())
                .or_insert_with(|| self.new_entry::<T>());
            typed::<T>(entry.merged.as_ref())
        };
        match merged {
            Some(merged) => subscription.listen(&merged),
            None => error!("Channel {} holds values of another type", channel.channel()),
        }
    }

    /// The merged view if it has samples, else the first source that has
    pub fn non_empty_values<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
    ) -> Option<BufferedChannel<T>> {
        let entries = self.entries.borrow();
        let entry = entries.get(&channel.channel())?;
        if entry.merged.len() > 0 {
            return typed(entry.merged.as_ref());
        }
        entry
            .sources
            .values()
            .find(|history| history.len() > 0)
            .and_then(|history| typed(history.as_ref()))
    }

    /// The value `source` published closest to `time`, if strictly closer
    /// than `max_delta`
    pub fn value_from_source_at<T: ChannelValue>(
        &self,
        channel: TypedChannel<T>,
        source: &str,
        time: DateTime<Utc>,
        max_delta: TimeDelta,
    ) -> Option<T> {
        self.get_source(channel, source)?
            .nearest(time)
            .filter(|sample| sample.distance_ms(time) < max_delta.num_milliseconds())
            .map(|sample| sample.value)
    }

    /// True if the newest sample of `channel` is not older than `threshold`
    pub fn has_fresh_value(&self, channel: impl Into<Channel>, threshold: DateTime<Utc>) -> bool {
        self.entries
            .borrow()
            .get(&channel.into())
            .and_then(|entry| entry.merged.last_time_stamp())
            .is_some_and(|last| last >= threshold)
    }

    /// True if at least one source published to `channel`
    pub fn has(&self, channel: impl Into<Channel>) -> bool {
        self.entries
            .borrow()
            .get(&channel.into())
            .is_some_and(|entry| !entry.sources.is_empty())
    }

    pub fn has_source(&self, channel: impl Into<Channel>, source: &str) -> bool {
        self.entries
            .borrow()
            .get(&channel.into())
            .is_some_and(|entry| entry.sources.contains_key(source))
    }

    pub fn sources_for_channel(&self, channel: impl Into<Channel>) -> Vec<String> {
        self.entries
            .borrow()
            .get(&channel.into())
            .map(|entry| entry.sources.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The source the merged view of `channel` follows
    pub fn current_source(&self, channel: impl Into<Channel>) -> Option<String> {
        self.entries
            .borrow()
            .get(&channel.into())
            .and_then(|entry| entry.current.clone())
    }

    pub fn source_priority(&self, source: &str) -> i32 {
        self.priorities.borrow().get(source).copied().unwrap_or(0)
    }

    /// Set the arbitration weight of `source`. A priority of 0 restores the
    /// default.
    pub fn set_source_priority(&self, source: &str, priority: i32) {
        let mut priorities = self.priorities.borrow_mut();
        if priority == 0 {
            priorities.remove(source);
        } else {
            priorities.insert(source.to_string(), priority);
        }
    }

    /// Highest priority assigned to any source, 0 if none is set
    pub fn max_priority(&self) -> i32 {
        self.priorities
            .borrow()
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }

    pub fn source_priorities(&self) -> HashMap<String, i32> {
        self.priorities.borrow().clone()
    }

    /// List every known (channel, source) pair
    pub fn enumerate(&self) -> Vec<ChannelInfo> {
        let entries = self.entries.borrow();
        let mut infos = Vec::new();
        for (channel, entry) in entries.iter() {
            for (source, history) in &entry.sources {
                infos.push(ChannelInfo {
                    code: channel.code(),
                    name: channel.short_name(),
                    description: channel.description(),
                    kind: channel.value_kind(),
                    source: source.clone(),
                    priority: self.source_priority(source),
                    is_current: entry.current.as_deref() == Some(source.as_str()),
                    samples: history.len(),
                    subscribers: history.subscriber_count(),
                    last_time_stamp: history.last_time_stamp(),
                });
            }
        }
        infos
    }

    /// Register a callback for [`HubEvent`]s
    pub fn add_event_listener(
        &self,
        listener: impl FnMut(&HubEvent) + 'static,
    ) -> EventListenerId {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        let listener: EventListener = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn remove_event_listener(&self, id: EventListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn emit(&self, event: &HubEvent) {
        let snapshot: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (&mut *listener)(event);
            }
        }
    }
}
