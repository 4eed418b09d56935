//! Reassembly of fast packets.
//!
//! Frames of one packet may arrive out of order or more than once. Every
//! in-flight packet is tracked by a [`ReassemblyKey`] made of the source
//! address, the sequence counter and the PGN. Such a key is only unique among
//! packets that are in flight at the same time, since the 3-bit sequence
//! counter wraps after 8 packets.
//!
//! Contexts live in an arena indexed by key. Every call to
//! [`FrameReassemblyTable::add`] advances a logical clock; contexts that have
//! not been touched for `stale_after_frames` ticks are evicted, and the table
//! never holds more than `max_pending` contexts.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::fast_packet::{FILLER, FRAME_LEN, FastPacketFrame, MAX_PAYLOAD_LEN, frame_count};
use crate::frame::{AssembledPacket, RawFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReassemblyKey {
    pub source: u8,
    pub sequence: u8,
    pub pgn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassemblyConfig {
    /// Maximum number of packets reassembled at the same time
    pub max_pending: usize,
    /// Number of frames after which an untouched context is dropped
    pub stale_after_frames: u64,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            max_pending: 256,
            stale_after_frames: 4096,
        }
    }
}

/// Counters describing what the table did with the frames it received
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    pub frames: u64,
    pub completed: u64,
    pub passthrough: u64,
    pub evicted: u64,
    pub duplicates_ignored: u64,
    pub pending: usize,
}

struct ReassemblyContext {
    key: ReassemblyKey,
    data: Vec<u8>,
    declared_len: Option<usize>,
    received: u32,
    last_touched: u64,
}

impl ReassemblyContext {
    fn new(key: ReassemblyKey, tick: u64) -> Self {
        Self {
            key,
            data: Vec::new(),
            declared_len: None,
            received: 0,
            last_touched: tick,
        }
    }

    fn accept(&mut self, frame: &FastPacketFrame<'_>, tick: u64) {
        self.last_touched = tick;

        if let Some(total_len) = frame.total_len() {
            let total_len = total_len as usize;
            if let Some(previous) = self.declared_len
                && previous != total_len
            {
                debug!(
                    "PGN {} from {}: declared length changed from {} to {}",
                    self.key.pgn, self.key.source, previous, total_len
                );
            }
            if total_len > MAX_PAYLOAD_LEN {
                warn!(
                    "PGN {} from {}: declared length {} can never complete",
                    self.key.pgn, self.key.source, total_len
                );
            }
            self.declared_len = Some(total_len);
            if self.data.len() < total_len {
                self.data.resize(total_len, FILLER);
            }
        }

        let dest = frame.data_offset();
        let mut src = frame.data();
        if let Some(len) = self.declared_len {
            let remaining = len.saturating_sub(dest);
            src = &src[..src.len().min(remaining)];
        }

        let end = dest + src.len();
        if self.data.len() < end {
            self.data.resize(end, FILLER);
        }
        self.data[dest..end].copy_from_slice(src);
        self.received |= 1 << frame.frame_index();
    }

    fn is_complete(&self) -> bool {
        let Some(len) = self.declared_len else {
            return false;
        };
        let needed = frame_count(len);
        if needed > 32 {
            return false;
        }
        let mask = if needed == 32 {
            u32::MAX
        } else {
            (1u32 << needed) - 1
        };
        self.received & mask == mask
    }

    // Frames that repeated a completed packet were dropped before this
    // context existed; put them back.
    fn restore(&mut self, tombstone: &Tombstone) {
        if tombstone.repeated & 1 != 0 {
            self.declared_len = Some(tombstone.payload.len());
        }
        self.data = tombstone.payload.clone();
        self.received = tombstone.repeated;
    }

    fn into_packet(mut self) -> AssembledPacket {
        self.data.truncate(self.declared_len.unwrap_or(0));
        AssembledPacket {
            source: self.key.source,
            pgn: self.key.pgn,
            data: self.data,
        }
    }
}

/// A recently completed packet.
///
/// Frames whose bytes match the payload are late duplicates. Any other frame
/// under the same key starts a new packet.
struct Tombstone {
    payload: Vec<u8>,
    completed_at: u64,
    // Frame indices repeated since the last repeated frame 0
    repeated: u32,
}

impl Tombstone {
    fn new(payload: Vec<u8>, completed_at: u64) -> Self {
        Self {
            payload,
            completed_at,
            repeated: 0,
        }
    }

    fn matches(&self, frame: &FastPacketFrame<'_>) -> bool {
        let len = self.payload.len();
        if let Some(total_len) = frame.total_len()
            && total_len as usize != len
        {
            return false;
        }

        let dest = frame.data_offset();
        let data = frame.data();
        let n = data.len().min(len.saturating_sub(dest));
        if n == 0 {
            return frame.is_first() && dest == 0;
        }
        data[..n] == self.payload[dest..dest + n]
    }

    fn mark_repeated(&mut self, frame: &FastPacketFrame<'_>) {
        if frame.is_first() {
            self.repeated = 1;
        } else {
            self.repeated |= 1 << frame.frame_index();
        }
    }
}

/// Reassembles fast packet frames into complete payloads.
pub struct FrameReassemblyTable {
    slots: Vec<Option<ReassemblyContext>>,
    free: Vec<usize>,
    index: HashMap<ReassemblyKey, usize>,
    completed: HashMap<ReassemblyKey, Tombstone>,
    tick: u64,
    config: ReassemblyConfig,
    stats: ReassemblyStats,
}

impl FrameReassemblyTable {
    pub fn new() -> Self {
        Self::with_config(ReassemblyConfig::default())
    }

    pub fn with_config(config: ReassemblyConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            completed: HashMap::new(),
            tick: 0,
            config,
            stats: ReassemblyStats::default(),
        }
    }

    /// Add a frame to the table
    ///
    /// # Returns
    /// `Some(AssembledPacket)` when this frame completed a packet, `None`
    /// otherwise. Frames longer than 8 bytes are considered already
    /// reassembled and are returned immediately.
    pub fn add(&mut self, frame: RawFrame) -> Option<AssembledPacket> {
        self.tick += 1;
        self.stats.frames += 1;
        if self.tick % self.config.stale_after_frames.max(1) == 0 {
            self.sweep();
        }

        if frame.data.len() > FRAME_LEN {
            self.stats.passthrough += 1;
            return Some(frame.into());
        }

        let Some(fast_packet) = FastPacketFrame::parse(&frame.data) else {
            trace!("Ignoring empty frame for PGN {} from {}", frame.pgn, frame.source);
            return None;
        };

        let key = ReassemblyKey {
            source: frame.source,
            sequence: fast_packet.sequence(),
            pgn: frame.pgn,
        };

        self.retire_completed(&key);
        if let Some(tombstone) = self.completed.get_mut(&key)
            && tombstone.matches(&fast_packet)
        {
            tombstone.mark_repeated(&fast_packet);
            trace!(
                "Ignoring late frame {} of completed PGN {} from {}",
                fast_packet.frame_index(),
                key.pgn,
                key.source
            );
            self.stats.duplicates_ignored += 1;
            return None;
        }

        let reused = self.completed.remove(&key);
        if reused.is_some() {
            debug!(
                "New packet for PGN {} from {} reuses sequence {}",
                key.pgn, key.source, key.sequence
            );
        }

        let slot = self.slot_for(key);
        let tick = self.tick;
        let context = self.slots[slot].as_mut()?;
        // A new frame 0 starts from scratch
        if let Some(tombstone) = reused
            && !fast_packet.is_first()
        {
            context.restore(&tombstone);
        }
        context.accept(&fast_packet, tick);

        if !context.is_complete() {
            return None;
        }

        let packet = self.release(slot)?.into_packet();
        self.completed.insert(key, Tombstone::new(packet.data.clone(), tick));
        self.stats.completed += 1;
        debug!(
            "Completed PGN {} from {} (sequence {}, {} bytes)",
            key.pgn,
            key.source,
            key.sequence,
            packet.data.len()
        );
        Some(packet)
    }

    /// Drop contexts that have not received a frame for more than
    /// `stale_after_frames` ticks. Returns the number of evicted contexts.
    pub fn sweep(&mut self) -> usize {
        let tick = self.tick;
        let stale_after = self.config.stale_after_frames;

        self.completed
            .retain(|_, done| tick.saturating_sub(done.completed_at) <= stale_after);

        let stale: Vec<usize> = self
            .index
            .values()
            .copied()
            .filter(|&slot| {
                self.slots[slot]
                    .as_ref()
                    .is_some_and(|c| tick.saturating_sub(c.last_touched) > stale_after)
            })
            .collect();

        for &slot in &stale {
            if let Some(context) = self.release(slot) {
                debug!(
                    "Evicted stale reassembly of PGN {} from {} (sequence {})",
                    context.key.pgn, context.key.source, context.key.sequence
                );
            }
        }
        self.stats.evicted += stale.len() as u64;
        stale.len()
    }

    /// Number of packets currently being reassembled
    pub fn pending(&self) -> usize {
        self.index.len()
    }

    pub fn stats(&self) -> ReassemblyStats {
        ReassemblyStats {
            pending: self.pending(),
            ..self.stats
        }
    }

    pub fn config(&self) -> &ReassemblyConfig {
        &self.config
    }

    fn slot_for(&mut self, key: ReassemblyKey) -> usize {
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }

        if self.pending() >= self.config.max_pending {
            self.sweep();
        }
        if self.pending() >= self.config.max_pending {
            self.evict_least_recent();
        }

        trace!(
            "New reassembly for PGN {} from {} (sequence {})",
            key.pgn, key.source, key.sequence
        );
        let context = ReassemblyContext::new(key, self.tick);
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(context);
                slot
            }
            None => {
                self.slots.push(Some(context));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        slot
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .index
            .values()
            .copied()
            .filter_map(|slot| self.slots[slot].as_ref().map(|c| (c.last_touched, slot)))
            .min();

        if let Some((_, slot)) = oldest
            && let Some(context) = self.release(slot)
        {
            self.stats.evicted += 1;
            debug!(
                "Reassembly table full, evicted PGN {} from {} (sequence {})",
                context.key.pgn, context.key.source, context.key.sequence
            );
        }
    }

    fn release(&mut self, slot: usize) -> Option<ReassemblyContext> {
        let context = self.slots.get_mut(slot)?.take()?;
        self.index.remove(&context.key);
        self.free.push(slot);
        Some(context)
    }

    // A sender that moved on to another sequence counter for the same PGN
    // is done with the previous packet.
    fn retire_completed(&mut self, key: &ReassemblyKey) {
        let tick = self.tick;
        let stale_after = self.config.stale_after_frames;
        self.completed.retain(|done, tombstone| {
            let superseded =
                done.source == key.source && done.pgn == key.pgn && done.sequence != key.sequence;
            !superseded && tick.saturating_sub(tombstone.completed_at) <= stale_after
        });
    }
}

impl Default for FrameReassemblyTable {
    fn default() -> Self {
        Self::new()
    }
}
