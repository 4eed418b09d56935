use std::collections::HashSet;

use tracing::trace;

use crate::frame::{AssembledPacket, RawFrame};
use crate::reassembly::{FrameReassemblyTable, ReassemblyConfig};

/// PGNs that are transmitted as fast packets
pub const DEFAULT_FAST_PACKET_PGNS: &[u32] = &[
    126464, 126720, 126996, 126998, 127233, 127237, 127489, 127493, 127496, 127497, 127498,
    127503, 127504, 127505, 127506, 127507, 128275, 128520, 129029, 129038, 129039, 129040,
    129284, 129285, 129540, 129794, 129795, 129797, 129809, 129810, 130074, 130320, 130321,
    130577, 130820,
];

/// NMEA2000 Stream Reader
///
/// Stateful reader for NMEA2000 CAN frames:
/// - Single-frame messages are returned immediately
/// - Fast packet messages are assembled from multiple frames
///
/// # Usage
///
/// ```no_run
/// use n2k_transport::{N2kStreamReader, RawFrame};
///
/// let mut reader = N2kStreamReader::new();
/// let frame = RawFrame::new(7, 129026, vec![0xff; 8]);
/// if let Some(packet) = reader.process_frame(frame) {
///     println!("PGN: {}", packet.pgn);
/// }
/// ```
pub struct N2kStreamReader {
    table: FrameReassemblyTable,
    fast_packet_pgns: HashSet<u32>,
}

impl N2kStreamReader {
    /// Create a reader with the default table settings and PGN list
    pub fn new() -> Self {
        Self::with_config(ReassemblyConfig::default(), DEFAULT_FAST_PACKET_PGNS)
    }

    pub fn with_config(config: ReassemblyConfig, fast_packet_pgns: &[u32]) -> Self {
        Self {
            table: FrameReassemblyTable::with_config(config),
            fast_packet_pgns: fast_packet_pgns.iter().copied().collect(),
        }
    }

    /// Process a CAN frame and return a complete message if available
    ///
    /// # Returns
    /// `Some(AssembledPacket)` if a complete message is ready, `None` otherwise
    pub fn process_frame(&mut self, frame: RawFrame) -> Option<AssembledPacket> {
        if self.is_fast_packet_pgn(frame.pgn) {
            self.table.add(frame)
        } else {
            trace!("Single frame PGN {} from {}", frame.pgn, frame.source);
            Some(frame.into())
        }
    }

    pub fn is_fast_packet_pgn(&self, pgn: u32) -> bool {
        self.fast_packet_pgns.contains(&pgn)
    }

    pub fn table(&self) -> &FrameReassemblyTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FrameReassemblyTable {
        &mut self.table
    }
}

impl Default for N2kStreamReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragmenter::FrameFragmenter;

    #[test]
    fn test_single_frame_pgn_passes_through() {
        let mut reader = N2kStreamReader::new();
        let data = vec![0x01, 0x00, 0x10, 0x27, 0x00, 0x00, 0xff, 0xff];
        let packet = reader.process_frame(RawFrame::new(5, 129026, data.clone())).unwrap();

        assert_eq!(packet.pgn, 129026);
        assert_eq!(packet.data, data);
        assert_eq!(reader.table().stats().frames, 0);
    }

    #[test]
    fn test_fast_packet_pgn_is_reassembled() {
        let mut reader = N2kStreamReader::new();
        let packet = AssembledPacket::new(7, 129029, (0..43).collect());
        let frames = FrameFragmenter::new().split(&packet).unwrap();

        let done: Vec<_> = frames
            .into_iter()
            .filter_map(|f| reader.process_frame(f))
            .collect();
        assert_eq!(done, vec![packet]);
        assert_eq!(reader.table().stats().completed, 1);
    }

    #[test]
    fn test_custom_pgn_list() {
        let mut reader = N2kStreamReader::with_config(ReassemblyConfig::default(), &[65280]);
        assert!(reader.is_fast_packet_pgn(65280));
        assert!(!reader.is_fast_packet_pgn(129029));

        // First frame of a proprietary fast packet is held back
        let frame = RawFrame::new(3, 65280, vec![0x00, 9, 1, 2, 3, 4, 5, 6]);
        assert!(reader.process_frame(frame).is_none());
        assert_eq!(reader.table().pending(), 1);
    }
}
