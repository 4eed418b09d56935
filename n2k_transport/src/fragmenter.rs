use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::fast_packet::{
    FILLER, FIRST_FRAME_DATA_LEN, FRAME_LEN, MAX_PAYLOAD_LEN, data_offset, frame_count,
    pack_header,
};
use crate::frame::{AssembledPacket, RawFrame};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("payload of {len} bytes exceeds the fast packet limit of {max} bytes")]
    PayloadTooLong { len: usize, max: usize },
}

/// Splits complete payloads into fast packet frames.
///
/// Every PGN has its own rolling 3-bit sequence counter. The counters belong
/// to the fragmenter, so independent fragmenters (for instance a simulated
/// bus and a real one) never interfere with each other.
#[derive(Debug, Default)]
pub struct FrameFragmenter {
    counters: HashMap<u32, u8>,
}

impl FrameFragmenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&mut self, pgn: u32) -> u8 {
        let counter = self.counters.entry(pgn).or_insert(0);
        let sequence = *counter;
        *counter = (sequence + 1) & 0x07;
        sequence
    }

    /// Split a packet into the frames that carry it on the bus.
    ///
    /// All frames share one sequence counter; each call consumes the next
    /// counter value for the packet's PGN.
    pub fn split(&mut self, packet: &AssembledPacket) -> Result<Vec<RawFrame>, FragmentError> {
        let payload = &packet.data;
        let len = payload.len();
        if len > MAX_PAYLOAD_LEN {
            return Err(FragmentError::PayloadTooLong {
                len,
                max: MAX_PAYLOAD_LEN,
            });
        }

        let sequence = self.next_sequence(packet.pgn);
        let count = frame_count(len);
        trace!(
            "Splitting PGN {} ({} bytes) into {} frames with sequence {}",
            packet.pgn, len, count, sequence
        );

        let frames = (0..count as u8)
            .map(|index| {
                let mut bytes = [FILLER; FRAME_LEN];
                bytes[0] = pack_header(sequence, index);
                let header_len = if index == 0 {
                    bytes[1] = len as u8;
                    FRAME_LEN - FIRST_FRAME_DATA_LEN
                } else {
                    1
                };

                let start = data_offset(index).min(len);
                let end = (start + FRAME_LEN - header_len).min(len);
                let chunk = &payload[start..end];
                bytes[header_len..header_len + chunk.len()].copy_from_slice(chunk);

                RawFrame::new(packet.source, packet.pgn, bytes.to_vec())
            })
            .collect();

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::fast_packet::FastPacketFrame;
    use crate::reassembly::FrameReassemblyTable;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 37 % 251) as u8).collect()
    }

    fn header(frame: &RawFrame) -> (u8, u8) {
        let view = FastPacketFrame::parse(&frame.data).unwrap();
        (view.sequence(), view.frame_index())
    }

    #[test]
    fn test_thirteen_bytes_fit_in_two_frames() {
        let data = payload(13);
        let packet = AssembledPacket::new(7, 129029, data.clone());
        let frames = FrameFragmenter::new().split(&packet).unwrap();

        assert_eq!(frames.len(), 2);
        let seq = header(&frames[0]).0;
        let mut expected0 = vec![seq << 5, 13];
        expected0.extend_from_slice(&data[0..6]);
        let mut expected1 = vec![(seq << 5) | 1];
        expected1.extend_from_slice(&data[6..13]);
        assert_eq!(frames[0].data, expected0);
        assert_eq!(frames[1].data, expected1);

        for order in [[0, 1], [1, 0]] {
            let mut table = FrameReassemblyTable::new();
            let done: Vec<_> = order
                .iter()
                .filter_map(|&i| table.add(frames[i].clone()))
                .collect();
            assert_eq!(done, vec![packet.clone()]);
        }
    }

    #[test]
    fn test_fourteen_bytes_need_three_frames() {
        let data = payload(14);
        let packet = AssembledPacket::new(7, 129029, data.clone());
        let frames = FrameFragmenter::new().split(&packet).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].data[1], 14);
        assert_eq!(&frames[0].data[2..], &data[0..6]);
        assert_eq!(&frames[1].data[1..], &data[6..13]);
        assert_eq!(frames[2].data[1], data[13]);
        assert!(frames[2].data[2..].iter().all(|&b| b == FILLER));

        for order in [[0, 1, 2], [2, 1, 0], [1, 2, 0]] {
            let mut table = FrameReassemblyTable::new();
            let done: Vec<_> = order
                .iter()
                .filter_map(|&i| table.add(frames[i].clone()))
                .collect();
            assert_eq!(done, vec![packet.clone()]);
        }
    }

    #[test]
    fn test_frames_are_padded() {
        let packet = AssembledPacket::new(1, 126996, vec![1, 2, 3]);
        let frames = FrameFragmenter::new().split(&packet).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, vec![0x00, 3, 1, 2, 3, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_empty_payload_is_one_frame() {
        let packet = AssembledPacket::new(1, 126996, vec![]);
        let frames = FrameFragmenter::new().split(&packet).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data[1], 0);
    }

    #[test]
    fn test_too_long_payload() {
        let packet = AssembledPacket::new(1, 126996, payload(MAX_PAYLOAD_LEN + 1));
        let mut fragmenter = FrameFragmenter::new();
        assert_eq!(
            fragmenter.split(&packet),
            Err(FragmentError::PayloadTooLong { len: 224, max: 223 })
        );

        // A failed split does not consume a sequence counter
        let ok = fragmenter
            .split(&AssembledPacket::new(1, 126996, vec![1]))
            .unwrap();
        assert_eq!(header(&ok[0]).0, 0);
    }

    #[test]
    fn test_sequence_counter_rolls_per_pgn() {
        let mut fragmenter = FrameFragmenter::new();
        let packet = AssembledPacket::new(7, 129029, payload(43));
        let mut seen = HashSet::new();

        for k in 0..12 {
            let frames = fragmenter.split(&packet).unwrap();
            assert_eq!(frames.len(), 7);

            let common = header(&frames[0]).0;
            for (i, frame) in frames.iter().enumerate() {
                assert_eq!(header(frame), (common, i as u8));
                assert_eq!(frame.pgn, 129029);
                assert_eq!(frame.source, 7);
                assert_eq!(frame.data.len(), FRAME_LEN);
            }
            seen.insert(common);
            assert_eq!(seen.len(), 1 + k.min(7));
        }

        // Another PGN starts its own counter
        let other = fragmenter
            .split(&AssembledPacket::new(7, 126996, payload(10)))
            .unwrap();
        assert_eq!(header(&other[0]).0, 0);
    }

    #[test]
    fn test_independent_fragmenters() {
        let packet = AssembledPacket::new(7, 129029, payload(20));
        let mut simulated = FrameFragmenter::new();
        let mut real = FrameFragmenter::new();

        simulated.split(&packet).unwrap();
        simulated.split(&packet).unwrap();
        let frames = real.split(&packet).unwrap();
        assert_eq!(header(&frames[0]).0, 0);
    }

    #[test]
    fn test_round_trip_any_order_with_duplicates() {
        let mut fragmenter = FrameFragmenter::new();

        for len in 1..=MAX_PAYLOAD_LEN {
            let packet = AssembledPacket::new((len % 250) as u8, 130820, payload(len));
            let frames = fragmenter.split(&packet).unwrap();
            let n = frames.len();

            // Reverse order, every frame delivered twice
            let mut table = FrameReassemblyTable::new();
            let mut done = Vec::new();
            for i in (0..n).rev() {
                done.extend(table.add(frames[i].clone()));
                done.extend(table.add(frames[i].clone()));
            }
            assert_eq!(done, vec![packet.clone()], "reverse order, len {}", len);

            // Interleaved stride order followed by a full re-delivery
            let stride = if n % 3 == 0 { 1 } else { 3 };
            let mut table = FrameReassemblyTable::new();
            let mut done = Vec::new();
            for k in 0..n {
                done.extend(table.add(frames[(k * stride) % n].clone()));
            }
            for frame in &frames {
                done.extend(table.add(frame.clone()));
            }
            assert_eq!(done, vec![packet.clone()], "stride order, len {}", len);
        }
    }
}
