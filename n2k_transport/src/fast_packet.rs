//! Fast packet framing.
//!
//! Payloads longer than a single CAN frame are split across several frames.
//! Byte 0 of every frame packs a 3-bit sequence counter (high bits) and a
//! 5-bit frame index (low bits). The first frame carries the total payload
//! length in byte 1 followed by 6 payload bytes, every later frame carries 7.
//! Unused trailing bytes are padded with [`FILLER`].

/// Size of a physical CAN frame.
pub const FRAME_LEN: usize = 8;

/// Payload bytes carried by frame 0.
pub const FIRST_FRAME_DATA_LEN: usize = 6;

/// Payload bytes carried by every frame after the first.
pub const FRAME_DATA_LEN: usize = 7;

/// Highest frame index that fits in the 5-bit field.
pub const MAX_FRAME_INDEX: u8 = 0x1F;

/// Longest payload a fast packet can describe: 6 + 31 * 7.
pub const MAX_PAYLOAD_LEN: usize =
    FIRST_FRAME_DATA_LEN + FRAME_DATA_LEN * MAX_FRAME_INDEX as usize;

/// Padding byte for unused frame bytes.
pub const FILLER: u8 = 0xFF;

#[inline]
#[must_use]
pub const fn pack_header(sequence: u8, frame_index: u8) -> u8 {
    ((sequence & 0x07) << 5) | (frame_index & MAX_FRAME_INDEX)
}

/// Number of frames needed to carry a payload of `len` bytes.
#[inline]
#[must_use]
pub const fn frame_count(len: usize) -> usize {
    (len + 1).div_ceil(FRAME_DATA_LEN)
}

/// Offset in the reassembled payload where the data of `frame_index` starts.
#[inline]
#[must_use]
pub const fn data_offset(frame_index: u8) -> usize {
    if frame_index == 0 {
        0
    } else {
        FIRST_FRAME_DATA_LEN + FRAME_DATA_LEN * (frame_index as usize - 1)
    }
}

/// A borrowed view of one fast packet frame.
#[derive(Debug, Clone, Copy)]
pub struct FastPacketFrame<'a>(&'a [u8]);

impl<'a> FastPacketFrame<'a> {
    /// Returns `None` for an empty frame, which has no header byte.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u8 {
        (self.0[0] >> 5) & 0x07
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u8 {
        self.0[0] & MAX_FRAME_INDEX
    }

    #[inline]
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.frame_index() == 0
    }

    /// Declared payload length, only present in frame 0.
    #[inline]
    #[must_use]
    pub fn total_len(&self) -> Option<u8> {
        if self.is_first() {
            self.0.get(1).copied()
        } else {
            None
        }
    }

    /// The payload bytes of this frame, possibly padded with [`FILLER`] if
    /// this is the last frame of the packet.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        let start = if self.is_first() { 2 } else { 1 };
        self.0.get(start..).unwrap_or(&[])
    }

    #[inline]
    #[must_use]
    pub fn data_offset(&self) -> usize {
        data_offset(self.frame_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_header() {
        assert_eq!(pack_header(3, 0), 0x60);
        assert_eq!(pack_header(3, 6), 0x66);
        assert_eq!(pack_header(7, 31), 0xFF);
        // Out of range values are masked
        assert_eq!(pack_header(8, 32), 0x00);
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(0), 1);
        assert_eq!(frame_count(6), 1);
        assert_eq!(frame_count(7), 2);
        assert_eq!(frame_count(13), 2);
        assert_eq!(frame_count(14), 3);
        assert_eq!(frame_count(43), 7);
        assert_eq!(frame_count(MAX_PAYLOAD_LEN), 32);
    }

    #[test]
    fn test_data_offset() {
        assert_eq!(data_offset(0), 0);
        assert_eq!(data_offset(1), 6);
        assert_eq!(data_offset(2), 13);
        assert_eq!(data_offset(31), 216);
    }

    #[test]
    fn test_first_frame_view() {
        let bytes = [0x60, 0x2b, 0x00, 0x74, 0x40, 0xc0, 0xca, 0x97];
        let frame = FastPacketFrame::parse(&bytes).unwrap();
        assert_eq!(frame.sequence(), 3);
        assert_eq!(frame.frame_index(), 0);
        assert!(frame.is_first());
        assert_eq!(frame.total_len(), Some(43));
        assert_eq!(frame.data(), &[0x00, 0x74, 0x40, 0xc0, 0xca, 0x97]);
    }

    #[test]
    fn test_later_frame_view() {
        let bytes = [0x66, 0xff, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff];
        let frame = FastPacketFrame::parse(&bytes).unwrap();
        assert_eq!(frame.sequence(), 3);
        assert_eq!(frame.frame_index(), 6);
        assert_eq!(frame.total_len(), None);
        assert_eq!(frame.data().len(), 7);
        assert_eq!(frame.data_offset(), 41);
    }

    #[test]
    fn test_truncated_frames() {
        assert!(FastPacketFrame::parse(&[]).is_none());

        let header_only = FastPacketFrame::parse(&[0x20]).unwrap();
        assert_eq!(header_only.total_len(), None);
        assert!(header_only.data().is_empty());
    }
}
