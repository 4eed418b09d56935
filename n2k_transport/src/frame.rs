use std::fmt;

use embedded_can::ExtendedId;
use nmea2000::Identifier;

fn format_data_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single frame as it travels on the CAN bus.
///
/// The payload is normally at most 8 bytes. Lower layers that already
/// reassemble fast packets may hand over longer payloads; those are passed
/// through untouched by the reassembly table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub source: u8,
    pub pgn: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(source: u8, pgn: u32, data: Vec<u8>) -> Self {
        Self { source, pgn, data }
    }

    /// Build a frame from a 29-bit extended CAN identifier and its data bytes
    pub fn from_can_id(can_id: ExtendedId, data: &[u8]) -> Self {
        let identifier = Identifier::from_can_id(can_id);
        Self {
            source: identifier.source(),
            pgn: identifier.pgn(),
            data: data.to_vec(),
        }
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PGN {} from {}: [{}]",
            self.pgn,
            self.source,
            format_data_bytes(&self.data)
        )
    }
}

/// A complete application payload together with the address and PGN of the
/// frames it was assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPacket {
    pub source: u8,
    pub pgn: u32,
    pub data: Vec<u8>,
}

impl AssembledPacket {
    pub fn new(source: u8, pgn: u32, data: Vec<u8>) -> Self {
        Self { source, pgn, data }
    }
}

impl From<RawFrame> for AssembledPacket {
    fn from(frame: RawFrame) -> Self {
        Self {
            source: frame.source,
            pgn: frame.pgn,
            data: frame.data,
        }
    }
}

impl fmt::Display for AssembledPacket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PGN {} from {} ({} bytes): [{}]",
            self.pgn,
            self.source,
            self.data.len(),
            format_data_bytes(&self.data)
        )
    }
}
