//! NMEA2000 Transport Library
//!
//! This library implements the transport layer of NMEA2000 marine data networks:
//! - Fast packet reassembly tolerant of out-of-order and duplicate frames
//! - Fast packet fragmentation with per-PGN sequence counters
//! - A stream reader that routes single-frame and fast packet PGNs
//! - A parser for SocketCAN `candump` text dumps
//!
//! # Example
//!
//! ```
//! use n2k_transport::{AssembledPacket, FrameFragmenter, FrameReassemblyTable};
//!
//! let packet = AssembledPacket::new(7, 129029, (0..43).collect());
//! let frames = FrameFragmenter::new().split(&packet).unwrap();
//!
//! let mut table = FrameReassemblyTable::new();
//! let done: Vec<_> = frames.into_iter().rev().filter_map(|f| table.add(f)).collect();
//! assert_eq!(done, vec![packet]);
//! ```

pub mod candump;
pub mod fast_packet;
pub mod fragmenter;
pub mod frame;
pub mod reassembly;
pub mod stream_reader;

// Re-export commonly used types
pub use candump::{CandumpError, CandumpRecord};
pub use fragmenter::{FragmentError, FrameFragmenter};
pub use frame::{AssembledPacket, RawFrame};
pub use reassembly::{FrameReassemblyTable, ReassemblyConfig, ReassemblyKey, ReassemblyStats};
pub use stream_reader::{DEFAULT_FAST_PACKET_PGNS, N2kStreamReader};

// Re-export external types for convenience
pub use embedded_can::ExtendedId;
