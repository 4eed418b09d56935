//! Parser for the text frame dumps written by the SocketCAN `candump` tool.
//!
//! Two layouts are understood:
//!
//! ```text
//! (1601234567.123456) can0 09F80115#A0B1C2D3E4F5A6B7
//!   can0  09F80115   [8]  A0 B1 C2 D3 E4 F5 A6 B7
//! ```
//!
//! The compact `id#data` form may also appear on its own.

use std::time::Duration;

use embedded_can::ExtendedId;
use thiserror::Error;

use crate::frame::RawFrame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CandumpError {
    #[error("unrecognised candump line: {0}")]
    Unrecognised(String),
    #[error("invalid CAN id '{0}'")]
    InvalidId(String),
    #[error("invalid data bytes '{0}'")]
    InvalidData(String),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandumpRecord {
    /// Time since the Unix epoch, present in `candump -l` logs
    pub timestamp: Option<Duration>,
    pub interface: Option<String>,
    pub frame: RawFrame,
}

/// Parse one line of a dump
///
/// # Returns
/// `Ok(None)` for blank lines and `#` comments
pub fn parse_line(line: &str) -> Result<Option<CandumpRecord>, CandumpError> {
    let mut rest = line.trim();
    if rest.is_empty() || rest.starts_with('#') {
        return Ok(None);
    }

    let mut timestamp = None;
    if let Some(stripped) = rest.strip_prefix('(') {
        let (seconds, tail) = stripped
            .split_once(')')
            .ok_or_else(|| CandumpError::Unrecognised(line.to_string()))?;
        timestamp = Some(parse_timestamp(seconds)?);
        rest = tail.trim_start();
    }

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (interface, frame) = match tokens.as_slice() {
        [compact] if compact.contains('#') => (None, parse_compact(compact)?),
        [interface, compact] if compact.contains('#') => {
            (Some(interface.to_string()), parse_compact(compact)?)
        }
        [interface, id, len, bytes @ ..] if len.starts_with('[') => {
            let frame = parse_spaced(id, len, bytes)?;
            (Some(interface.to_string()), frame)
        }
        _ => return Err(CandumpError::Unrecognised(line.to_string())),
    };

    Ok(Some(CandumpRecord {
        timestamp,
        interface,
        frame,
    }))
}

fn parse_timestamp(seconds: &str) -> Result<Duration, CandumpError> {
    seconds
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| CandumpError::InvalidTimestamp(seconds.to_string()))
}

fn parse_can_id(id: &str) -> Result<ExtendedId, CandumpError> {
    u32::from_str_radix(id, 16)
        .ok()
        .and_then(ExtendedId::new)
        .ok_or_else(|| CandumpError::InvalidId(id.to_string()))
}

fn parse_hex_bytes(hex: &str) -> Result<Vec<u8>, CandumpError> {
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(CandumpError::InvalidData(hex.to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CandumpError::InvalidData(hex.to_string()))
}

fn parse_compact(compact: &str) -> Result<RawFrame, CandumpError> {
    let (id, data) = compact
        .split_once('#')
        .ok_or_else(|| CandumpError::Unrecognised(compact.to_string()))?;
    let can_id = parse_can_id(id)?;
    let data = parse_hex_bytes(data)?;
    Ok(RawFrame::from_can_id(can_id, &data))
}

fn parse_spaced(id: &str, len: &str, bytes: &[&str]) -> Result<RawFrame, CandumpError> {
    let can_id = parse_can_id(id)?;
    let declared: usize = len
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|_| CandumpError::InvalidData(len.to_string()))?;
    let data = parse_hex_bytes(&bytes.concat())?;
    if data.len() != declared {
        return Err(CandumpError::InvalidData(bytes.join(" ")));
    }
    Ok(RawFrame::from_can_id(can_id, &data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_line() {
        let record = parse_line("(1601234567.250000) can0 09F80115#A0B1C2D3E4F5A6B7")
            .unwrap()
            .unwrap();

        assert_eq!(record.timestamp, Some(Duration::from_millis(1_601_234_567_250)));
        assert_eq!(record.interface.as_deref(), Some("can0"));
        assert_eq!(record.frame.pgn, 129025);
        assert_eq!(record.frame.source, 0x15);
        assert_eq!(
            record.frame.data,
            vec![0xA0, 0xB1, 0xC2, 0xD3, 0xE4, 0xF5, 0xA6, 0xB7]
        );
    }

    #[test]
    fn test_parse_compact_only() {
        let record = parse_line("09F80115#0102").unwrap().unwrap();
        assert_eq!(record.timestamp, None);
        assert_eq!(record.interface, None);
        assert_eq!(record.frame.data, vec![1, 2]);
    }

    #[test]
    fn test_parse_spaced_line() {
        let record = parse_line("  can1  09F80115   [3]  01 02 FF").unwrap().unwrap();
        assert_eq!(record.interface.as_deref(), Some("can1"));
        assert_eq!(record.frame.pgn, 129025);
        assert_eq!(record.frame.data, vec![1, 2, 0xff]);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# recorded on the dock"), Ok(None));
    }

    #[test]
    fn test_invalid_lines() {
        assert!(matches!(
            parse_line("hello world again"),
            Err(CandumpError::Unrecognised(_))
        ));
        assert!(matches!(
            parse_line("XYZ#0102"),
            Err(CandumpError::InvalidId(_))
        ));
        assert!(matches!(
            parse_line("09F80115#012"),
            Err(CandumpError::InvalidData(_))
        ));
        assert!(matches!(
            parse_line("(abc) can0 09F80115#01"),
            Err(CandumpError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_line("can0 09F80115 [2] 01"),
            Err(CandumpError::InvalidData(_))
        ));
        // Larger than 29 bits
        assert!(matches!(
            parse_line("3FFFFFFF#01"),
            Err(CandumpError::InvalidId(_))
        ));
    }
}
