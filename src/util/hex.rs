//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers used for capture files (raw table buffers are stored as hex
//! strings) and for dumping table buffers to the log.
//!
//! ## Usage
//!
//! ```rust
//! use psem_tables::util::hex::{decode_hex, encode_hex};
//!
//! let data = [0x01, 0x00, 0x03, 0x04];
//! let hex_str = encode_hex(&data);
//! assert_eq!(hex_str, "01000304");
//! assert_eq!(decode_hex("01 00 03 04").unwrap(), data);
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex string to bytes
///
/// Accepts both uppercase and lowercase hex characters. Whitespace is
/// stripped, so dumps copied from a log line decode as well. An empty string
/// decodes to an empty buffer (a zero-length table).
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "01 00 03 04" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pretty-print a table buffer as offset-prefixed lines
///
/// Offsets are table byte offsets, which is what layout comparisons against
/// the standard need.
pub fn pretty_hex(data: &[u8], bytes_per_line: usize) -> String {
    let bytes_per_line = bytes_per_line.max(1);
    data.chunks(bytes_per_line)
        .enumerate()
        .map(|(i, chunk)| format!("{:04x}: {}", i * bytes_per_line, format_hex_compact(chunk)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Log a table buffer in hex at debug level
///
/// Output is capped so large tables (self reads, load profile) do not flood
/// the log.
pub fn log_table_hex(prefix: &str, data: &[u8]) {
    const MAX_LOG_BYTES: usize = 64;

    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let display_data = &data[..data.len().min(MAX_LOG_BYTES)];
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };

    log::debug!("{prefix}: {}{suffix}", format_hex_compact(display_data));
}
