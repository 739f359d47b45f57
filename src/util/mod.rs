//! # Utility Modules
//!
//! Hex helpers for capture files and table dumps, and bit helpers for the
//! packed flag words and bit-set arrays found in C12.19 tables.

pub mod bits;
pub mod hex;

pub use bits::{BitField, BitSet, OverlappingFields};
pub use hex::{decode_hex, encode_hex, format_hex_compact, log_table_hex, pretty_hex, HexError};
