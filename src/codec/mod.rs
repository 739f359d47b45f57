//! # Primitive Table Codec
//!
//! The reader and writer for the fixed-width fields C12.19 tables are built
//! from: little-endian integers of 1 to 8 bytes, IEEE floats, raw byte and
//! character arrays, bit sets, packed time values and the NI numeric formats.
//!
//! Every table and record decoder is written against [`TableReader`]. The
//! same decoder run over a *measuring* reader yields the byte size of the
//! layout, so size formulas are never maintained separately from parsing.

pub mod ni;
pub mod reader;
pub mod time;
pub mod writer;

pub use ni::NiFormat;
pub use reader::{measure, Measured, TableReader};
pub use time::{to_local, TimeAdjustment, TimeFormat};
pub use writer::TableWriter;
