//! # psem-tables - Versioned ANSI C12.19 Table Decoding
//!
//! The psem-tables crate decodes the numbered data tables of C12.19 meters
//! read over a PSEM transport. A table's byte layout depends on other tables
//! (formats and counts), on the firmware version and phase configuration of
//! the meter, and, for growing tables, on how many bytes the meter returns.
//!
//! ## Features
//!
//! - One decode function per table; its size is measured from the same
//!   function, so size formulas and parsers cannot drift apart
//! - Prerequisite tables resolved and cached through a [`TableSession`]
//! - Live tables (clock, present values) re-read on every access
//! - Growing tables decoded as far as the returned length allows, with
//!   impossible lengths rejected
//! - Offset reads of single fields without touching the cached table
//! - Replay of captured buffers with results identical to live reads
//! - Transport failures surfaced verbatim with the failing table attached
//!
//! ## Usage
//!
//! ```rust
//! use psem_tables::tables::standard::ActualRegisters;
//! use psem_tables::{MockTransport, TableDefinition, TableSession};
//!
//! let transport = MockTransport::new();
//! transport.set_table(ActualRegisters::KEY, vec![0x01, 0x00, 3, 4, 2, 1, 0, 2, 1, 1]);
//!
//! let session = TableSession::new(transport.clone());
//! let registers = session.table::<ActualRegisters>().unwrap();
//! assert!(registers.include_season_info());
//! assert_eq!(registers.nbr_tiers, 2);
//! ```

pub mod codec;
pub mod constants;
pub mod error;
pub mod logging;
pub mod psem;
pub mod table;
pub mod tables;
pub mod util;

pub use crate::error::{DecodeError, TableError, TableResult, TransportStatus};
pub use crate::logging::{init_logger, init_logger_with_level};

pub use codec::{NiFormat, TableReader, TableWriter, TimeAdjustment, TimeFormat};
pub use psem::{CaptureFile, MockTransport, OfflineTransport, TableTransport};
pub use table::{
    DeviceProfile, Dialect, FieldSlot, FirmwareVersion, PhaseConfig, SessionConfig, SizePolicy,
    TableDefinition, TableKey, TableSession, TableState,
};
pub use tables::records::{DataFormats, RegisterLayout};

/// Opens a capture file as an offline session.
///
/// # Arguments
/// * `path` - JSON capture file with hex-encoded table buffers
///
/// # Returns
/// * `Ok(TableSession)` - Session whose tables decode from the captured bytes
/// * `Err(TableError)` - The file could not be read or parsed
pub fn open_capture(path: impl AsRef<std::path::Path>) -> TableResult<TableSession> {
    Ok(CaptureFile::from_json_file(path)?.into_session())
}
