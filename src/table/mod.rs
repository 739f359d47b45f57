//! # Table Descriptors
//!
//! A table is described once, by a type implementing [`TableDefinition`]:
//! its identity, its prerequisites, and a single decode function. The byte
//! size of the table is derived from that same decode function by running it
//! over a measuring reader, so size resolution and parsing share one field
//! plan.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let session = TableSession::new(transport);
//! let registers = session.table::<ActualRegisters>()?;   // fetched once
//! let data = session.table::<CurrentRegisterData>()?;    // ST0 and ST21 resolved first
//! ```

pub mod session;
pub mod version;

pub use session::{FieldSlot, TableSession};
pub use version::{DeviceProfile, Dialect, FirmwareVersion, PhaseConfig, SessionConfig};

use crate::codec::{measure, Measured, TableReader, TableWriter};
use crate::constants::MFG_TABLE_BASE;
use crate::error::{DecodeResult, TableError, TableResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identity of a table: its numeric id and, for sub-tables, the byte offset
/// of its region inside the parent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub id: u16,
    #[serde(default)]
    pub offset: u32,
}

impl TableKey {
    pub const fn standard(number: u16) -> Self {
        Self { id: number, offset: 0 }
    }

    pub const fn manufacturer(number: u16) -> Self {
        Self {
            id: MFG_TABLE_BASE + number,
            offset: 0,
        }
    }

    /// A region of `parent` starting at `offset`.
    pub const fn sub_table(parent: TableKey, offset: u32) -> Self {
        Self {
            id: parent.id,
            offset: parent.offset + offset,
        }
    }

    pub const fn is_manufacturer(&self) -> bool {
        self.id >= MFG_TABLE_BASE
    }

    pub const fn is_sub_table(&self) -> bool {
        self.offset != 0
    }

    /// Table number within its standard or manufacturer range.
    pub const fn number(&self) -> u16 {
        if self.is_manufacturer() {
            self.id - MFG_TABLE_BASE
        } else {
            self.id
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_manufacturer() { "MT" } else { "ST" };
        write!(f, "{prefix}{}", self.number())?;
        if self.is_sub_table() {
            write!(f, "@{}", self.offset)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for TableKey {
    type Err = String;

    /// Parses `ST23`, `MT70` or `MT100@128`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let (base, offset) = match upper.split_once('@') {
            Some((base, offset)) => (
                base.to_string(),
                offset
                    .parse::<u32>()
                    .map_err(|_| format!("invalid sub-table offset in {s:?}"))?,
            ),
            None => (upper.clone(), 0),
        };
        // ST and MT numbers share one 16-bit id space split at MFG_TABLE_BASE
        let parse_number = |digits: &str| {
            digits
                .parse::<u16>()
                .ok()
                .filter(|n| *n < MFG_TABLE_BASE)
                .ok_or_else(|| format!("invalid table number in {s:?}"))
        };
        let key = if let Some(n) = base.strip_prefix("MT") {
            TableKey::manufacturer(parse_number(n)?)
        } else if let Some(n) = base.strip_prefix("ST") {
            TableKey::standard(parse_number(n)?)
        } else {
            return Err(format!("expected ST<n> or MT<n>, got {s:?}"));
        };
        Ok(TableKey::sub_table(key, offset))
    }
}

/// How many bytes a read must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Exactly this many bytes.
    Fixed(usize),
    /// At least `minimum` bytes; anything beyond is decoded as far as the
    /// optional sections allow.
    Resizable { minimum: usize },
}

impl SizePolicy {
    pub fn minimum(&self) -> usize {
        match self {
            Self::Fixed(len) => *len,
            Self::Resizable { minimum } => *minimum,
        }
    }

    pub fn is_resizable(&self) -> bool {
        matches!(self, Self::Resizable { .. })
    }
}

impl From<Measured> for SizePolicy {
    fn from(measured: Measured) -> Self {
        if measured.growable {
            Self::Resizable {
                minimum: measured.len,
            }
        } else {
            Self::Fixed(measured.len)
        }
    }
}

/// Decoding state of a table slot in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TableState {
    #[default]
    Unloaded,
    Loaded,
    /// Was loaded, then invalidated; the next access reads again.
    Expired,
}

/// Layout and identity of one table.
///
/// `decode` is the only place a layout is written down. The default `size`
/// measures it, so a table needs to override `size` only when its length is
/// not implied by its fields (self-describing tables read with a minimum).
pub trait TableDefinition: Sized + 'static {
    /// Prerequisite data resolved from the session before sizing or decoding.
    type Deps;

    const KEY: TableKey;
    const NAME: &'static str;
    /// Transport timeout hint; the session default applies when `None`.
    const TIMEOUT: Option<Duration> = None;
    /// Live tables are fetched on every access, whatever their state.
    const LIVE: bool = false;

    fn dependencies(session: &TableSession) -> TableResult<Self::Deps>;

    fn size(deps: &Self::Deps) -> TableResult<SizePolicy> {
        measure(|reader| Self::decode(reader, deps).map(drop))
            .map(SizePolicy::from)
            .map_err(|err| TableError::decode(Self::KEY, err))
    }

    fn decode(reader: &mut TableReader<'_>, deps: &Self::Deps) -> DecodeResult<Self>;

    fn encode(&self, _writer: &mut TableWriter, _deps: &Self::Deps) -> TableResult<()> {
        Err(TableError::UnsupportedOperation {
            table: Self::KEY,
            operation: "write",
        })
    }

    /// Decodes a complete buffer without consulting the size policy.
    fn from_bytes(bytes: &[u8], deps: &Self::Deps) -> TableResult<Self> {
        let mut reader = TableReader::new(bytes);
        Self::decode(&mut reader, deps).map_err(|err| TableError::decode(Self::KEY, err))
    }
}

/// Encodes `table` into a fresh buffer.
pub fn encode_table<T: TableDefinition>(table: &T, deps: &T::Deps) -> TableResult<Vec<u8>> {
    let mut writer = TableWriter::new();
    table.encode(&mut writer, deps)?;
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(TableKey::standard(23).to_string(), "ST23");
        assert_eq!(TableKey::manufacturer(70).to_string(), "MT70");
        let sub = TableKey::sub_table(TableKey::manufacturer(100), 128);
        assert_eq!(sub.to_string(), "MT100@128");
        assert!(sub.is_sub_table());
        assert_eq!(sub.number(), 100);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!("st23".parse::<TableKey>().unwrap(), TableKey::standard(23));
        assert_eq!(
            "MT100@128".parse::<TableKey>().unwrap(),
            TableKey::sub_table(TableKey::manufacturer(100), 128)
        );
        assert!("XT1".parse::<TableKey>().is_err());
        assert!("ST".parse::<TableKey>().is_err());
    }

    #[test]
    fn test_key_parse_rejects_numbers_outside_their_range() {
        assert_eq!(
            "MT2047".parse::<TableKey>().unwrap(),
            TableKey::manufacturer(2047)
        );
        assert!("MT2048".parse::<TableKey>().is_err());
        assert!("MT65000".parse::<TableKey>().is_err());
        assert!(!"ST2047".parse::<TableKey>().unwrap().is_manufacturer());
        assert!("ST2048".parse::<TableKey>().is_err());
        assert!("ST3000".parse::<TableKey>().is_err());
    }

    #[test]
    fn test_measured_policy() {
        let fixed = SizePolicy::from(Measured {
            len: 10,
            growable: false,
        });
        assert_eq!(fixed, SizePolicy::Fixed(10));
        let growing = SizePolicy::from(Measured {
            len: 9,
            growable: true,
        });
        assert_eq!(growing, SizePolicy::Resizable { minimum: 9 });
        assert_eq!(growing.minimum(), 9);
    }
}
