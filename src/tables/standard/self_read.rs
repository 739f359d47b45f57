//! ST26 Self Read Data Table.
//!
//! The self-read list is a fixed array of NBR_SELF_READS entries of which
//! only NBR_VALID_ENTRIES hold data. LAST_ENTRY_ELEMENT is the array index of
//! the newest entry; in a circular list older entries precede it, wrapping
//! around the end of the array.

use crate::codec::TableReader;
use crate::constants::ST_SELF_READ_DATA;
use crate::error::{DecodeError, DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::tables::records::{Record, RegisterLayout, SelfReadRecord};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// LIST_STATUS
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ListStatus: u8 {
        /// Entries are kept in descending order.
        const ORDER = 0x01;
        const OVERFLOW = 0x02;
        /// Circular list rather than FIFO.
        const LIST_TYPE = 0x04;
        const INHIBIT_OVERFLOW = 0x08;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfReadData {
    pub list_status: ListStatus,
    pub nbr_valid_entries: u8,
    pub last_entry_element: u8,
    pub last_entry_seq_nbr: u16,
    pub nbr_unread_entries: u8,
    pub entries: Option<Vec<SelfReadRecord>>,
}

impl SelfReadData {
    /// Entries holding data, oldest first.
    ///
    /// The count is `min(NBR_VALID_ENTRIES, NBR_SELF_READS)`; the newest
    /// entry sits at LAST_ENTRY_ELEMENT and the others precede it, wrapping
    /// around the array end. A full list yields every entry.
    pub fn valid_entries(&self) -> Vec<&SelfReadRecord> {
        let Some(entries) = &self.entries else {
            return Vec::new();
        };
        let len = entries.len();
        let valid = usize::from(self.nbr_valid_entries).min(len);
        if valid == 0 {
            return Vec::new();
        }
        let newest = usize::from(self.last_entry_element);
        let oldest = (newest + len + 1 - valid) % len;
        (0..valid).map(|i| &entries[(oldest + i) % len]).collect()
    }

    pub fn newest(&self) -> Option<&SelfReadRecord> {
        self.valid_entries().last().copied()
    }
}

impl TableDefinition for SelfReadData {
    type Deps = RegisterLayout;
    const KEY: TableKey = TableKey::standard(ST_SELF_READ_DATA);
    const NAME: &'static str = "Self Read Data";

    fn dependencies(session: &TableSession) -> TableResult<RegisterLayout> {
        RegisterLayout::resolve(session)
    }

    fn decode(r: &mut TableReader<'_>, layout: &RegisterLayout) -> DecodeResult<Self> {
        let list_status = ListStatus::from_bits_retain(r.u8()?);
        let nbr_valid_entries = r.u8()?;
        let last_entry_element = r.u8()?;
        let last_entry_seq_nbr = r.u16()?;
        let nbr_unread_entries = r.u8()?;
        let nbr_self_reads = layout.registers.nbr_self_reads;

        if nbr_valid_entries > 0 && last_entry_element >= nbr_self_reads {
            return Err(DecodeError::invalid(
                "LAST_ENTRY_ELEMENT",
                format!("{last_entry_element} outside a list of {nbr_self_reads} entries"),
            ));
        }

        Ok(Self {
            list_status,
            nbr_valid_entries,
            last_entry_element,
            last_entry_seq_nbr,
            nbr_unread_entries,
            entries: r.array(usize::from(nbr_self_reads), |r| SelfReadRecord::parse(r, layout))?,
        })
    }
}
