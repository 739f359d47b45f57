//! ST0 General Configuration Table.
//!
//! ST0 describes every other table: data formats, which tables and
//! procedures exist, and the dimensions of its own trailing sets. Its length
//! follows from those dimensions, so it is read with a minimum size and
//! decoded as far as the dimensions say.

use crate::codec::{NiFormat, TableReader, TimeFormat};
use crate::constants::*;
use crate::error::{DecodeError, DecodeResult, TableError, TableResult};
use crate::table::{SizePolicy, TableDefinition, TableKey, TableSession};
use crate::tables::records::DataFormats;
use crate::util::{BitField, BitSet};
use serde::Serialize;

pub const DATA_ORDER: BitField = BitField::new("DATA_ORDER", FORMAT1_DATA_ORDER_MASK as u32);
pub const CHAR_FORMAT: BitField = BitField::new("CHAR_FORMAT", FORMAT1_CHAR_FORMAT_MASK as u32);
pub const MODEL_SELECT: BitField = BitField::new("MODEL_SELECT", FORMAT1_MODEL_SELECT_MASK as u32);

pub const TM_FORMAT: BitField = BitField::new("TM_FORMAT", FORMAT2_TM_FORMAT_MASK as u32);
pub const DATA_ACCESS_METHOD: BitField = BitField::new("DATA_ACCESS_METHOD", FORMAT2_DATA_ACCESS_MASK as u32);
pub const ID_FORM: BitField = BitField::new("ID_FORM", FORMAT2_ID_FORM_MASK as u32);
pub const INT_FORMAT: BitField = BitField::new("INT_FORMAT", FORMAT2_INT_FORMAT_MASK as u32);

pub const NI_FORMAT1: BitField = BitField::new("NI_FORMAT1", FORMAT3_NI_FORMAT1_MASK as u32);
pub const NI_FORMAT2: BitField = BitField::new("NI_FORMAT2", FORMAT3_NI_FORMAT2_MASK as u32);

pub const FORMAT_CONTROL_1_FIELDS: [BitField; 3] = [DATA_ORDER, CHAR_FORMAT, MODEL_SELECT];
pub const FORMAT_CONTROL_2_FIELDS: [BitField; 4] = [TM_FORMAT, DATA_ACCESS_METHOD, ID_FORM, INT_FORMAT];
pub const FORMAT_CONTROL_3_FIELDS: [BitField; 2] = [NI_FORMAT1, NI_FORMAT2];

/// Fixed header bytes before the dimensioned sets.
pub const HEADER_LEN: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralConfig {
    pub format_control_1: u8,
    pub format_control_2: u8,
    pub format_control_3: u8,
    pub device_class: [u8; 4],
    pub nameplate_type: u8,
    pub default_set_used: u8,
    pub max_proc_parm_length: u8,
    pub max_resp_data_len: u8,
    pub std_version_no: u8,
    pub std_revision_no: u8,
    pub dim_std_tbls_used: u8,
    pub dim_mfg_tbls_used: u8,
    pub dim_std_proc_used: u8,
    pub dim_mfg_proc_used: u8,
    pub dim_mfg_status_used: u8,
    pub nbr_pending: u8,
    pub std_tbls_used: Option<BitSet>,
    pub mfg_tbls_used: Option<BitSet>,
    pub std_proc_used: Option<BitSet>,
    pub mfg_proc_used: Option<BitSet>,
    pub std_tbls_write: Option<BitSet>,
    pub mfg_tbls_write: Option<BitSet>,
}

fn set_contains(set: &Option<BitSet>, index: u16) -> bool {
    set.as_ref()
        .is_some_and(|set| usize::from(index) < set.len() && set.get(usize::from(index)))
}

impl GeneralConfig {
    pub fn time_format(&self) -> DecodeResult<TimeFormat> {
        TimeFormat::from_code(TM_FORMAT.extract(u32::from(self.format_control_2)) as u8)
    }

    pub fn ni_format1(&self) -> DecodeResult<NiFormat> {
        NiFormat::from_code(NI_FORMAT1.extract(u32::from(self.format_control_3)) as u8)
    }

    pub fn ni_format2(&self) -> DecodeResult<NiFormat> {
        NiFormat::from_code(NI_FORMAT2.extract(u32::from(self.format_control_3)) as u8)
    }

    /// Serial numbers are BCD rather than characters.
    pub fn id_form_bcd(&self) -> bool {
        ID_FORM.extract(u32::from(self.format_control_2)) != 0
    }

    pub fn big_endian(&self) -> bool {
        DATA_ORDER.extract(u32::from(self.format_control_1)) != 0
    }

    pub fn data_access_method(&self) -> u8 {
        DATA_ACCESS_METHOD.extract(u32::from(self.format_control_2)) as u8
    }

    /// Formats every register table is encoded with.
    pub fn data_formats(&self) -> DecodeResult<DataFormats> {
        if self.big_endian() {
            return Err(DecodeError::invalid(
                "DATA_ORDER",
                "most-significant-byte-first tables are not supported",
            ));
        }
        Ok(DataFormats {
            time: self.time_format()?,
            ni1: self.ni_format1()?,
            ni2: self.ni_format2()?,
        })
    }

    pub fn is_std_table_used(&self, table: u16) -> bool {
        set_contains(&self.std_tbls_used, table)
    }

    pub fn is_mfg_table_used(&self, table: u16) -> bool {
        set_contains(&self.mfg_tbls_used, table)
    }

    pub fn is_std_proc_used(&self, procedure: u16) -> bool {
        set_contains(&self.std_proc_used, procedure)
    }

    pub fn is_mfg_proc_used(&self, procedure: u16) -> bool {
        set_contains(&self.mfg_proc_used, procedure)
    }

    pub fn is_std_table_writable(&self, table: u16) -> bool {
        set_contains(&self.std_tbls_write, table)
    }

    pub fn is_mfg_table_writable(&self, table: u16) -> bool {
        set_contains(&self.mfg_tbls_write, table)
    }

    /// Whether the device implements the table behind `key`.
    pub fn is_table_used(&self, key: TableKey) -> bool {
        if key.is_manufacturer() {
            self.is_mfg_table_used(key.number())
        } else {
            self.is_std_table_used(key.number())
        }
    }
}

/// Resolves the register data formats of a session.
pub fn session_formats(session: &TableSession) -> TableResult<DataFormats> {
    session
        .table::<GeneralConfig>()?
        .data_formats()
        .map_err(|err| TableError::decode(GeneralConfig::KEY, err))
}

impl TableDefinition for GeneralConfig {
    type Deps = ();
    const KEY: TableKey = TableKey::standard(ST_GENERAL_CONFIG);
    const NAME: &'static str = "General Configuration";

    fn dependencies(_session: &TableSession) -> TableResult<()> {
        Ok(())
    }

    fn size(_deps: &()) -> TableResult<SizePolicy> {
        Ok(SizePolicy::Resizable {
            minimum: HEADER_LEN,
        })
    }

    fn decode(r: &mut TableReader<'_>, _deps: &()) -> DecodeResult<Self> {
        let format_control_1 = r.u8()?;
        let format_control_2 = r.u8()?;
        let format_control_3 = r.u8()?;
        let device_class = r.array_of::<4>()?;
        let nameplate_type = r.u8()?;
        let default_set_used = r.u8()?;
        let max_proc_parm_length = r.u8()?;
        let max_resp_data_len = r.u8()?;
        let std_version_no = r.u8()?;
        let std_revision_no = r.u8()?;
        let dim_std_tbls_used = r.u8()?;
        let dim_mfg_tbls_used = r.u8()?;
        let dim_std_proc_used = r.u8()?;
        let dim_mfg_proc_used = r.u8()?;
        let dim_mfg_status_used = r.u8()?;
        let nbr_pending = r.u8()?;

        let bits = |dim: u8| usize::from(dim) * 8;
        Ok(Self {
            format_control_1,
            format_control_2,
            format_control_3,
            device_class,
            nameplate_type,
            default_set_used,
            max_proc_parm_length,
            max_resp_data_len,
            std_version_no,
            std_revision_no,
            dim_std_tbls_used,
            dim_mfg_tbls_used,
            dim_std_proc_used,
            dim_mfg_proc_used,
            dim_mfg_status_used,
            nbr_pending,
            std_tbls_used: r.bit_set(bits(dim_std_tbls_used))?,
            mfg_tbls_used: r.bit_set(bits(dim_mfg_tbls_used))?,
            std_proc_used: r.bit_set(bits(dim_std_proc_used))?,
            mfg_proc_used: r.bit_set(bits(dim_mfg_proc_used))?,
            std_tbls_write: r.bit_set(bits(dim_std_tbls_used))?,
            mfg_tbls_write: r.bit_set(bits(dim_mfg_tbls_used))?,
        })
    }
}
