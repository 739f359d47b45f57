//! PSEM / C12.19 Protocol Constants
//!
//! This module defines constants used throughout the table decoders: table
//! numbers, the manufacturer table base, PSEM response codes and the bit
//! masks of the standard flag words, based on ANSI C12.19 / C12.18.

use std::time::Duration;

/// Manufacturer tables are numbered from this base (MT n == table 2048 + n).
pub const MFG_TABLE_BASE: u16 = 2048;

/// Timeout hint passed to the transport when neither the table nor the
/// session configuration supplies one.
pub const DEFAULT_TABLE_TIMEOUT: Duration = Duration::from_secs(5);

// ----------------------------------------------------------------------------
// Standard table numbers
// ----------------------------------------------------------------------------

pub const ST_GENERAL_CONFIG: u16 = 0;
pub const ST_MANUFACTURER_IDENT: u16 = 1;
pub const ST_END_DEVICE_STATUS: u16 = 3;
pub const ST_ACTUAL_REGISTER: u16 = 21;
pub const ST_DATA_SELECTION: u16 = 22;
pub const ST_CURRENT_REGISTER_DATA: u16 = 23;
pub const ST_PREVIOUS_SEASON_DATA: u16 = 24;
pub const ST_PREVIOUS_DEMAND_RESET_DATA: u16 = 25;
pub const ST_SELF_READ_DATA: u16 = 26;
pub const ST_PRESENT_REGISTER_SELECT: u16 = 27;
pub const ST_PRESENT_REGISTER_DATA: u16 = 28;
pub const ST_CLOCK: u16 = 52;

// ----------------------------------------------------------------------------
// Manufacturer table numbers (offset from MFG_TABLE_BASE)
// ----------------------------------------------------------------------------

pub const MT_METROLOGY_BLURT: u16 = 69;
pub const MT_DEVICE_STATUS: u16 = 70;
pub const MT_COMM_MODULE: u16 = 100;

/// Byte offset of the comm module status sub-table inside MT 100.
pub const MT_COMM_MODULE_STATUS_OFFSET: u32 = 128;

// ----------------------------------------------------------------------------
// PSEM response codes (C12.18 / C12.21)
// ----------------------------------------------------------------------------

pub const PSEM_OK: u8 = 0x00;
pub const PSEM_ERR: u8 = 0x01;
pub const PSEM_SNS: u8 = 0x02;
pub const PSEM_ISC: u8 = 0x03;
pub const PSEM_ONP: u8 = 0x04;
pub const PSEM_IAR: u8 = 0x05;
pub const PSEM_BSY: u8 = 0x06;
pub const PSEM_DNR: u8 = 0x07;
pub const PSEM_DLK: u8 = 0x08;
pub const PSEM_RNO: u8 = 0x09;
pub const PSEM_ISSS: u8 = 0x0A;

// ----------------------------------------------------------------------------
// ST0 format control masks
// ----------------------------------------------------------------------------

pub const FORMAT1_DATA_ORDER_MASK: u8 = 0x01;
pub const FORMAT1_CHAR_FORMAT_MASK: u8 = 0x0E;
pub const FORMAT1_MODEL_SELECT_MASK: u8 = 0x70;

pub const FORMAT2_TM_FORMAT_MASK: u8 = 0x07;
pub const FORMAT2_DATA_ACCESS_MASK: u8 = 0x18;
pub const FORMAT2_ID_FORM_MASK: u8 = 0x20;
pub const FORMAT2_INT_FORMAT_MASK: u8 = 0xC0;

pub const FORMAT3_NI_FORMAT1_MASK: u8 = 0x0F;
pub const FORMAT3_NI_FORMAT2_MASK: u8 = 0xF0;

// ----------------------------------------------------------------------------
// ST21 / ST26 / ST52 multi-bit fields
// ----------------------------------------------------------------------------

pub const REG_FUNC2_SELF_READ_DEMAND_RESET_MASK: u8 = 0x30;

pub const TIME_DATE_QUAL_DAY_OF_WEEK_MASK: u8 = 0x07;
