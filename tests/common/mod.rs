//! Meter fixtures shared by the integration tests.
#![allow(dead_code)]

use psem_tables::tables::standard::{ActualRegisters, GeneralConfig};
use psem_tables::{MockTransport, TableDefinition, TableWriter};

/// TM_FORMAT 4 (seconds since 1970), NI_FORMAT1 INT32, NI_FORMAT2 INT24.
pub const FORMAT_CONTROL_2: u8 = 0x04;
pub const FORMAT_CONTROL_3: u8 = 0x78;

/// The ST21 buffer from the simple fixed-table scenario.
pub const SIMPLE_REGISTERS: [u8; 10] = [0x01, 0x00, 3, 4, 2, 1, 0, 2, 1, 1];

/// SEASON_INFO | DATE_TIME | DEMAND_RESET_CTR | CUM_DEMAND, SELF_READ_SEQ_NBR,
/// 2 self reads, 1 summation, 1 demand, 1 coincident, 1 occurrence, 1 tier,
/// 1 present demand, 2 present values.
pub const RICH_REGISTERS: [u8; 10] = [0x17, 0x02, 2, 1, 1, 1, 1, 1, 1, 2];

/// Sizes under RICH_REGISTERS and the fixture formats.
pub const RICH_REGISTER_DATA_LEN: usize = 37;
pub const RICH_SNAPSHOT_LEN: usize = 42;
pub const RICH_SELF_READ_LEN: usize = 44;

/// ST0 with no table or procedure sets.
pub fn general_config(format_control_2: u8, format_control_3: u8) -> Vec<u8> {
    let mut w = TableWriter::new();
    w.u8(0x00)
        .u8(format_control_2)
        .u8(format_control_3)
        .bytes(b"ELEC")
        .u8(0)
        .u8(1)
        .u8(16)
        .u8(255)
        .u8(2)
        .u8(0)
        .zeros(5)
        .u8(0);
    w.into_bytes()
}

/// Mock meter serving ST0 (fixture formats) and the given ST21.
pub fn meter(registers: [u8; 10]) -> MockTransport {
    let mock = MockTransport::new();
    mock.set_table(
        GeneralConfig::KEY,
        general_config(FORMAT_CONTROL_2, FORMAT_CONTROL_3),
    );
    mock.set_table(ActualRegisters::KEY, registers.to_vec());
    mock
}

/// One RICH_REGISTERS register data record:
/// resets, summation, event time, cum demand, demand, coincident, then one tier.
pub fn rich_register_data(w: &mut TableWriter, base: i32) {
    w.u8(3);
    for block in 0..2 {
        let v = base + block * 100;
        w.i32(v)
            .u32(1_700_000_000 + v as u32)
            .i32(v + 1)
            .i24(v + 2)
            .i24(v + 3);
    }
}
