//! Standard tables decoded through a session against a scripted meter.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use psem_tables::tables::records::{Record, SelfReadRecord};
use psem_tables::tables::standard::*;
use psem_tables::{
    MockTransport, RegisterLayout, SizePolicy, TableDefinition, TableError, TableSession,
    TableWriter,
};

#[test]
fn test_simple_actual_register_table() {
    let session = TableSession::new(meter(SIMPLE_REGISTERS));
    let regs = session.table::<ActualRegisters>().unwrap();

    assert!(regs.include_season_info());
    assert!(!regs.include_date_time());
    assert_eq!(regs.nbr_self_reads, 3);
    assert_eq!(regs.nbr_tiers, 2);
    assert_eq!(
        session.size_of::<ActualRegisters>().unwrap(),
        SizePolicy::Fixed(10)
    );
}

#[test]
fn test_data_selection_sized_from_actual_registers() {
    let mock = meter([0x00, 0x00, 0, 0, 2, 0, 0, 0, 0, 0]);
    mock.set_table(DataSelection::KEY, vec![5, 6, 0b0000_0010]);
    let session = TableSession::new(mock.clone());

    assert_eq!(session.size_of::<DataSelection>().unwrap(), SizePolicy::Fixed(3));

    let selection = session.table::<DataSelection>().unwrap();
    assert_eq!(selection.demand_select, Some(vec![5, 6]));
    assert_eq!(selection.summation_select, None);
    assert_eq!(selection.coincident_select, None);
    let flags = selection.min_or_max_flags.as_ref().unwrap();
    assert_eq!(flags.len(), 2);
    assert_eq!(flags.as_bytes(), &[0b0000_0010]);
    assert!(!selection.is_maximum(0));
    assert!(selection.is_maximum(1));
    assert!(!selection.is_maximum(2));
}

#[test]
fn test_zero_counts_yield_absent_fields() {
    let mock = meter([0x00; 10]);
    mock.set_table(DataSelection::KEY, Vec::new());
    mock.set_table(CurrentRegisterData::KEY, Vec::new());
    let session = TableSession::new(mock);

    let selection = session.table::<DataSelection>().unwrap();
    assert_eq!(selection.summation_select, None);
    assert_eq!(selection.demand_select, None);
    assert_eq!(selection.min_or_max_flags, None);
    assert_eq!(selection.coin_demand_assoc, None);

    let data = session.table::<CurrentRegisterData>().unwrap();
    assert_eq!(data.data.nbr_demand_resets, None);
    assert_eq!(data.data.tot_data_block.summations, None);
    assert_eq!(data.data.tier_data_blocks, None);
}

fn rich_meter() -> MockTransport {
    meter(RICH_REGISTERS)
}

#[test]
fn test_current_register_data_rich_layout() {
    let mock = rich_meter();
    let mut w = TableWriter::new();
    rich_register_data(&mut w, 1000);
    assert_eq!(w.len(), RICH_REGISTER_DATA_LEN);
    mock.set_table(CurrentRegisterData::KEY, w.into_bytes());
    let session = TableSession::new(mock);

    assert_eq!(
        session.size_of::<CurrentRegisterData>().unwrap(),
        SizePolicy::Fixed(RICH_REGISTER_DATA_LEN)
    );

    let data = &session.table::<CurrentRegisterData>().unwrap().data;
    assert_eq!(data.nbr_demand_resets, Some(3));

    let total = &data.tot_data_block;
    assert_eq!(total.summations, Some(vec![1000.0]));
    let demand = &total.demands.as_ref().unwrap()[0];
    assert_eq!(
        demand.event_times,
        Some(vec![Some(Utc.timestamp_opt(1_700_001_000, 0).unwrap())])
    );
    assert_eq!(demand.cum_demand, Some(1001.0));
    assert_eq!(demand.cont_cum_demand, None);
    assert_eq!(demand.demands, Some(vec![1002.0]));
    assert_eq!(
        total.coincidents.as_ref().unwrap()[0].coincident_values,
        Some(vec![1003.0])
    );

    let tiers = data.tier_data_blocks.as_ref().unwrap();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].summations, Some(vec![1100.0]));
}

#[test]
fn test_register_snapshots_carry_date_and_season() {
    let mock = rich_meter();
    for (key, base) in [(PreviousSeasonData::KEY, 2000), (PreviousDemandResetData::KEY, 3000)] {
        let mut w = TableWriter::new();
        w.u32(1_690_000_000).u8(2);
        rich_register_data(&mut w, base);
        mock.set_table(key, w.into_bytes());
    }
    let session = TableSession::new(mock);

    assert_eq!(
        session.size_of::<PreviousSeasonData>().unwrap().minimum(),
        RICH_SNAPSHOT_LEN
    );

    let season = session.table::<PreviousSeasonData>().unwrap();
    assert_eq!(
        season.snapshot.end_date_time,
        Some(Utc.timestamp_opt(1_690_000_000, 0).unwrap())
    );
    assert_eq!(season.snapshot.season, Some(2));
    assert_eq!(
        season.snapshot.register_data.tot_data_block.summations,
        Some(vec![2000.0])
    );

    let reset = session.table::<PreviousDemandResetData>().unwrap();
    assert_eq!(
        reset.snapshot.register_data.tot_data_block.summations,
        Some(vec![3000.0])
    );
}

fn self_read_table(valid: u8, last_element: u8) -> Vec<u8> {
    let mut w = TableWriter::new();
    w.u8(0x04).u8(valid).u8(last_element).u16(41).u8(1);
    for (seq, base) in [(40u16, 4000), (41, 5000)] {
        w.u16(seq).u32(1_680_000_000).u8(1);
        rich_register_data(&mut w, base);
    }
    w.into_bytes()
}

#[test]
fn test_self_read_list_wraps_to_newest() {
    let mock = rich_meter();
    mock.set_table(SelfReadData::KEY, self_read_table(2, 0));
    let session = TableSession::new(mock.clone());

    let layout = RegisterLayout::resolve(&session).unwrap();
    assert_eq!(SelfReadRecord::size(&layout).unwrap(), RICH_SELF_READ_LEN);
    assert_eq!(
        session.size_of::<SelfReadData>().unwrap(),
        SizePolicy::Fixed(6 + 2 * RICH_SELF_READ_LEN)
    );

    let self_reads = session.table::<SelfReadData>().unwrap();
    assert!(self_reads.list_status.contains(ListStatus::LIST_TYPE));
    let order: Vec<Option<u16>> = self_reads
        .valid_entries()
        .iter()
        .map(|entry| entry.self_read_seq_nbr)
        .collect();
    // newest at element 0, so element 1 is older
    assert_eq!(order, vec![Some(41), Some(40)]);
    assert_eq!(self_reads.newest().unwrap().self_read_seq_nbr, Some(40));

    mock.set_table(SelfReadData::KEY, self_read_table(1, 1));
    session.invalidate::<SelfReadData>();
    let self_reads = session.table::<SelfReadData>().unwrap();
    assert_eq!(self_reads.valid_entries().len(), 1);
    assert_eq!(self_reads.newest().unwrap().self_read_seq_nbr, Some(41));

    mock.set_table(SelfReadData::KEY, self_read_table(0, 9));
    session.invalidate::<SelfReadData>();
    assert!(session.table::<SelfReadData>().unwrap().valid_entries().is_empty());
}

#[test]
fn test_self_read_last_element_out_of_range() {
    let mock = rich_meter();
    mock.set_table(SelfReadData::KEY, self_read_table(1, 2));
    let session = TableSession::new(mock);

    match session.table::<SelfReadData>() {
        Err(TableError::InvalidValue { table, field, .. }) => {
            assert_eq!(table, SelfReadData::KEY);
            assert_eq!(field, "LAST_ENTRY_ELEMENT");
        }
        other => panic!("expected invalid value, got {other:?}"),
    }
}

#[test]
fn test_present_register_selection_write() {
    let mock = rich_meter();
    mock.set_table(PresentRegisterSelect::KEY, vec![0, 0, 0]);
    let session = TableSession::new(mock.clone());

    let mut select = (*session.table::<PresentRegisterSelect>().unwrap()).clone();
    select.present_demand_select = Some(vec![1]);
    select.present_value_select = Some(vec![2, 3]);
    session.write(&select).unwrap();

    assert_eq!(mock.writes(), vec![(27, 0, vec![1, 2, 3])]);
    assert_eq!(*session.table::<PresentRegisterSelect>().unwrap(), select);

    select.present_value_select = Some(vec![2]);
    match session.write(&select) {
        Err(TableError::InvalidValue { field, .. }) => assert_eq!(field, "PRESENT_VALUE_SELECT"),
        other => panic!("expected invalid value, got {other:?}"),
    }
    assert_eq!(mock.writes().len(), 1);
}

#[test]
fn test_present_register_data_rich_layout() {
    let mock = rich_meter();
    let mut w = TableWriter::new();
    w.i24(-12).i32(7).i32(8);
    mock.set_table(PresentRegisterData::KEY, w.into_bytes());
    let session = TableSession::new(mock);

    let present = session.table::<PresentRegisterData>().unwrap();
    let demands = present.present_demands.as_ref().unwrap();
    assert_eq!(demands[0].time_remaining, None);
    assert_eq!(demands[0].demand_value, -12.0);
    assert_eq!(present.present_values, Some(vec![7.0, 8.0]));
}

#[test]
fn test_present_value_slots() {
    let session = TableSession::new(rich_meter());
    let layout = PresentRegisterData::dependencies(&session).unwrap();

    let first = PresentRegisterData::value_slot(&layout, 0).unwrap();
    assert_eq!((first.offset, first.len), (3, 4));
    assert_eq!(first.timeout, PresentRegisterData::TIMEOUT);
    assert_eq!(PresentRegisterData::value_slot(&layout, 1).unwrap().offset, 7);
    assert!(matches!(
        PresentRegisterData::value_slot(&layout, 2),
        Err(TableError::InvalidValue { field: "PRESENT_VALUE", .. })
    ));
}

#[test]
fn test_manufacturer_ident_char_serial() {
    let mock = meter(SIMPLE_REGISTERS);
    let mut w = TableWriter::new();
    w.bytes(b"ITRN")
        .bytes(b"CENTRON ")
        .u8(1)
        .u8(2)
        .u8(5)
        .u8(5)
        .bytes(b"      0012345678");
    mock.set_table(ManufacturerIdent::KEY, w.into_bytes());
    let session = TableSession::new(mock);

    let ident = session.table::<ManufacturerIdent>().unwrap();
    assert_eq!(ident.manufacturer, "ITRN");
    assert_eq!(ident.ed_model, "CENTRON");
    assert_eq!(ident.mfg_serial_number, "0012345678");
    assert_eq!(ident.firmware().to_string(), "5.5.0");
}

#[test]
fn test_clock_reads_seconds_format() {
    let mock = meter(SIMPLE_REGISTERS);
    let mut w = TableWriter::new();
    w.u32(1_700_000_000).u8(0x13);
    mock.set_table(Clock::KEY, w.into_bytes());
    let session = TableSession::new(mock);

    let clock = session.table::<Clock>().unwrap();
    let stamp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    assert_eq!(clock.clock_calendar, Some(stamp));
    assert_eq!(clock.day_of_week(), 3);
    assert!(clock.time_date_qual().contains(TimeDateQual::GMT_FLAG));
    let adjustment = session.profile().time_adjustment();
    assert_eq!(clock.utc_time(&adjustment), Some(stamp));
}

#[test]
fn test_general_config_rejects_big_endian() {
    let mock = meter(SIMPLE_REGISTERS);
    let mut config = general_config(FORMAT_CONTROL_2, FORMAT_CONTROL_3);
    config[0] = 0x01;
    mock.set_table(GeneralConfig::KEY, config);
    mock.set_table(CurrentRegisterData::KEY, vec![0; 48]);
    let session = TableSession::new(mock);

    assert!(session.table::<GeneralConfig>().unwrap().big_endian());
    match session.table::<CurrentRegisterData>() {
        Err(TableError::InvalidValue { table, .. }) => assert_eq!(table, GeneralConfig::KEY),
        other => panic!("expected invalid value, got {other:?}"),
    }
}
