//! Flag words: every multi-bit field and boolean flag of a word must claim
//! disjoint bits.

use proptest::prelude::*;
use psem_tables::tables::standard::actual_register::SELF_READ_DEMAND_RESET;
use psem_tables::tables::standard::clock::DAY_OF_WEEK;
use psem_tables::tables::standard::general_config::{
    FORMAT_CONTROL_1_FIELDS, FORMAT_CONTROL_2_FIELDS, FORMAT_CONTROL_3_FIELDS,
};
use psem_tables::tables::standard::{ActualRegisters, RegFunc2, TimeDateQual};
use psem_tables::util::bits::partition;
use psem_tables::util::{BitField, BitSet};
use psem_tables::TableDefinition;

fn flags_field(name: &'static str, bits: u8) -> BitField {
    BitField::new(name, u32::from(bits))
}

#[test]
fn test_format_control_fields_are_disjoint() {
    assert_eq!(partition(&FORMAT_CONTROL_1_FIELDS).unwrap(), 0x7F);
    assert_eq!(partition(&FORMAT_CONTROL_2_FIELDS).unwrap(), 0xFF);
    assert_eq!(partition(&FORMAT_CONTROL_3_FIELDS).unwrap(), 0xFF);
    for field in FORMAT_CONTROL_2_FIELDS {
        assert!(field.is_contiguous(), "{}", field.name);
    }
}

#[test]
fn test_reg_func2_fields_are_disjoint() {
    let flags = flags_field("REG_FUNC2 flags", RegFunc2::all().bits());
    assert_eq!(partition(&[SELF_READ_DEMAND_RESET, flags]).unwrap(), 0x3F);
}

#[test]
fn test_time_date_qual_fields_are_disjoint() {
    let flags = flags_field("TIME_DATE_QUAL flags", TimeDateQual::all().bits());
    assert_eq!(partition(&[DAY_OF_WEEK, flags]).unwrap(), 0xFF);
}

#[test]
fn test_overlap_is_reported() {
    let wide = BitField::new("WIDE", 0x1C);
    let err = partition(&[SELF_READ_DEMAND_RESET, wide]).unwrap_err();
    assert_eq!(err.overlap, 0x10);
    assert_eq!(
        err.to_string(),
        "bit fields SELF_READ_DEMAND_RESET and WIDE overlap (0x10)"
    );
}

#[test]
fn test_self_read_demand_reset_keeps_flags() {
    let mut regs = ActualRegisters::from_bytes(&[0x01, 0x12, 3, 4, 2, 1, 0, 2, 1, 1], &()).unwrap();
    assert_eq!(regs.self_read_demand_reset(), 1);
    regs.set_self_read_demand_reset(3);
    assert_eq!(regs.self_read_demand_reset(), 3);
    assert!(regs.reg_func2().contains(RegFunc2::SELF_READ_SEQ_NBR));
    assert_eq!(regs.reg_func2_raw, 0x32);
}

proptest! {
    #[test]
    fn prop_insert_then_extract(raw in any::<u8>(), value in 0u32..4) {
        let updated = SELF_READ_DEMAND_RESET.insert(u32::from(raw), value);
        prop_assert_eq!(SELF_READ_DEMAND_RESET.extract(updated), value);
        prop_assert_eq!(updated & !0x30, u32::from(raw) & !0x30);
    }

    #[test]
    fn prop_bit_set_bytes(bits in proptest::collection::vec(any::<bool>(), 0..40)) {
        let set = BitSet::from_bits(&bits);
        prop_assert_eq!(set.as_bytes().len(), bits.len().div_ceil(8));
        let rebuilt = BitSet::from_bytes(set.as_bytes().to_vec(), bits.len());
        prop_assert_eq!(rebuilt.iter().collect::<Vec<_>>(), bits);
    }
}
