//! ST21 Actual Register Table: which register features are present and how
//! many of each. Every register data table is sized from it.

use crate::codec::{TableReader, TableWriter};
use crate::constants::{REG_FUNC2_SELF_READ_DEMAND_RESET_MASK, ST_ACTUAL_REGISTER};
use crate::error::{DecodeResult, TableResult};
use crate::table::{TableDefinition, TableKey, TableSession};
use crate::util::BitField;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// REG_FUNC1_FLAGS
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RegFunc1: u8 {
        const SEASON_INFO = 0x01;
        const DATE_TIME = 0x02;
        const DEMAND_RESET_CTR = 0x04;
        const DEMAND_RESET_LOCK = 0x08;
        const CUM_DEMAND = 0x10;
        const CONT_CUM_DEMAND = 0x20;
        const TIME_REMAINING = 0x40;
    }
}

bitflags! {
    /// REG_FUNC2_FLAGS boolean bits; bits 4-5 hold [`SELF_READ_DEMAND_RESET`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RegFunc2: u8 {
        const SELF_READ_INHIBIT_OVERFLOW = 0x01;
        const SELF_READ_SEQ_NBR = 0x02;
        const DAILY_SELF_READ = 0x04;
        const WEEKLY_SELF_READ = 0x08;
    }
}

/// 0 none, 1 self read with demand reset, 2 demand reset with self read, 3 both.
pub const SELF_READ_DEMAND_RESET: BitField =
    BitField::new("SELF_READ_DEMAND_RESET", REG_FUNC2_SELF_READ_DEMAND_RESET_MASK as u32);

pub const TABLE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualRegisters {
    pub reg_func1: RegFunc1,
    /// Raw REG_FUNC2_FLAGS, including the multi-bit field.
    pub reg_func2_raw: u8,
    pub nbr_self_reads: u8,
    pub nbr_summations: u8,
    pub nbr_demands: u8,
    pub nbr_coin_values: u8,
    pub nbr_occur: u8,
    pub nbr_tiers: u8,
    pub nbr_present_demands: u8,
    pub nbr_present_values: u8,
}

impl ActualRegisters {
    pub fn reg_func2(&self) -> RegFunc2 {
        RegFunc2::from_bits_truncate(self.reg_func2_raw)
    }

    pub fn include_season_info(&self) -> bool {
        self.reg_func1.contains(RegFunc1::SEASON_INFO)
    }

    pub fn include_date_time(&self) -> bool {
        self.reg_func1.contains(RegFunc1::DATE_TIME)
    }

    pub fn include_demand_reset_ctr(&self) -> bool {
        self.reg_func1.contains(RegFunc1::DEMAND_RESET_CTR)
    }

    pub fn include_self_read_seq_nbr(&self) -> bool {
        self.reg_func2().contains(RegFunc2::SELF_READ_SEQ_NBR)
    }

    pub fn self_read_demand_reset(&self) -> u8 {
        SELF_READ_DEMAND_RESET.extract(u32::from(self.reg_func2_raw)) as u8
    }

    pub fn set_self_read_demand_reset(&mut self, value: u8) {
        self.reg_func2_raw = SELF_READ_DEMAND_RESET.insert(u32::from(self.reg_func2_raw), u32::from(value)) as u8;
    }
}

impl TableDefinition for ActualRegisters {
    type Deps = ();
    const KEY: TableKey = TableKey::standard(ST_ACTUAL_REGISTER);
    const NAME: &'static str = "Actual Register";

    fn dependencies(_session: &TableSession) -> TableResult<()> {
        Ok(())
    }

    fn decode(r: &mut TableReader<'_>, _deps: &()) -> DecodeResult<Self> {
        Ok(Self {
            reg_func1: RegFunc1::from_bits_retain(r.u8()?),
            reg_func2_raw: r.u8()?,
            nbr_self_reads: r.u8()?,
            nbr_summations: r.u8()?,
            nbr_demands: r.u8()?,
            nbr_coin_values: r.u8()?,
            nbr_occur: r.u8()?,
            nbr_tiers: r.u8()?,
            nbr_present_demands: r.u8()?,
            nbr_present_values: r.u8()?,
        })
    }

    fn encode(&self, w: &mut TableWriter, _deps: &()) -> TableResult<()> {
        w.u8(self.reg_func1.bits())
            .u8(self.reg_func2_raw)
            .u8(self.nbr_self_reads)
            .u8(self.nbr_summations)
            .u8(self.nbr_demands)
            .u8(self.nbr_coin_values)
            .u8(self.nbr_occur)
            .u8(self.nbr_tiers)
            .u8(self.nbr_present_demands)
            .u8(self.nbr_present_values);
        Ok(())
    }
}
